//! Result shapes and row sources.

use crate::codec::Codec;
use crate::error::DecodeError;
use crate::expr::{Expr, Node};
use crate::row::RowReader;
use crate::table::{Column, Table, TableSchema};
use std::fmt;
use std::marker::PhantomData;

/// What a statement returns per row.
///
/// Implemented for columns, expressions, tuples of those (up to eight), `()`
/// for statements without a result, and [`AllColumns`] for whole records.
pub trait Selection {
    type Output;

    /// Append the result-column expressions in order.
    fn push_items(&self, out: &mut Vec<Node>);

    /// Decode one row into `Output`, consuming exactly the pushed items.
    fn decode(row: &mut RowReader<'_>) -> Result<Self::Output, DecodeError>;
}

impl<T: Codec> Selection for Column<T> {
    type Output = T;

    fn push_items(&self, out: &mut Vec<Node>) {
        out.push(Node::Column(self.column_ref()));
    }

    fn decode(row: &mut RowReader<'_>) -> Result<T, DecodeError> {
        row.next::<T>()
    }
}

impl<T: Codec> Selection for Expr<T> {
    type Output = T;

    fn push_items(&self, out: &mut Vec<Node>) {
        out.push(self.node.clone());
    }

    fn decode(row: &mut RowReader<'_>) -> Result<T, DecodeError> {
        row.next::<T>()
    }
}

impl Selection for () {
    type Output = ();

    fn push_items(&self, _out: &mut Vec<Node>) {}

    fn decode(_row: &mut RowReader<'_>) -> Result<(), DecodeError> {
        Ok(())
    }
}

macro_rules! impl_tuple_selection {
    ($($name:ident),+) => {
        impl<$($name: Selection),+> Selection for ($($name,)+) {
            type Output = ($($name::Output,)+);

            #[allow(non_snake_case)]
            fn push_items(&self, out: &mut Vec<Node>) {
                let ($($name,)+) = self;
                $($name.push_items(out);)+
            }

            fn decode(row: &mut RowReader<'_>) -> Result<Self::Output, DecodeError> {
                Ok(($($name::decode(row)?,)+))
            }
        }
    };
}

impl_tuple_selection!(A);
impl_tuple_selection!(A, B);
impl_tuple_selection!(A, B, C);
impl_tuple_selection!(A, B, C, D);
impl_tuple_selection!(A, B, C, D, E);
impl_tuple_selection!(A, B, C, D, E, F);
impl_tuple_selection!(A, B, C, D, E, F, G);
impl_tuple_selection!(A, B, C, D, E, F, G, H);

/// Every column of a [`Source`], decoded into its record type.
pub struct AllColumns<S>(PhantomData<fn() -> S>);

impl<S> AllColumns<S> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<S> Default for AllColumns<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for AllColumns<S> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for AllColumns<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AllColumns")
    }
}

impl<S: Source> Selection for AllColumns<S> {
    type Output = S::Record;

    fn push_items(&self, out: &mut Vec<Node>) {
        S::push_columns(out);
    }

    fn decode(row: &mut RowReader<'_>) -> Result<S::Record, DecodeError> {
        S::decode_record(row)
    }
}

/// The `FROM` side of a SELECT: a table or a join of tables.
pub trait Source: 'static {
    /// Column set passed to builder closures.
    type Scope: Copy;

    /// Decoded form of one row of `SELECT *`.
    type Record;

    fn scope() -> Self::Scope;

    fn base_table() -> &'static str;

    /// Tables whose columns the statement may reference.
    fn push_schemas(out: &mut Vec<TableSchema>);

    fn column_count() -> usize;

    fn push_columns(out: &mut Vec<Node>);

    fn decode_record(row: &mut RowReader<'_>) -> Result<Self::Record, DecodeError>;

    fn schemas() -> Vec<TableSchema> {
        let mut out = Vec::new();
        Self::push_schemas(&mut out);
        out
    }
}

impl<T: Table> Source for T {
    type Scope = <T as Table>::Columns;
    type Record = T;

    fn scope() -> Self::Scope {
        T::COLUMNS
    }

    fn base_table() -> &'static str {
        T::SCHEMA.name
    }

    fn push_schemas(out: &mut Vec<TableSchema>) {
        out.push(T::SCHEMA);
    }

    fn column_count() -> usize {
        T::SCHEMA.columns.len()
    }

    fn push_columns(out: &mut Vec<Node>) {
        let schema = T::SCHEMA;
        out.extend(
            schema
                .columns
                .iter()
                .map(|def| Node::Column(schema.column_ref(def))),
        );
    }

    fn decode_record(row: &mut RowReader<'_>) -> Result<T, DecodeError> {
        T::decode_row(row)
    }
}

/// `A JOIN B`; rows decode as `(A::Record, B)`.
pub struct Joined<A, B>(PhantomData<fn() -> (A, B)>);

/// `A LEFT JOIN B`; rows decode as `(A::Record, Option<B>)`.
///
/// The right side is `None` when every one of its columns is NULL.
pub struct LeftJoined<A, B>(PhantomData<fn() -> (A, B)>);

impl<A: Source, B: Table> Source for Joined<A, B> {
    type Scope = (A::Scope, <B as Table>::Columns);
    type Record = (A::Record, B);

    fn scope() -> Self::Scope {
        (A::scope(), B::COLUMNS)
    }

    fn base_table() -> &'static str {
        A::base_table()
    }

    fn push_schemas(out: &mut Vec<TableSchema>) {
        A::push_schemas(out);
        out.push(B::SCHEMA);
    }

    fn column_count() -> usize {
        A::column_count() + B::SCHEMA.columns.len()
    }

    fn push_columns(out: &mut Vec<Node>) {
        A::push_columns(out);
        <B as Source>::push_columns(out);
    }

    fn decode_record(row: &mut RowReader<'_>) -> Result<Self::Record, DecodeError> {
        let left = A::decode_record(row)?;
        let right = B::decode_row(row)?;
        Ok((left, right))
    }
}

impl<A: Source, B: Table> Source for LeftJoined<A, B> {
    type Scope = (A::Scope, <B as Table>::Columns);
    type Record = (A::Record, Option<B>);

    fn scope() -> Self::Scope {
        (A::scope(), B::COLUMNS)
    }

    fn base_table() -> &'static str {
        A::base_table()
    }

    fn push_schemas(out: &mut Vec<TableSchema>) {
        A::push_schemas(out);
        out.push(B::SCHEMA);
    }

    fn column_count() -> usize {
        A::column_count() + B::SCHEMA.columns.len()
    }

    fn push_columns(out: &mut Vec<Node>) {
        A::push_columns(out);
        <B as Source>::push_columns(out);
    }

    fn decode_record(row: &mut RowReader<'_>) -> Result<Self::Record, DecodeError> {
        let left = A::decode_record(row)?;
        let width = B::SCHEMA.columns.len();
        if row.next_all_null(width) {
            row.skip(width);
            return Ok((left, None));
        }
        let right = B::decode_row(row)?;
        Ok((left, Some(right)))
    }
}
