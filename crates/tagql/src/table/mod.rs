//! Table and column descriptions.
//!
//! Tables are usually declared with the [`table!`](crate::table!) macro, which
//! derives the [`TableSchema`], a typed column set and the [`Table`] impl from
//! a struct definition. Field order is column order.

use crate::error::{ConstructionError, DecodeError};
use crate::expr::{BinaryOp, Expr, Expression, IntoExpr, IntoOrderTerm, Node};
use crate::qb::{
    AllColumns, ColumnList, DefaultValues, Delete, Insert, Record, Select, Selection, Update,
};
use crate::row::RowReader;
use crate::value::{StorageKind, Value};
use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

/// Metadata for a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: StorageKind,
    pub nullable: bool,
    pub has_default: bool,
    pub primary_key: bool,
    /// Excluded from INSERT and full-record UPDATE (e.g. generated columns).
    pub read_only: bool,
}

impl ColumnDef {
    pub const fn new(name: &'static str, kind: StorageKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            has_default: false,
            primary_key: false,
            read_only: false,
        }
    }

    pub const fn nullable(self, nullable: bool) -> Self {
        Self { nullable, ..self }
    }

    pub const fn has_default(self) -> Self {
        Self {
            has_default: true,
            ..self
        }
    }

    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    pub const fn read_only(self) -> Self {
        Self {
            read_only: true,
            ..self
        }
    }

    /// Part of the write projection.
    pub const fn is_writable(&self) -> bool {
        !self.read_only
    }
}

const fn str_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// A table name plus its ordered columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableSchema {
    /// Describe a table.
    ///
    /// Panics on an empty name, a duplicate column or a table without any
    /// writable column. In a `const` item (as generated by `table!`) this is a
    /// compile-time error.
    pub const fn new(name: &'static str, columns: &'static [ColumnDef]) -> Self {
        assert!(!name.is_empty(), "table name must not be empty");
        let mut writable = false;
        let mut i = 0;
        while i < columns.len() {
            assert!(!columns[i].name.is_empty(), "column name must not be empty");
            writable |= columns[i].is_writable();
            let mut j = i + 1;
            while j < columns.len() {
                if str_eq(columns[i].name, columns[j].name) {
                    panic!("duplicate column name in table description");
                }
                j += 1;
            }
            i += 1;
        }
        assert!(writable, "table must have a writable column");
        Self { name, columns }
    }

    /// Non-panicking variant of [`TableSchema::new`] for descriptions built at runtime.
    pub fn try_new(
        name: &'static str,
        columns: &'static [ColumnDef],
    ) -> Result<Self, ConstructionError> {
        let schema = Self { name, columns };
        schema.validate()?;
        Ok(schema)
    }

    pub fn validate(&self) -> Result<(), ConstructionError> {
        crate::ident::validate_ident(self.name)?;
        for (i, col) in self.columns.iter().enumerate() {
            crate::ident::validate_ident(col.name)?;
            if self.columns[..i].iter().any(|c| c.name == col.name) {
                return Err(ConstructionError::duplicate_column(self.name, col.name));
            }
        }
        if self.writable().next().is_none() {
            return Err(ConstructionError::EmptyColumnList {
                table: self.name.to_string(),
            });
        }
        Ok(())
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&'static ColumnDef, ConstructionError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConstructionError::unknown_column(self.name, name))
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn primary_key(&self) -> impl Iterator<Item = &'static ColumnDef> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    /// Columns written by INSERT and full-record UPDATE.
    pub fn writable(&self) -> impl Iterator<Item = &'static ColumnDef> {
        self.columns.iter().filter(|c| c.is_writable())
    }

    pub(crate) fn column_ref(&self, def: &ColumnDef) -> ColumnRef {
        ColumnRef {
            table: self.name,
            name: def.name,
        }
    }

    pub(crate) fn check_owns(&self, column: &ColumnRef) -> Result<(), ConstructionError> {
        if column.table != self.name || self.index_of(column.name).is_none() {
            return Err(ConstructionError::unknown_column(self.name, column.name));
        }
        Ok(())
    }

    /// The same columns under another name, e.g. `excluded`.
    pub(crate) const fn aliased(&self, name: &'static str) -> TableSchema {
        TableSchema {
            name,
            columns: self.columns,
        }
    }
}

/// Fail unless every column `node` references belongs to one of `scope`.
pub(crate) fn check_scope(scope: &[TableSchema], node: &Node) -> Result<(), ConstructionError> {
    node.try_for_each_column(&mut |col| {
        match scope.iter().find(|schema| schema.name == col.table) {
            Some(schema) => schema.check_owns(col),
            None => Err(ConstructionError::not_in_scope(col.table, col.name)),
        }
    })
}

/// [`check_scope`] for every result column of `selection`.
pub(crate) fn check_selection<S: Selection>(
    scope: &[TableSchema],
    selection: &S,
) -> Result<(), ConstructionError> {
    let mut items = Vec::new();
    selection.push_items(&mut items);
    items.iter().try_for_each(|item| check_scope(scope, item))
}

/// Untyped reference to a column of some table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: &'static str,
    pub name: &'static str,
}

/// A column whose values decode into `T`.
pub struct Column<T> {
    table: &'static str,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Column<T> {
    pub const fn new(table: &'static str, name: &'static str) -> Self {
        Self {
            table,
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn table(&self) -> &'static str {
        self.table
    }

    pub const fn column_ref(&self) -> ColumnRef {
        ColumnRef {
            table: self.table,
            name: self.name,
        }
    }

    /// Assignment for UPDATE and upsert clauses: `"column" = value`.
    pub fn set<R: IntoExpr<T>>(self, value: R) -> Assignment {
        Assignment {
            column: self.column_ref(),
            value: value.into_operand().node,
        }
    }

    /// `"column" = NULL`
    pub fn set_null(self) -> Assignment
    where
        T: crate::expr::NullableType,
    {
        Assignment {
            column: self.column_ref(),
            value: Node::Bind(Value::Null),
        }
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Column<T> {}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column({}.{})", self.table, self.name)
    }
}

/// One `SET "column" = expr` entry.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub(crate) column: ColumnRef,
    pub(crate) value: Node,
}

impl Assignment {
    pub fn column(&self) -> ColumnRef {
        self.column
    }
}

/// A record type mapped to a table.
///
/// Implemented by [`table!`](crate::table!). The provided methods are the
/// entry points for every statement kind.
pub trait Table: Sized + 'static {
    const SCHEMA: TableSchema;

    /// Typed column set handed to builder closures.
    type Columns: Copy;

    /// Columns qualified by the table name.
    const COLUMNS: Self::Columns;

    /// Columns of the `excluded` pseudo-table inside `ON CONFLICT DO UPDATE`.
    const EXCLUDED: Self::Columns;

    /// All column values in declaration order.
    fn encode_values(&self) -> Vec<Value>;

    /// Decode one record from the next `SCHEMA.columns.len()` values.
    fn decode_row(row: &mut RowReader<'_>) -> Result<Self, DecodeError>;

    /// `SELECT` every column.
    fn all() -> Select<Self, AllColumns<Self>> {
        Select::from_source()
    }

    /// `SELECT * ... WHERE predicate`
    ///
    /// Fails if the predicate references a column of another table.
    fn filter<F, E>(predicate: F) -> Result<Select<Self, AllColumns<Self>>, ConstructionError>
    where
        F: FnOnce(Self::Columns) -> E,
        E: Expression<SqlType = bool>,
    {
        Self::all().filter(predicate)
    }

    fn order_by<F, O>(key: F) -> Result<Select<Self, AllColumns<Self>>, ConstructionError>
    where
        F: FnOnce(Self::Columns) -> O,
        O: IntoOrderTerm,
    {
        Self::all().order_by(key)
    }

    fn select<F, Sel>(selection: F) -> Result<Select<Self, Sel>, ConstructionError>
    where
        F: FnOnce(Self::Columns) -> Sel,
        Sel: Selection,
    {
        Self::all().select(selection)
    }

    /// `SELECT count(*) FROM "table"`
    fn count() -> Select<Self, Expr<i64>> {
        Self::all().count()
    }

    /// Start an INSERT for the listed columns.
    ///
    /// Fails if a column is listed twice or belongs to another table.
    fn insert<F, C>(columns: F) -> Result<Insert<Self, C>, ConstructionError>
    where
        F: FnOnce(Self::Columns) -> C,
        C: ColumnList,
    {
        Insert::new(columns(Self::COLUMNS))
    }

    /// `INSERT INTO "table" DEFAULT VALUES`, exactly one row.
    fn insert_default() -> Insert<Self, DefaultValues> {
        Insert::default_values()
    }

    /// INSERT whole records using the write projection.
    fn insert_records<I>(records: I) -> Insert<Self, Record<Self>>
    where
        I: IntoIterator,
        I::Item: Borrow<Self>,
    {
        Insert::records(records)
    }

    /// Start an UPDATE with the given assignments.
    ///
    /// Both sides of every assignment must stay within this table.
    fn update<F, I>(assignments: F) -> Result<Update<Self>, ConstructionError>
    where
        F: FnOnce(Self::Columns) -> I,
        I: IntoIterator<Item = Assignment>,
    {
        Update::new(assignments(Self::COLUMNS))
    }

    /// Replace every writable non-key column of the row identified by this
    /// record's primary key.
    fn update_record(&self) -> Result<Update<Self>, ConstructionError> {
        Update::from_record(self)
    }

    fn delete() -> Delete<Self> {
        Delete::new()
    }

    /// DELETE the row identified by this record's primary key.
    fn delete_record(&self) -> Result<Delete<Self>, ConstructionError> {
        Ok(Delete::new().filter_node(primary_key_predicate(self)?))
    }
}

/// Conjunction of `pk = value` for every primary-key column.
pub(crate) fn primary_key_predicate<T: Table>(record: &T) -> Result<Node, ConstructionError> {
    let schema = T::SCHEMA;
    let values = record.encode_values();
    let mut predicate: Option<Node> = None;
    for (def, value) in schema.columns.iter().zip(values) {
        if !def.primary_key {
            continue;
        }
        let cmp = Node::compare(
            BinaryOp::Eq,
            Node::Column(schema.column_ref(def)),
            Node::Bind(value),
        );
        predicate = Some(match predicate {
            None => cmp,
            Some(prev) => Node::binary(BinaryOp::And, prev, cmp),
        });
    }
    predicate.ok_or_else(|| ConstructionError::MissingPrimaryKey {
        table: schema.name.to_string(),
    })
}
