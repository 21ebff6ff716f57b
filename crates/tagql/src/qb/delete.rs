//! DELETE builder.

use crate::error::ConstructionError;
use crate::expr::{Expression, Node, render_conjunction};
use crate::fragment::Fragment;
use crate::qb::selection::{AllColumns, Selection};
use crate::qb::statement::{Statement, labels_of, render_returning};
use crate::table::{Table, check_scope, check_selection};
use std::fmt;
use std::marker::PhantomData;

/// A DELETE from `T`, returning `Ret` per removed row.
///
/// Without a filter every row is deleted.
pub struct Delete<T, Ret = ()> {
    filters: Vec<Node>,
    returning: Ret,
    _table: PhantomData<fn() -> T>,
}

impl<T: Table> Delete<T> {
    pub(crate) fn new() -> Self {
        Self {
            filters: Vec::new(),
            returning: (),
            _table: PhantomData,
        }
    }
}

impl<T: Table, Ret> Delete<T, Ret> {
    /// Add a `WHERE` predicate. Repeated calls are joined with `AND`.
    ///
    /// Fails if the predicate references a column of another table.
    pub fn filter<F, E>(self, predicate: F) -> Result<Self, ConstructionError>
    where
        F: FnOnce(T::Columns) -> E,
        E: Expression<SqlType = bool>,
    {
        let predicate = predicate(T::COLUMNS).into_expr().node;
        check_scope(&[T::SCHEMA], &predicate)?;
        Ok(self.filter_node(predicate))
    }

    pub(crate) fn filter_node(mut self, node: Node) -> Self {
        self.filters.push(node);
        self
    }

    pub fn returning<F, R>(self, selection: F) -> Result<Delete<T, R>, ConstructionError>
    where
        F: FnOnce(T::Columns) -> R,
        R: Selection,
    {
        let returning = selection(T::COLUMNS);
        check_selection(&[T::SCHEMA], &returning)?;
        Ok(self.with_returning(returning))
    }

    pub fn returning_all(self) -> Delete<T, AllColumns<T>> {
        self.with_returning(AllColumns::new())
    }

    fn with_returning<R>(self, returning: R) -> Delete<T, R> {
        Delete {
            filters: self.filters,
            returning,
            _table: PhantomData,
        }
    }
}

impl<T: Table, Ret: Selection> Statement for Delete<T, Ret> {
    type Shape = Ret;

    fn to_fragment(&self) -> Fragment {
        let mut out = Fragment::new();
        out.push("DELETE FROM ").push_ident(T::SCHEMA.name);
        if !self.filters.is_empty() {
            out.push(" WHERE ");
            render_conjunction(&self.filters, &mut out, true);
        }
        let mut items = Vec::new();
        self.returning.push_items(&mut items);
        render_returning(&items, &mut out);
        out
    }

    fn result_labels(&self) -> Vec<String> {
        let mut items = Vec::new();
        self.returning.push_items(&mut items);
        labels_of(&items)
    }
}

impl<T, Ret: Clone> Clone for Delete<T, Ret> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            returning: self.returning.clone(),
            _table: PhantomData,
        }
    }
}

impl<T: Table, Ret: Selection> fmt::Debug for Delete<T, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delete")
            .field("sql", &self.to_sql())
            .finish()
    }
}
