//! UPDATE builder.

use crate::error::ConstructionError;
use crate::expr::{Expression, Node, render_conjunction};
use crate::fragment::Fragment;
use crate::qb::insert::render_assignments;
use crate::qb::selection::{AllColumns, Selection};
use crate::qb::statement::{Statement, labels_of, render_returning};
use crate::table::{Assignment, Table, check_scope, check_selection, primary_key_predicate};
use std::fmt;
use std::marker::PhantomData;

/// An UPDATE of `T`, returning `Ret` per modified row.
///
/// Without a filter every row is updated.
pub struct Update<T, Ret = ()> {
    assignments: Vec<Assignment>,
    filters: Vec<Node>,
    returning: Ret,
    _table: PhantomData<fn() -> T>,
}

impl<T: Table> Update<T> {
    pub(crate) fn new<I>(assignments: I) -> Result<Self, ConstructionError>
    where
        I: IntoIterator<Item = Assignment>,
    {
        let schema = T::SCHEMA;
        let assignments: Vec<Assignment> = assignments.into_iter().collect();
        if assignments.is_empty() {
            return Err(ConstructionError::EmptyAssignments {
                table: schema.name.to_string(),
            });
        }
        for (i, assignment) in assignments.iter().enumerate() {
            schema.check_owns(&assignment.column)?;
            check_scope(&[schema], &assignment.value)?;
            if assignments[..i]
                .iter()
                .any(|a| a.column.name == assignment.column.name)
            {
                return Err(ConstructionError::duplicate_column(
                    schema.name,
                    assignment.column.name,
                ));
            }
        }
        Ok(Self {
            assignments,
            filters: Vec::new(),
            returning: (),
            _table: PhantomData,
        })
    }

    /// Write every writable non-key column and match on the primary key.
    pub(crate) fn from_record(record: &T) -> Result<Self, ConstructionError> {
        let schema = T::SCHEMA;
        let predicate = primary_key_predicate(record)?;
        let assignments: Vec<Assignment> = schema
            .columns
            .iter()
            .zip(record.encode_values())
            .filter(|(def, _)| def.is_writable() && !def.primary_key)
            .map(|(def, value)| Assignment {
                column: schema.column_ref(def),
                value: Node::Bind(value),
            })
            .collect();
        if assignments.is_empty() {
            return Err(ConstructionError::EmptyAssignments {
                table: schema.name.to_string(),
            });
        }
        Ok(Self {
            assignments,
            filters: vec![predicate],
            returning: (),
            _table: PhantomData,
        })
    }
}

impl<T: Table, Ret> Update<T, Ret> {
    /// Add a `WHERE` predicate. Repeated calls are joined with `AND`.
    pub fn filter<F, E>(mut self, predicate: F) -> Result<Self, ConstructionError>
    where
        F: FnOnce(T::Columns) -> E,
        E: Expression<SqlType = bool>,
    {
        let predicate = predicate(T::COLUMNS).into_expr().node;
        check_scope(&[T::SCHEMA], &predicate)?;
        self.filters.push(predicate);
        Ok(self)
    }

    pub fn returning<F, R>(self, selection: F) -> Result<Update<T, R>, ConstructionError>
    where
        F: FnOnce(T::Columns) -> R,
        R: Selection,
    {
        let returning = selection(T::COLUMNS);
        check_selection(&[T::SCHEMA], &returning)?;
        Ok(self.with_returning(returning))
    }

    pub fn returning_all(self) -> Update<T, AllColumns<T>> {
        self.with_returning(AllColumns::new())
    }

    fn with_returning<R>(self, returning: R) -> Update<T, R> {
        Update {
            assignments: self.assignments,
            filters: self.filters,
            returning,
            _table: PhantomData,
        }
    }
}

impl<T: Table, Ret: Selection> Statement for Update<T, Ret> {
    type Shape = Ret;

    fn to_fragment(&self) -> Fragment {
        let mut out = Fragment::new();
        out.push("UPDATE ").push_ident(T::SCHEMA.name).push(" SET ");
        render_assignments(&self.assignments, &mut out);
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

impl<T, Ret: Clone> Clone for Update<T, Ret> {
    fn clone(&self) -> Self {
        Self {
            assignments: self.assignments.clone(),
            filters: self.filters.clone(),
            returning: self.returning.clone(),
            _table: PhantomData,
        }
    }
}

impl<T: Table, Ret: Selection> fmt::Debug for Update<T, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Update")
            .field("sql", &self.to_sql())
            .finish()
    }
}
