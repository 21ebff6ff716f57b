//! INSERT builder.

use crate::codec::Codec;
use crate::error::ConstructionError;
use crate::fragment::Fragment;
use crate::qb::selection::{AllColumns, Selection};
use crate::qb::statement::{Statement, labels_of, render_returning};
use crate::table::{Assignment, Column, ColumnRef, Table, check_scope, check_selection};
use crate::value::Value;
use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

/// Columns an INSERT writes, and how a row of values for them is encoded.
///
/// Implemented for a single [`Column`], tuples of columns (up to eight) and
/// [`Record`] for the table's write projection.
pub trait ColumnList {
    /// One row of values in column order.
    type Values;

    fn column_refs(&self) -> Vec<ColumnRef>;

    fn encode_row(values: Self::Values) -> Vec<Value>;
}

impl<T: Codec> ColumnList for Column<T> {
    type Values = T;

    fn column_refs(&self) -> Vec<ColumnRef> {
        vec![self.column_ref()]
    }

    fn encode_row(values: T) -> Vec<Value> {
        vec![values.encode()]
    }
}

macro_rules! impl_tuple_column_list {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: ColumnList),+> ColumnList for ($($name,)+) {
            type Values = ($($name::Values,)+);

            fn column_refs(&self) -> Vec<ColumnRef> {
                let mut refs = Vec::new();
                $(refs.extend(self.$idx.column_refs());)+
                refs
            }

            fn encode_row(values: Self::Values) -> Vec<Value> {
                let mut row = Vec::new();
                $(row.extend($name::encode_row(values.$idx));)+
                row
            }
        }
    };
}

impl_tuple_column_list!(A: 0);
impl_tuple_column_list!(A: 0, B: 1);
impl_tuple_column_list!(A: 0, B: 1, C: 2);
impl_tuple_column_list!(A: 0, B: 1, C: 2, D: 3);
impl_tuple_column_list!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple_column_list!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_tuple_column_list!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_tuple_column_list!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

/// The writable columns of `T`, taking whole records as values.
pub struct Record<T>(PhantomData<fn() -> T>);

impl<T> Record<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Record<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Record<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Table> ColumnList for Record<T> {
    type Values = T;

    fn column_refs(&self) -> Vec<ColumnRef> {
        let schema = T::SCHEMA;
        schema.writable().map(|def| schema.column_ref(def)).collect()
    }

    fn encode_row(values: T) -> Vec<Value> {
        writable_values(&values)
    }
}

/// Marker for `INSERT ... DEFAULT VALUES`, which always writes exactly one row.
///
/// Not a [`ColumnList`], so no further rows or conflict clauses can be added.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValues;

fn writable_values<T: Table>(record: &T) -> Vec<Value> {
    T::SCHEMA
        .columns
        .iter()
        .zip(record.encode_values())
        .filter(|(def, _)| def.is_writable())
        .map(|(_, value)| value)
        .collect()
}

#[derive(Debug, Clone)]
enum ConflictAction {
    DoNothing,
    DoUpdate(Vec<Assignment>),
}

#[derive(Debug, Clone)]
struct OnConflict {
    target: Vec<&'static str>,
    action: ConflictAction,
}

/// An INSERT into `T` writing columns `C`, returning `Ret` per row.
///
/// ```ignore
/// let inserted = Reminder::insert(|c| (c.id, c.title))?
///     .values((id, "Groceries".to_string()))
///     .on_conflict_do_update(|c, _| [c.title.set(c.title.concat(" Copy"))])?
///     .returning_all()
///     .fetch_all(&conn)?;
/// ```
pub struct Insert<T, C, Ret = ()> {
    columns: Vec<ColumnRef>,
    rows: Vec<Vec<Value>>,
    conflict: Option<OnConflict>,
    returning: Ret,
    _marker: PhantomData<fn() -> (T, C)>,
}

impl<T: Table, C: ColumnList> Insert<T, C> {
    pub(crate) fn new(columns: C) -> Result<Self, ConstructionError> {
        let columns = columns.column_refs();
        let schema = T::SCHEMA;
        if columns.is_empty() {
            return Err(ConstructionError::EmptyColumnList {
                table: schema.name.to_string(),
            });
        }
        for (i, col) in columns.iter().enumerate() {
            schema.check_owns(col)?;
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(ConstructionError::duplicate_column(schema.name, col.name));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
            conflict: None,
            returning: (),
            _marker: PhantomData,
        })
    }
}

impl<T: Table> Insert<T, DefaultValues> {
    pub(crate) fn default_values() -> Self {
        Self {
            columns: Vec::new(),
            rows: vec![Vec::new()],
            conflict: None,
            returning: (),
            _marker: PhantomData,
        }
    }
}

impl<T: Table> Insert<T, Record<T>> {
    pub(crate) fn records<I>(records: I) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let columns = Record::<T>::new().column_refs();
        let rows = records
            .into_iter()
            .map(|record| writable_values(record.borrow()))
            .collect();
        Self {
            columns,
            rows,
            conflict: None,
            returning: (),
            _marker: PhantomData,
        }
    }
}

impl<T: Table, C: ColumnList, Ret> Insert<T, C, Ret> {
    /// Append one row.
    pub fn values(mut self, row: C::Values) -> Self {
        self.rows.push(C::encode_row(row));
        self
    }

    /// Append one row of already-encoded values.
    ///
    /// Fails with `ArityMismatch` if the row length differs from the column count.
    pub fn try_values(mut self, row: Vec<Value>) -> Result<Self, ConstructionError> {
        if row.len() != self.columns.len() {
            return Err(ConstructionError::ArityMismatch {
                expected: self.columns.len(),
                actual: row.len(),
                row: self.rows.len(),
            });
        }
        self.rows.push(row);
        Ok(self)
    }

    /// Restrict the conflict clause to a uniqueness target.
    ///
    /// Must be followed by `on_conflict_do_nothing` or `on_conflict_do_update`.
    pub fn on_conflict_target<F, K>(mut self, target: F) -> Result<Self, ConstructionError>
    where
        F: FnOnce(T::Columns) -> K,
        K: ColumnList,
    {
        let schema = T::SCHEMA;
        let refs = target(T::COLUMNS).column_refs();
        for col in &refs {
            schema.check_owns(col)?;
        }
        let target = refs.into_iter().map(|c| c.name).collect();
        match self.conflict.as_mut() {
            Some(conflict) => conflict.target = target,
            None => {
                self.conflict = Some(OnConflict {
                    target,
                    action: ConflictAction::DoNothing,
                })
            }
        }
        Ok(self)
    }

    /// `ON CONFLICT DO NOTHING`
    pub fn on_conflict_do_nothing(mut self) -> Self {
        let target = self.take_target();
        self.conflict = Some(OnConflict {
            target,
            action: ConflictAction::DoNothing,
        });
        self
    }

    /// `ON CONFLICT DO UPDATE SET ...`
    ///
    /// The closure receives the table's columns and the `excluded` pseudo-table
    /// holding the row that failed to insert.
    pub fn on_conflict_do_update<F, I>(mut self, assignments: F) -> Result<Self, ConstructionError>
    where
        F: FnOnce(T::Columns, T::Columns) -> I,
        I: IntoIterator<Item = Assignment>,
    {
        let schema = T::SCHEMA;
        let assignments: Vec<Assignment> =
            assignments(T::COLUMNS, T::EXCLUDED).into_iter().collect();
        if assignments.is_empty() {
            return Err(ConstructionError::EmptyAssignments {
                table: schema.name.to_string(),
            });
        }
        let scope = [schema, schema.aliased("excluded")];
        for assignment in &assignments {
            schema.check_owns(&assignment.column)?;
            check_scope(&scope, &assignment.value)?;
        }
        let target = self.take_target();
        self.conflict = Some(OnConflict {
            target,
            action: ConflictAction::DoUpdate(assignments),
        });
        Ok(self)
    }

    fn take_target(&mut self) -> Vec<&'static str> {
        self.conflict
            .take()
            .map(|conflict| conflict.target)
            .unwrap_or_default()
    }
}

impl<T: Table, C, Ret> Insert<T, C, Ret> {
    /// Return `selection` for every inserted row.
    pub fn returning<F, R>(self, selection: F) -> Result<Insert<T, C, R>, ConstructionError>
    where
        F: FnOnce(T::Columns) -> R,
        R: Selection,
    {
        let returning = selection(T::COLUMNS);
        check_selection(&[T::SCHEMA], &returning)?;
        Ok(self.with_returning(returning))
    }

    /// Return whole inserted records.
    pub fn returning_all(self) -> Insert<T, C, AllColumns<T>> {
        self.with_returning(AllColumns::new())
    }

    fn with_returning<R>(self, returning: R) -> Insert<T, C, R> {
        Insert {
            columns: self.columns,
            rows: self.rows,
            conflict: self.conflict,
            returning,
            _marker: PhantomData,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl<T: Table, C, Ret: Selection> Statement for Insert<T, C, Ret> {
    type Shape = Ret;

    fn to_fragment(&self) -> Fragment {
        let mut out = Fragment::new();
        out.push("INSERT INTO ").push_ident(T::SCHEMA.name);

        if self.columns.is_empty() {
            out.push(" DEFAULT VALUES");
        } else {
            out.push(" (");
            for (i, col) in self.columns.iter().enumerate() {
                if i > 0 {
                    out.push(", ");
                }
                out.push_ident(col.name);
            }
            out.push(")");

            if self.rows.is_empty() {
                // Valid statement that inserts nothing
                out.push(" SELECT ");
                for i in 0..self.columns.len() {
                    if i > 0 {
                        out.push(", ");
                    }
                    out.push("NULL");
                }
                out.push(" WHERE 0");
            } else {
                out.push(" VALUES ");
                for (r, row) in self.rows.iter().enumerate() {
                    if r > 0 {
                        out.push(", ");
                    }
                    out.push("(");
                    for (i, value) in row.iter().enumerate() {
                        if i > 0 {
                            out.push(", ");
                        }
                        out.push_bind(value.clone());
                    }
                    out.push(")");
                }
            }
        }

        if let Some(conflict) = &self.conflict {
            out.push(" ON CONFLICT");
            if !conflict.target.is_empty() {
                out.push(" (");
                for (i, name) in conflict.target.iter().enumerate() {
                    if i > 0 {
                        out.push(", ");
                    }
                    out.push_ident(name);
                }
                out.push(")");
            }
            match &conflict.action {
                ConflictAction::DoNothing => {
                    out.push(" DO NOTHING");
                }
                ConflictAction::DoUpdate(assignments) => {
                    out.push(" DO UPDATE SET ");
                    render_assignments(assignments, &mut out);
                }
            }
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

/// `"a" = expr, "b" = expr` with qualified right-hand sides.
pub(crate) fn render_assignments(assignments: &[Assignment], out: &mut Fragment) {
    for (i, assignment) in assignments.iter().enumerate() {
        if i > 0 {
            out.push(", ");
        }
        out.push_ident(assignment.column.name).push(" = ");
        assignment.value.render(out, true);
    }
}

impl<T, C, Ret: Clone> Clone for Insert<T, C, Ret> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.clone(),
            conflict: self.conflict.clone(),
            returning: self.returning.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Table, C, Ret: Selection> fmt::Debug for Insert<T, C, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Insert")
            .field("sql", &self.to_sql())
            .field("rows", &self.rows.len())
            .finish()
    }
}
