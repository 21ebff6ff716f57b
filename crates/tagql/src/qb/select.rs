//! SELECT builder.

use crate::error::ConstructionError;
use crate::expr::{
    Expr, Expression, IntoOrderTerm, Node, OrderTerm, count_all, render_conjunction,
    render_delimited,
};
use crate::fragment::Fragment;
use crate::qb::selection::{AllColumns, Joined, LeftJoined, Selection, Source};
use crate::qb::statement::{Statement, labels_of};
use crate::table::{Table, check_scope, check_selection};
use crate::value::Value;
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone)]
struct Join {
    kind: JoinKind,
    table: &'static str,
    on: Node,
}

/// A SELECT over source `S` returning `Sel` per row.
///
/// Every method consumes and returns the builder; clone it to branch.
///
/// ```ignore
/// let titles = Reminder::all()
///     .filter(|c| c.is_completed.toggle())?
///     .order_by(|c| c.due_date.desc())?
///     .select(|c| c.title)?
///     .limit(10)
///     .fetch_all(&conn)?;
/// ```
pub struct Select<S, Sel> {
    selection: Sel,
    distinct: bool,
    joins: Vec<Join>,
    filters: Vec<Node>,
    group_by: Vec<Node>,
    having: Vec<Node>,
    order_by: Vec<OrderTerm>,
    limit: Option<i64>,
    offset: Option<i64>,
    _source: PhantomData<fn() -> S>,
}

impl<S: Source> Select<S, AllColumns<S>> {
    pub(crate) fn from_source() -> Self {
        Self {
            selection: AllColumns::new(),
            distinct: false,
            joins: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            _source: PhantomData,
        }
    }

    fn push_join<B, F, E, S2>(
        self,
        kind: JoinKind,
        on: F,
    ) -> Result<Select<S2, AllColumns<S2>>, ConstructionError>
    where
        B: Table,
        F: FnOnce(S::Scope, <B as Table>::Columns) -> E,
        E: Expression<SqlType = bool>,
        S2: Source,
    {
        let on = on(S::scope(), B::COLUMNS).into_expr().node;
        check_scope(&S2::schemas(), &on)?;
        let mut joins = self.joins;
        joins.push(Join {
            kind,
            table: B::SCHEMA.name,
            on,
        });
        Ok(Select {
            selection: AllColumns::new(),
            distinct: self.distinct,
            joins,
            filters: self.filters,
            group_by: self.group_by,
            having: self.having,
            order_by: self.order_by,
            limit: self.limit,
            offset: self.offset,
            _source: PhantomData,
        })
    }

    /// `JOIN "b" ON ...`. Rows decode as `(record, b)`.
    pub fn join<B, F, E>(
        self,
        on: F,
    ) -> Result<Select<Joined<S, B>, AllColumns<Joined<S, B>>>, ConstructionError>
    where
        B: Table,
        F: FnOnce(S::Scope, <B as Table>::Columns) -> E,
        E: Expression<SqlType = bool>,
    {
        self.push_join::<B, F, E, Joined<S, B>>(JoinKind::Inner, on)
    }

    /// `LEFT JOIN "b" ON ...`. Rows decode as `(record, Option<b>)`.
    ///
    /// Columns of `b` referenced in later clauses may be NULL; widen them with
    /// `nullable()` when selecting.
    pub fn left_join<B, F, E>(
        self,
        on: F,
    ) -> Result<Select<LeftJoined<S, B>, AllColumns<LeftJoined<S, B>>>, ConstructionError>
    where
        B: Table,
        F: FnOnce(S::Scope, <B as Table>::Columns) -> E,
        E: Expression<SqlType = bool>,
    {
        self.push_join::<B, F, E, LeftJoined<S, B>>(JoinKind::Left, on)
    }
}

/// Clauses taking a closure fail with a [`ConstructionError`] when the
/// returned expression references a column outside the joined tables.
impl<S: Source, Sel> Select<S, Sel> {
    /// Add a `WHERE` predicate. Repeated calls are joined with `AND`.
    pub fn filter<F, E>(mut self, predicate: F) -> Result<Self, ConstructionError>
    where
        F: FnOnce(S::Scope) -> E,
        E: Expression<SqlType = bool>,
    {
        let predicate = predicate(S::scope()).into_expr().node;
        check_scope(&S::schemas(), &predicate)?;
        self.filters.push(predicate);
        Ok(self)
    }

    /// Append an `ORDER BY` key. Earlier keys take precedence.
    pub fn order_by<F, O>(mut self, key: F) -> Result<Self, ConstructionError>
    where
        F: FnOnce(S::Scope) -> O,
        O: IntoOrderTerm,
    {
        let key = key(S::scope()).into_order_term();
        check_scope(&S::schemas(), key.node())?;
        self.order_by.push(key);
        Ok(self)
    }

    pub fn group_by<F, E>(mut self, key: F) -> Result<Self, ConstructionError>
    where
        F: FnOnce(S::Scope) -> E,
        E: Expression,
    {
        let key = key(S::scope()).into_expr().node;
        check_scope(&S::schemas(), &key)?;
        self.group_by.push(key);
        Ok(self)
    }

    pub fn having<F, E>(mut self, predicate: F) -> Result<Self, ConstructionError>
    where
        F: FnOnce(S::Scope) -> E,
        E: Expression<SqlType = bool>,
    {
        let predicate = predicate(S::scope()).into_expr().node;
        check_scope(&S::schemas(), &predicate)?;
        self.having.push(predicate);
        Ok(self)
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Replace the result columns.
    pub fn select<F, Sel2>(self, selection: F) -> Result<Select<S, Sel2>, ConstructionError>
    where
        F: FnOnce(S::Scope) -> Sel2,
        Sel2: Selection,
    {
        let selection = selection(S::scope());
        check_selection(&S::schemas(), &selection)?;
        Ok(self.with_selection(selection))
    }

    /// `SELECT count(*)` over the same source and filters.
    ///
    /// Ordering and paging are dropped.
    pub fn count(self) -> Select<S, Expr<i64>> {
        let mut counted = self.with_selection(count_all());
        counted.order_by.clear();
        counted.limit = None;
        counted.offset = None;
        counted
    }

    fn with_selection<Sel2>(self, selection: Sel2) -> Select<S, Sel2> {
        Select {
            selection,
            distinct: self.distinct,
            joins: self.joins,
            filters: self.filters,
            group_by: self.group_by,
            having: self.having,
            order_by: self.order_by,
            limit: self.limit,
            offset: self.offset,
            _source: PhantomData,
        }
    }
}

impl<S: Source, Sel: Selection> Statement for Select<S, Sel> {
    type Shape = Sel;

    fn to_fragment(&self) -> Fragment {
        let mut out = Fragment::new();
        out.push("SELECT ");
        if self.distinct {
            out.push("DISTINCT ");
        }

        let mut items = Vec::new();
        self.selection.push_items(&mut items);
        if items.is_empty() {
            out.push("NULL");
        }
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(", ");
            }
            item.render(&mut out, true);
        }

        out.push(" FROM ").push_ident(S::base_table());
        for join in &self.joins {
            out.push(match join.kind {
                JoinKind::Inner => " JOIN ",
                JoinKind::Left => " LEFT JOIN ",
            });
            out.push_ident(join.table).push(" ON ");
            render_delimited(&join.on, &mut out, true);
        }

        if !self.filters.is_empty() {
            out.push(" WHERE ");
            render_conjunction(&self.filters, &mut out, true);
        }

        if !self.group_by.is_empty() {
            out.push(" GROUP BY ");
            for (i, key) in self.group_by.iter().enumerate() {
                if i > 0 {
                    out.push(", ");
                }
                key.render(&mut out, true);
            }
        }

        if !self.having.is_empty() {
            out.push(" HAVING ");
            render_conjunction(&self.having, &mut out, true);
        }

        if !self.order_by.is_empty() {
            out.push(" ORDER BY ");
            for (i, term) in self.order_by.iter().enumerate() {
                if i > 0 {
                    out.push(", ");
                }
                term.render(&mut out);
            }
        }

        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                out.push(" LIMIT ").push_bind(Value::Integer(limit));
                if let Some(offset) = offset {
                    out.push(" OFFSET ").push_bind(Value::Integer(offset));
                }
            }
            (None, Some(offset)) => {
                // SQLite requires LIMIT before OFFSET; -1 means unbounded
                out.push(" LIMIT ").push_bind(Value::Integer(-1));
                out.push(" OFFSET ").push_bind(Value::Integer(offset));
            }
            (None, None) => {}
        }

        out
    }

    fn result_labels(&self) -> Vec<String> {
        let mut items = Vec::new();
        self.selection.push_items(&mut items);
        if items.is_empty() {
            return vec!["NULL".to_string()];
        }
        labels_of(&items)
    }
}

impl<S, Sel: Clone> Clone for Select<S, Sel> {
    fn clone(&self) -> Self {
        Self {
            selection: self.selection.clone(),
            distinct: self.distinct,
            joins: self.joins.clone(),
            filters: self.filters.clone(),
            group_by: self.group_by.clone(),
            having: self.having.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
            _source: PhantomData,
        }
    }
}

impl<S: Source, Sel: Selection> fmt::Debug for Select<S, Sel> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("sql", &self.to_sql())
            .finish()
    }
}
