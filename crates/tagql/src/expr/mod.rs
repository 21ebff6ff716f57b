//! Typed SQL expressions.
//!
//! An [`Expr<T>`] is an untyped expression tree carrying the Rust type `T` its
//! result decodes into. Operators come from extension traits implemented for
//! every [`Expression`] (columns and expressions alike):
//!
//! - [`ExprOps`]: comparisons, `IN`, `BETWEEN`, ordering, aggregates
//! - [`BoolOps`]: `AND`, `OR`, `NOT` (also via `&`, `|`, `!`)
//! - [`TextOps`]: `||`, `COLLATE`, `LIKE` and friends
//! - [`NumericOps`]: arithmetic (also via `+`, `-`, `*`, `/`, `%`)
//! - [`NullableOps`]: `coalesce`
//!
//! Binary operators always render fully parenthesized, `(lhs OP rhs)`. No
//! rewriting takes place: `!!x` renders as `NOT (NOT (x))`.
//!
//! # Example
//! ```ignore
//! use tagql::prelude::*;
//!
//! let c = Reminder::COLUMNS;
//! let overdue = c.is_completed.toggle().and(c.due_date.lt(now));
//! assert_eq!(
//!     overdue.to_fragment().sql(),
//!     r#"(NOT ("reminders"."isCompleted") AND ("reminders"."dueDate" < ?))"#
//! );
//! ```

mod ops;
mod order;
mod raw;

pub use ops::{
    BoolOps, Collation, ExprOps, NullableOps, NullableType, NumericOps, NumericType, TextOps,
    TextType,
};
pub use order::{IntoOrderTerm, OrderTerm};
pub use raw::{RawSql, raw};

use crate::codec::Codec;
use crate::fragment::Fragment;
use crate::table::{Column, ColumnRef};
use crate::value::Value;
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Is,
    IsNot,
    And,
    Or,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    fn as_sql(self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Is => "IS",
            BinaryOp::IsNot => "IS NOT",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Concat => "||",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatternOp {
    Like,
    Glob,
}

#[derive(Debug, Clone)]
pub(crate) enum RawPart {
    Sql(String),
    Node(Node),
}

/// Untyped expression tree.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Column(ColumnRef),
    Bind(Value),
    Star,
    Not(Box<Node>),
    Neg(Box<Node>),
    Binary {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    IsNull {
        operand: Box<Node>,
        negated: bool,
    },
    Func {
        name: &'static str,
        args: Vec<Node>,
    },
    Collate {
        operand: Box<Node>,
        collation: Collation,
    },
    Pattern {
        op: PatternOp,
        operand: Box<Node>,
        pattern: Box<Node>,
        escaped: bool,
    },
    InList {
        operand: Box<Node>,
        items: Vec<Node>,
        negated: bool,
    },
    Between {
        operand: Box<Node>,
        low: Box<Node>,
        high: Box<Node>,
    },
    Raw(Vec<RawPart>),
}

impl Node {
    pub(crate) fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Node {
        Node::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Comparison that turns `= NULL` into `IS NULL`.
    pub(crate) fn compare(op: BinaryOp, lhs: Node, rhs: Node) -> Node {
        if rhs.is_null_literal() {
            match op {
                BinaryOp::Eq | BinaryOp::Is => {
                    return Node::IsNull {
                        operand: Box::new(lhs),
                        negated: false,
                    };
                }
                BinaryOp::Ne | BinaryOp::IsNot => {
                    return Node::IsNull {
                        operand: Box::new(lhs),
                        negated: true,
                    };
                }
                _ => {}
            }
        }
        Node::binary(op, lhs, rhs)
    }

    pub(crate) fn func(name: &'static str, args: Vec<Node>) -> Node {
        Node::Func { name, args }
    }

    fn is_null_literal(&self) -> bool {
        matches!(self, Node::Bind(Value::Null))
    }

    /// Whether the node renders as one syntactic unit.
    fn is_self_delimited(&self) -> bool {
        !matches!(self, Node::Raw(_))
    }

    /// Label used when this node is a result column.
    pub(crate) fn label(&self) -> String {
        match self {
            Node::Column(col) => col.name.to_string(),
            Node::Func { name, .. } => (*name).to_string(),
            _ => "expr".to_string(),
        }
    }

    /// Call `f` for every column reference in the tree, stopping at the first error.
    pub(crate) fn try_for_each_column<E, F>(&self, f: &mut F) -> Result<(), E>
    where
        F: FnMut(&ColumnRef) -> Result<(), E>,
    {
        match self {
            Node::Column(col) => f(col),
            Node::Bind(_) | Node::Star => Ok(()),
            Node::Not(operand)
            | Node::Neg(operand)
            | Node::IsNull { operand, .. }
            | Node::Collate { operand, .. } => operand.try_for_each_column(f),
            Node::Binary { lhs, rhs, .. } => {
                lhs.try_for_each_column(f)?;
                rhs.try_for_each_column(f)
            }
            Node::Func { args, .. } => args.iter().try_for_each(|arg| arg.try_for_each_column(f)),
            Node::Pattern {
                operand, pattern, ..
            } => {
                operand.try_for_each_column(f)?;
                pattern.try_for_each_column(f)
            }
            Node::InList { operand, items, .. } => {
                operand.try_for_each_column(f)?;
                items.iter().try_for_each(|item| item.try_for_each_column(f))
            }
            Node::Between { operand, low, high } => {
                operand.try_for_each_column(f)?;
                low.try_for_each_column(f)?;
                high.try_for_each_column(f)
            }
            Node::Raw(parts) => parts.iter().try_for_each(|part| match part {
                RawPart::Sql(_) => Ok(()),
                RawPart::Node(node) => node.try_for_each_column(f),
            }),
        }
    }

    /// Render into `out`. `qualify` controls `"table"."column"` vs `"column"`.
    pub(crate) fn render(&self, out: &mut Fragment, qualify: bool) {
        match self {
            Node::Column(col) => {
                if qualify {
                    out.push_qualified(col.table, col.name);
                } else {
                    out.push_ident(col.name);
                }
            }
            Node::Bind(value) => {
                out.push_bind(value.clone());
            }
            Node::Star => {
                out.push("*");
            }
            Node::Not(operand) => {
                out.push("NOT (");
                operand.render(out, qualify);
                out.push(")");
            }
            Node::Neg(operand) => {
                out.push("-(");
                operand.render(out, qualify);
                out.push(")");
            }
            Node::Binary { op, lhs, rhs } => {
                out.push("(");
                lhs.render(out, qualify);
                out.push(" ").push(op.as_sql()).push(" ");
                rhs.render(out, qualify);
                out.push(")");
            }
            Node::IsNull { operand, negated } => {
                out.push("(");
                operand.render(out, qualify);
                out.push(if *negated { " IS NOT NULL)" } else { " IS NULL)" });
            }
            Node::Func { name, args } => {
                out.push(name).push("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push(", ");
                    }
                    arg.render(out, qualify);
                }
                out.push(")");
            }
            Node::Collate { operand, collation } => {
                out.push("(");
                operand.render(out, qualify);
                out.push(" COLLATE ").push(collation.as_sql()).push(")");
            }
            Node::Pattern {
                op,
                operand,
                pattern,
                escaped,
            } => {
                out.push("(");
                operand.render(out, qualify);
                out.push(match op {
                    PatternOp::Like => " LIKE ",
                    PatternOp::Glob => " GLOB ",
                });
                pattern.render(out, qualify);
                if *escaped {
                    out.push(" ESCAPE '\\'");
                }
                out.push(")");
            }
            Node::InList {
                operand,
                items,
                negated,
            } => {
                if items.is_empty() {
                    // x IN () is not valid SQL; fold to a constant predicate
                    out.push(if *negated { "(1 = 1)" } else { "(1 = 0)" });
                    return;
                }
                out.push("(");
                operand.render(out, qualify);
                out.push(if *negated { " NOT IN (" } else { " IN (" });
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(", ");
                    }
                    item.render(out, qualify);
                }
                out.push("))");
            }
            Node::Between { operand, low, high } => {
                out.push("(");
                operand.render(out, qualify);
                out.push(" BETWEEN ");
                low.render(out, qualify);
                out.push(" AND ");
                high.render(out, qualify);
                out.push(")");
            }
            Node::Raw(parts) => {
                for part in parts {
                    match part {
                        RawPart::Sql(sql) => {
                            out.push(sql);
                        }
                        RawPart::Node(node) => node.render(out, qualify),
                    }
                }
            }
        }
    }
}

/// Render predicates joined by `AND`, parenthesizing raw splices.
pub(crate) fn render_conjunction(nodes: &[Node], out: &mut Fragment, qualify: bool) {
    let wrap = nodes.len() > 1;
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push(" AND ");
        }
        if wrap {
            render_delimited(node, out, qualify);
        } else {
            node.render(out, qualify);
        }
    }
}

/// Render `node` as one parenthesized unit.
pub(crate) fn render_delimited(node: &Node, out: &mut Fragment, qualify: bool) {
    if node.is_self_delimited() {
        node.render(out, qualify);
    } else {
        out.push("(");
        node.render(out, qualify);
        out.push(")");
    }
}

/// A typed SQL expression whose result decodes into `T`.
pub struct Expr<T> {
    pub(crate) node: Node,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Expr<T> {
    pub(crate) fn from_node(node: Node) -> Self {
        Self {
            node,
            _marker: PhantomData,
        }
    }

    /// Render with table-qualified column names.
    pub fn to_fragment(&self) -> Fragment {
        let mut out = Fragment::new();
        self.node.render(&mut out, true);
        out
    }

    /// Drop the static type.
    pub fn erase(self) -> AnyExpr {
        AnyExpr { node: self.node }
    }
}

impl<T> Clone for Expr<T> {
    fn clone(&self) -> Self {
        Self::from_node(self.node.clone())
    }
}

impl<T> fmt::Debug for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expr").field(&self.to_fragment().sql()).finish()
    }
}

/// An expression with its static type erased, used for raw SQL splices.
#[derive(Debug, Clone)]
pub struct AnyExpr {
    pub(crate) node: Node,
}

impl AnyExpr {
    pub fn to_fragment(&self) -> Fragment {
        let mut out = Fragment::new();
        self.node.render(&mut out, true);
        out
    }
}

impl<T> From<Expr<T>> for AnyExpr {
    fn from(expr: Expr<T>) -> Self {
        expr.erase()
    }
}

impl<T> From<Column<T>> for AnyExpr {
    fn from(column: Column<T>) -> Self {
        column.into_expr().erase()
    }
}

/// Anything that lowers to a typed expression.
pub trait Expression: Sized {
    /// Rust type the expression decodes into.
    type SqlType;

    fn into_expr(self) -> Expr<Self::SqlType>;
}

impl<T> Expression for Expr<T> {
    type SqlType = T;

    fn into_expr(self) -> Expr<T> {
        self
    }
}

impl<T> Expression for Column<T> {
    type SqlType = T;

    fn into_expr(self) -> Expr<T> {
        Expr::from_node(Node::Column(self.column_ref()))
    }
}

/// Operand conversion: values, columns and expressions usable where a `T` is expected.
pub trait IntoExpr<T> {
    fn into_operand(self) -> Expr<T>;
}

impl<T: Codec> IntoExpr<T> for T {
    fn into_operand(self) -> Expr<T> {
        bind(self)
    }
}

impl<T: Codec> IntoExpr<Option<T>> for T {
    fn into_operand(self) -> Expr<Option<T>> {
        Expr::from_node(Node::Bind(self.encode()))
    }
}

impl IntoExpr<String> for &str {
    fn into_operand(self) -> Expr<String> {
        Expr::from_node(Node::Bind(Value::Text(self.to_string())))
    }
}

impl IntoExpr<Option<String>> for &str {
    fn into_operand(self) -> Expr<Option<String>> {
        Expr::from_node(Node::Bind(Value::Text(self.to_string())))
    }
}

impl<T> IntoExpr<T> for Expr<T> {
    fn into_operand(self) -> Expr<T> {
        self
    }
}

impl<T> IntoExpr<Option<T>> for Expr<T> {
    fn into_operand(self) -> Expr<Option<T>> {
        Expr::from_node(self.node)
    }
}

impl<T> IntoExpr<T> for Column<T> {
    fn into_operand(self) -> Expr<T> {
        self.into_expr()
    }
}

impl<T> IntoExpr<Option<T>> for Column<T> {
    fn into_operand(self) -> Expr<Option<T>> {
        Expr::from_node(self.into_expr().node)
    }
}

/// Lift a value into a bound expression.
pub fn bind<T: Codec>(value: T) -> Expr<T> {
    Expr::from_node(Node::Bind(value.encode()))
}

/// `count(*)`
pub fn count_all() -> Expr<i64> {
    Expr::from_node(Node::func("count", vec![Node::Star]))
}
