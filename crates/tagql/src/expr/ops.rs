//! Operator traits for expressions.

use super::order::{Direction, OrderTerm};
use super::{BinaryOp, Expr, Expression, IntoExpr, Node, PatternOp};
use crate::table::Column;
use crate::tagged::Tagged;
use crate::value::Value;
use std::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Not, Rem, Sub};

/// Collating sequences built into SQLite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collation {
    Binary,
    NoCase,
    RTrim,
}

impl Collation {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            Collation::Binary => "BINARY",
            Collation::NoCase => "NOCASE",
            Collation::RTrim => "RTRIM",
        }
    }
}

fn compare<E: Expression, R: IntoExpr<E::SqlType>>(op: BinaryOp, lhs: E, rhs: R) -> Expr<bool> {
    Expr::from_node(Node::compare(
        op,
        lhs.into_expr().node,
        rhs.into_operand().node,
    ))
}

fn binary<T>(op: BinaryOp, lhs: Node, rhs: Node) -> Expr<T> {
    Expr::from_node(Node::binary(op, lhs, rhs))
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Operators available on every expression.
pub trait ExprOps: Expression {
    /// `(self = rhs)`, or `(self IS NULL)` when `rhs` is NULL.
    fn eq<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<bool> {
        compare(BinaryOp::Eq, self, rhs)
    }

    /// `(self <> rhs)`, or `(self IS NOT NULL)` when `rhs` is NULL.
    fn ne<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<bool> {
        compare(BinaryOp::Ne, self, rhs)
    }

    fn lt<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<bool> {
        compare(BinaryOp::Lt, self, rhs)
    }

    fn lte<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<bool> {
        compare(BinaryOp::Lte, self, rhs)
    }

    fn gt<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<bool> {
        compare(BinaryOp::Gt, self, rhs)
    }

    fn gte<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<bool> {
        compare(BinaryOp::Gte, self, rhs)
    }

    /// Null-safe equality, `(self IS rhs)`.
    fn is<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<bool> {
        compare(BinaryOp::Is, self, rhs)
    }

    fn is_not<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<bool> {
        compare(BinaryOp::IsNot, self, rhs)
    }

    fn is_null(self) -> Expr<bool> {
        Expr::from_node(Node::IsNull {
            operand: Box::new(self.into_expr().node),
            negated: false,
        })
    }

    fn is_not_null(self) -> Expr<bool> {
        Expr::from_node(Node::IsNull {
            operand: Box::new(self.into_expr().node),
            negated: true,
        })
    }

    /// `(self IN (...))`. An empty list renders `(1 = 0)`.
    fn in_list<I>(self, items: I) -> Expr<bool>
    where
        I: IntoIterator,
        I::Item: IntoExpr<Self::SqlType>,
    {
        Expr::from_node(Node::InList {
            operand: Box::new(self.into_expr().node),
            items: items.into_iter().map(|i| i.into_operand().node).collect(),
            negated: false,
        })
    }

    /// `(self NOT IN (...))`. An empty list renders `(1 = 1)`.
    fn not_in<I>(self, items: I) -> Expr<bool>
    where
        I: IntoIterator,
        I::Item: IntoExpr<Self::SqlType>,
    {
        Expr::from_node(Node::InList {
            operand: Box::new(self.into_expr().node),
            items: items.into_iter().map(|i| i.into_operand().node).collect(),
            negated: true,
        })
    }

    fn between<L, H>(self, low: L, high: H) -> Expr<bool>
    where
        L: IntoExpr<Self::SqlType>,
        H: IntoExpr<Self::SqlType>,
    {
        Expr::from_node(Node::Between {
            operand: Box::new(self.into_expr().node),
            low: Box::new(low.into_operand().node),
            high: Box::new(high.into_operand().node),
        })
    }

    fn asc(self) -> OrderTerm {
        OrderTerm::new(self.into_expr().node, Some(Direction::Asc))
    }

    fn desc(self) -> OrderTerm {
        OrderTerm::new(self.into_expr().node, Some(Direction::Desc))
    }

    /// Widen to `Option<T>`, e.g. to select a column from the nullable side of a join.
    fn nullable(self) -> Expr<Option<Self::SqlType>> {
        Expr::from_node(self.into_expr().node)
    }

    fn count(self) -> Expr<i64> {
        Expr::from_node(Node::func("count", vec![self.into_expr().node]))
    }

    fn count_distinct(self) -> Expr<i64> {
        Expr::from_node(Node::Raw(vec![
            super::RawPart::Sql("count(DISTINCT ".to_string()),
            super::RawPart::Node(self.into_expr().node),
            super::RawPart::Sql(")".to_string()),
        ]))
    }

    fn max(self) -> Expr<Option<Self::SqlType>> {
        Expr::from_node(Node::func("max", vec![self.into_expr().node]))
    }

    fn min(self) -> Expr<Option<Self::SqlType>> {
        Expr::from_node(Node::func("min", vec![self.into_expr().node]))
    }
}

impl<E: Expression> ExprOps for E {}

/// Boolean composition.
pub trait BoolOps: Expression<SqlType = bool> {
    fn and<R: Expression<SqlType = bool>>(self, rhs: R) -> Expr<bool> {
        binary(BinaryOp::And, self.into_expr().node, rhs.into_expr().node)
    }

    fn or<R: Expression<SqlType = bool>>(self, rhs: R) -> Expr<bool> {
        binary(BinaryOp::Or, self.into_expr().node, rhs.into_expr().node)
    }

    /// `NOT (self)`
    fn toggle(self) -> Expr<bool> {
        Expr::from_node(Node::Not(Box::new(self.into_expr().node)))
    }
}

impl<E: Expression<SqlType = bool>> BoolOps for E {}

/// Types stored as TEXT.
pub trait TextType {
    /// Result type of `length(...)`.
    type Length;
}

impl TextType for String {
    type Length = i64;
}

impl<T: TextType> TextType for Option<T> {
    type Length = Option<i64>;
}

impl<M, T: TextType> TextType for Tagged<M, T> {
    type Length = T::Length;
}

/// Text operators.
pub trait TextOps: Expression {
    /// `(self || rhs)`
    fn concat<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<Self::SqlType> {
        binary(BinaryOp::Concat, self.into_expr().node, rhs.into_operand().node)
    }

    /// `(self COLLATE NOCASE)` and friends.
    fn collate(self, collation: Collation) -> Expr<Self::SqlType> {
        Expr::from_node(Node::Collate {
            operand: Box::new(self.into_expr().node),
            collation,
        })
    }

    /// `(self LIKE ?)` with the pattern bound as is.
    fn like(self, pattern: &str) -> Expr<bool> {
        pattern_match(self, PatternOp::Like, pattern.to_string(), false)
    }

    /// `(self GLOB ?)`
    fn glob(self, pattern: &str) -> Expr<bool> {
        pattern_match(self, PatternOp::Glob, pattern.to_string(), false)
    }

    /// Substring match. Wildcards in `needle` are matched literally.
    fn contains(self, needle: &str) -> Expr<bool> {
        let pattern = format!("%{}%", escape_like(needle));
        pattern_match(self, PatternOp::Like, pattern, true)
    }

    fn starts_with(self, prefix: &str) -> Expr<bool> {
        let pattern = format!("{}%", escape_like(prefix));
        pattern_match(self, PatternOp::Like, pattern, true)
    }

    fn ends_with(self, suffix: &str) -> Expr<bool> {
        let pattern = format!("%{}", escape_like(suffix));
        pattern_match(self, PatternOp::Like, pattern, true)
    }

    fn lower(self) -> Expr<Self::SqlType> {
        Expr::from_node(Node::func("lower", vec![self.into_expr().node]))
    }

    fn upper(self) -> Expr<Self::SqlType> {
        Expr::from_node(Node::func("upper", vec![self.into_expr().node]))
    }

    fn trim(self) -> Expr<Self::SqlType> {
        Expr::from_node(Node::func("trim", vec![self.into_expr().node]))
    }

    fn length(self) -> Expr<<Self::SqlType as TextType>::Length>
    where
        Self::SqlType: TextType,
    {
        Expr::from_node(Node::func("length", vec![self.into_expr().node]))
    }
}

fn pattern_match<E: Expression>(
    lhs: E,
    op: PatternOp,
    pattern: String,
    escaped: bool,
) -> Expr<bool> {
    Expr::from_node(Node::Pattern {
        op,
        operand: Box::new(lhs.into_expr().node),
        pattern: Box::new(Node::Bind(Value::Text(pattern))),
        escaped,
    })
}

impl<E> TextOps for E
where
    E: Expression,
    E::SqlType: TextType,
{
}

/// Types with SQL arithmetic.
pub trait NumericType {}

macro_rules! impl_numeric_type {
    ($($ty:ty),*) => {$( impl NumericType for $ty {} )*};
}

impl_numeric_type!(i8, i16, i32, i64, u8, u16, u32, f32, f64);

impl<T: NumericType> NumericType for Option<T> {}

impl<M, T: NumericType> NumericType for Tagged<M, T> {}

/// Arithmetic operators.
pub trait NumericOps: Expression {
    fn add<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<Self::SqlType> {
        binary(BinaryOp::Add, self.into_expr().node, rhs.into_operand().node)
    }

    fn sub<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<Self::SqlType> {
        binary(BinaryOp::Sub, self.into_expr().node, rhs.into_operand().node)
    }

    fn mul<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<Self::SqlType> {
        binary(BinaryOp::Mul, self.into_expr().node, rhs.into_operand().node)
    }

    fn div<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<Self::SqlType> {
        binary(BinaryOp::Div, self.into_expr().node, rhs.into_operand().node)
    }

    fn rem<R: IntoExpr<Self::SqlType>>(self, rhs: R) -> Expr<Self::SqlType> {
        binary(BinaryOp::Rem, self.into_expr().node, rhs.into_operand().node)
    }

    fn neg(self) -> Expr<Self::SqlType> {
        Expr::from_node(Node::Neg(Box::new(self.into_expr().node)))
    }

    /// `sum(self)`, NULL over an empty set.
    fn sum(self) -> Expr<Option<Self::SqlType>> {
        Expr::from_node(Node::func("sum", vec![self.into_expr().node]))
    }

    fn avg(self) -> Expr<Option<f64>> {
        Expr::from_node(Node::func("avg", vec![self.into_expr().node]))
    }
}

impl<E> NumericOps for E
where
    E: Expression,
    E::SqlType: NumericType,
{
}

/// `Option<T>` and wrappers around it.
pub trait NullableType {
    type Inner;
}

impl<T> NullableType for Option<T> {
    type Inner = T;
}

impl<M, T: NullableType> NullableType for Tagged<M, T> {
    type Inner = Tagged<M, T::Inner>;
}

/// Operators on nullable expressions.
pub trait NullableOps: Expression {
    /// `coalesce(self, fallback)`, typed as the non-optional inner type.
    fn coalesce<R>(self, fallback: R) -> Expr<<Self::SqlType as NullableType>::Inner>
    where
        Self::SqlType: NullableType,
        R: IntoExpr<<Self::SqlType as NullableType>::Inner>,
    {
        Expr::from_node(Node::func(
            "coalesce",
            vec![self.into_expr().node, fallback.into_operand().node],
        ))
    }
}

impl<E> NullableOps for E
where
    E: Expression,
    E::SqlType: NullableType,
{
}

macro_rules! impl_arith_operator {
    ($target:ident, $($trait:ident :: $method:ident => $op:ident),* $(,)?) => {$(
        impl<T: NumericType, R: IntoExpr<T>> $trait<R> for $target<T> {
            type Output = Expr<T>;

            fn $method(self, rhs: R) -> Expr<T> {
                binary(BinaryOp::$op, self.into_expr().node, rhs.into_operand().node)
            }
        }
    )*};
}

impl_arith_operator!(
    Expr,
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => Div,
    Rem::rem => Rem
);
impl_arith_operator!(
    Column,
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => Div,
    Rem::rem => Rem
);

impl<T: NumericType> Neg for Expr<T> {
    type Output = Expr<T>;

    fn neg(self) -> Expr<T> {
        Expr::from_node(Node::Neg(Box::new(self.node)))
    }
}

macro_rules! impl_bool_operators {
    ($($target:ty),*) => {$(
        impl Not for $target {
            type Output = Expr<bool>;

            fn not(self) -> Expr<bool> {
                Expr::from_node(Node::Not(Box::new(self.into_expr().node)))
            }
        }

        impl<R: Expression<SqlType = bool>> BitAnd<R> for $target {
            type Output = Expr<bool>;

            fn bitand(self, rhs: R) -> Expr<bool> {
                binary(BinaryOp::And, self.into_expr().node, rhs.into_expr().node)
            }
        }

        impl<R: Expression<SqlType = bool>> BitOr<R> for $target {
            type Output = Expr<bool>;

            fn bitor(self, rhs: R) -> Expr<bool> {
                binary(BinaryOp::Or, self.into_expr().node, rhs.into_expr().node)
            }
        }
    )*};
}

impl_bool_operators!(Expr<bool>, Column<bool>);
