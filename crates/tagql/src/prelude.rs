//! Convenient imports for typical `tagql` usage.
//!
//! ```ignore
//! use tagql::prelude::*;
//! ```

pub use crate::{
    BoolOps, Collation, Column, Driver, Expr, ExprOps, Expression, NullableOps, NumericOps,
    QueryError, QueryResult, Statement, Table, Tagged, TextOps, Value, bind, count_all,
};
pub use crate::{int_enum, sql, table};
