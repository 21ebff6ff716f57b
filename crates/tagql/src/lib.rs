//! # tagql
//!
//! Typed SQL statement construction and execution for SQLite.
//!
//! ## Features
//!
//! - **Typed tables**: [`table!`] turns a struct into a table description with
//!   a typed column set
//! - **Typed expressions**: comparisons, boolean logic, text and arithmetic
//!   operators checked against the column types
//! - **Tagged identifiers**: [`Tagged<Tag, Raw>`] keeps the ids of different
//!   tables apart at compile time and behaves like `Raw` everywhere else
//! - **Parameterized rendering**: every value is bound, never spliced into the SQL text
//! - **Pluggable execution**: statements run through the [`Driver`] trait;
//!   `rusqlite::Connection` implements it out of the box
//! - **Query monitoring**: hooks, monitors and slow-query reporting via
//!   [`monitor::InstrumentedDriver`]
//!
//! ## Example
//!
//! ```ignore
//! use tagql::prelude::*;
//!
//! tagql::table! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Reminder in "reminders" as ReminderColumns {
//!         pub id: Tagged<Reminder, Uuid> => "id" [primary_key],
//!         pub title: String => "title" [has_default],
//!         pub is_completed: bool => "isCompleted" [has_default],
//!     }
//! }
//!
//! // SELECT
//! let open: Vec<String> = Reminder::filter(|c| !c.is_completed)?
//!     .select(|c| c.title)?
//!     .fetch_all(&conn)?;
//!
//! // UPDATE ... RETURNING
//! let toggled = Reminder::update(|c| [c.is_completed.set(c.is_completed.toggle())])?
//!     .returning(|c| (c.title, c.is_completed))?
//!     .fetch_all(&conn)?;
//!
//! // DELETE
//! Reminder::delete().filter(|c| c.is_completed)?.execute(&conn)?;
//! ```

pub mod codec;
pub mod driver;
pub mod error;
pub mod expr;
pub mod fragment;
pub mod ident;
pub mod monitor;
pub mod prelude;
pub mod qb;
pub mod row;
pub mod table;
pub mod tagged;
pub mod value;

mod macros;

#[cfg(test)]
mod fixtures;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use codec::{Codec, Json, UnixTime, UuidText};
pub use driver::Driver;
pub use error::{
    ConstructionError, DecodeError, DecodeReason, DriverError, DriverErrorKind, QueryError,
    QueryResult,
};
pub use expr::{
    AnyExpr, BoolOps, Collation, Expr, ExprOps, Expression, IntoExpr, IntoOrderTerm, NullableOps,
    NumericOps, OrderTerm, RawSql, TextOps, bind, count_all,
};
pub use fragment::Fragment;
pub use monitor::{
    CompositeHook, CompositeMonitor, HookAction, InstrumentedDriver, MonitorConfig, NoopMonitor,
    QueryContext, QueryHook, QueryMonitor, QueryOutcome, QueryStats, QueryType, StatsMonitor,
};
pub use qb::{
    AllColumns, ColumnList, DefaultValues, Delete, Insert, Joined, LeftJoined, Record, Select,
    Selection, Source, Statement, Update,
};
pub use row::RowReader;
pub use table::{Assignment, Column, ColumnDef, ColumnRef, Table, TableSchema};
pub use tagged::Tagged;
pub use value::{StorageKind, Value};

#[cfg(feature = "tracing")]
pub use monitor::{LoggingMonitor, TracingSqlHook};
