//! Statement builders.
//!
//! Every builder is a plain value: methods consume it and return the updated
//! builder, so a partially built statement can be cloned and extended in
//! several directions. Methods taking a column closure return a `Result` and
//! reject columns of tables the statement does not reference. Builders are
//! started from [`Table`](crate::Table):
//!
//! ```ignore
//! use tagql::prelude::*;
//!
//! // SELECT
//! let open = Reminder::filter(|c| !c.is_completed)?
//!     .order_by(|c| c.title.asc())?
//!     .fetch_all(&conn)?;
//!
//! // INSERT ... RETURNING
//! let ids = Reminder::insert(|c| (c.id, c.title))?
//!     .values((Uuid::new_v4().into(), "Groceries".to_string()))
//!     .returning(|c| c.id)?
//!     .fetch_all(&conn)?;
//!
//! // UPDATE
//! Reminder::update(|c| [c.is_completed.set(c.is_completed.toggle())])?
//!     .filter(|c| c.priority.is_null())?
//!     .execute(&conn)?;
//!
//! // DELETE
//! Reminder::delete()
//!     .filter(|c| c.is_completed)?
//!     .execute(&conn)?;
//! ```
//!
//! Rendering goes through [`Statement::to_sql`] (placeholders) or
//! [`Statement::to_debug_sql`] (inlined literals).

mod delete;
mod insert;
mod select;
mod selection;
mod statement;
mod update;

pub use delete::Delete;
pub use insert::{ColumnList, DefaultValues, Insert, Record};
pub use select::Select;
pub use selection::{AllColumns, Joined, LeftJoined, Selection, Source};
pub use statement::Statement;
pub use update::Update;

#[cfg(test)]
mod tests;
