//! The execution seam between statements and a database.

use crate::error::{DriverError, QueryError, QueryResult};
use crate::fragment::Fragment;
use crate::qb::Selection;
use crate::row::RowReader;
use crate::value::Value;
use std::sync::Arc;

/// Runs rendered SQL and returns result rows as positional values.
///
/// One call per statement. Rows must contain one value per result column, in
/// order. Implemented for `rusqlite::Connection` behind the `sqlite` feature,
/// and by [`InstrumentedDriver`](crate::monitor::InstrumentedDriver) for
/// monitoring.
pub trait Driver {
    fn run(&self, sql: &str, values: &[Value]) -> Result<Vec<Vec<Value>>, DriverError>;
}

impl<D: Driver + ?Sized> Driver for &D {
    fn run(&self, sql: &str, values: &[Value]) -> Result<Vec<Vec<Value>>, DriverError> {
        (**self).run(sql, values)
    }
}

impl<D: Driver + ?Sized> Driver for Box<D> {
    fn run(&self, sql: &str, values: &[Value]) -> Result<Vec<Vec<Value>>, DriverError> {
        (**self).run(sql, values)
    }
}

impl<D: Driver + ?Sized> Driver for Arc<D> {
    fn run(&self, sql: &str, values: &[Value]) -> Result<Vec<Vec<Value>>, DriverError> {
        (**self).run(sql, values)
    }
}

/// Target of every log event this crate emits.
#[cfg(feature = "tracing")]
pub(crate) const LOG_TARGET: &str = "tagql.sql";

pub(crate) fn log_statement(sql: &str, param_count: usize) {
    #[cfg(feature = "tracing")]
    tracing::debug!(target: LOG_TARGET, sql, param_count, "executing statement");
    #[cfg(not(feature = "tracing"))]
    let _ = (sql, param_count);
}

/// Run `fragment` and decode every row as `Sel`.
///
/// The first row that fails to decode fails the whole call.
pub(crate) fn fetch<Sel, D>(
    driver: &D,
    fragment: Fragment,
    labels: &[String],
) -> QueryResult<Vec<Sel::Output>>
where
    Sel: Selection,
    D: Driver + ?Sized,
{
    let (sql, values) = fragment.into_parts();
    log_statement(&sql, values.len());
    let rows = driver.run(&sql, &values)?;

    let mut decoded = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        if row.len() != labels.len() {
            return Err(QueryError::ShapeMismatch {
                expected: labels.len(),
                actual: row.len(),
            });
        }
        let mut reader = RowReader::new(row, labels);
        match Sel::decode(&mut reader) {
            Ok(value) => decoded.push(value),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(target: LOG_TARGET, row = index, error = %err, "row decode failed");
                #[cfg(not(feature = "tracing"))]
                let _ = index;
                return Err(err.into());
            }
        }
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ExprOps;
    use crate::fixtures::{Priority, Reminder};
    use crate::qb::Statement;
    use crate::table::Table;
    use std::cell::RefCell;

    /// Returns canned rows and records every call.
    struct Canned {
        rows: Vec<Vec<Value>>,
        calls: RefCell<Vec<(String, Vec<Value>)>>,
    }

    impl Canned {
        fn new(rows: Vec<Vec<Value>>) -> Self {
            Self {
                rows,
                calls: Default::default(),
            }
        }
    }

    impl Driver for Canned {
        fn run(&self, sql: &str, values: &[Value]) -> Result<Vec<Vec<Value>>, DriverError> {
            self.calls
                .borrow_mut()
                .push((sql.to_string(), values.to_vec()));
            Ok(self.rows.clone())
        }
    }

    #[test]
    fn fetch_renders_once_and_decodes_rows() {
        let driver = Canned::new(vec![
            vec![Value::Text("a".into()), Value::Integer(3)],
            vec![Value::Text("b".into()), Value::Null],
        ]);
        let rows = Reminder::filter(|c| c.title.ne("z"))
            .unwrap()
            .select(|c| (c.title, c.priority))
            .unwrap()
            .fetch_all(&driver)
            .unwrap();
        assert_eq!(
            rows,
            [("a".to_string(), Some(Priority::High)), ("b".to_string(), None)]
        );

        let calls = driver.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, vec![Value::Text("z".into())]);
    }

    #[test]
    fn rows_of_the_wrong_width_are_rejected() {
        let driver = Canned::new(vec![vec![Value::Text("a".into())]]);
        let err = Reminder::select(|c| (c.title, c.priority))
            .unwrap()
            .fetch_all(&driver)
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::ShapeMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn unknown_enum_values_fail_the_whole_fetch() {
        let driver = Canned::new(vec![vec![Value::Integer(1)], vec![Value::Integer(9)]]);
        let err = Reminder::select(|c| c.priority)
            .unwrap()
            .fetch_all(&driver)
            .unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn fetch_one_and_optional() {
        let empty = Canned::new(Vec::new());
        let q = Reminder::select(|c| c.title).unwrap();
        assert!(q.fetch_one(&empty).unwrap_err().is_not_found());
        assert_eq!(q.fetch_optional(&empty).unwrap(), None);

        let boxed: Box<dyn Driver> = Box::new(Canned::new(vec![vec![Value::Text("x".into())]]));
        assert_eq!(q.fetch_one(&boxed).unwrap(), "x");
        assert_eq!(q.fetch_one(boxed.as_ref()).unwrap(), "x");
    }
}
