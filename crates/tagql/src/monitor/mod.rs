//! Statement monitoring and hooks.
//!
//! [`InstrumentedDriver`] wraps any [`Driver`](crate::Driver) and gives:
//! - hooks that inspect every statement and may reject it
//! - monitors that receive duration and outcome once monitoring is enabled
//! - slow-query callbacks above a configurable threshold
//!
//! # Example
//!
//! ```rust,ignore
//! use tagql::monitor::{
//!     InstrumentedDriver, MonitorConfig, QueryContext, QueryMonitor, QueryOutcome,
//! };
//! use std::time::Duration;
//!
//! struct PrintMonitor;
//!
//! impl QueryMonitor for PrintMonitor {
//!     fn on_query_complete(
//!         &self,
//!         ctx: &QueryContext,
//!         duration: Duration,
//!         outcome: &QueryOutcome,
//!     ) {
//!         println!("[{duration:?}] {} - {outcome}", ctx.sql);
//!     }
//! }
//!
//! let driver = InstrumentedDriver::new(conn)
//!     .with_config(
//!         MonitorConfig::new()
//!             .with_slow_query_threshold(Duration::from_millis(50))
//!             .enable_monitoring(),
//!     )
//!     .with_monitor(PrintMonitor);
//! ```

mod instrumented;
mod monitors;
mod types;

#[cfg(feature = "tracing")]
mod tracing_hook;


pub use instrumented::{InstrumentedDriver, MonitorConfig};
pub use monitors::{CompositeHook, CompositeMonitor, NoopMonitor, QueryStats, StatsMonitor};
pub use types::{HookAction, QueryContext, QueryHook, QueryMonitor, QueryOutcome, QueryType};

#[cfg(feature = "tracing")]
pub use monitors::LoggingMonitor;
#[cfg(feature = "tracing")]
pub use tracing_hook::TracingSqlHook;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
