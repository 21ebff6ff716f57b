use super::monitors::{CompositeHook, NoopMonitor};
use super::types::{HookAction, QueryContext, QueryHook, QueryMonitor, QueryOutcome};
use crate::driver::Driver;
use crate::error::DriverError;
use crate::value::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// When an [`InstrumentedDriver`] reports to its monitor.
///
/// Monitoring is off until enabled; hooks run either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorConfig {
    enabled: bool,
    slow_query_threshold: Option<Duration>,
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable_monitoring(self) -> Self {
        Self {
            enabled: true,
            ..self
        }
    }

    /// Statements running longer than `threshold` also reach `on_slow_query`.
    pub fn with_slow_query_threshold(self, threshold: Duration) -> Self {
        Self {
            slow_query_threshold: Some(threshold),
            ..self
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn slow_query_threshold(&self) -> Option<Duration> {
        self.slow_query_threshold
    }

    pub(crate) fn is_slow(&self, duration: Duration) -> bool {
        self.slow_query_threshold
            .is_some_and(|threshold| duration > threshold)
    }
}

/// A [`Driver`] wrapper that runs hooks and reports to a monitor.
///
/// Hooks run on every statement. Monitor callbacks fire only once monitoring
/// is enabled in the [`MonitorConfig`].
///
/// ```ignore
/// let conn = Connection::open_in_memory()?;
/// let stats = Arc::new(StatsMonitor::new());
/// let driver = InstrumentedDriver::new(conn)
///     .with_config(MonitorConfig::new().enable_monitoring())
///     .with_monitor_arc(stats.clone());
///
/// Reminder::all().fetch_all(&driver)?;
/// assert_eq!(stats.stats().select_count, 1);
/// ```
pub struct InstrumentedDriver<D> {
    driver: D,
    monitor: Arc<dyn QueryMonitor>,
    hook: Option<Arc<dyn QueryHook>>,
    config: MonitorConfig,
}

impl<D: Driver> InstrumentedDriver<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            monitor: Arc::new(NoopMonitor),
            hook: None,
            config: MonitorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_monitor<M: QueryMonitor + 'static>(mut self, monitor: M) -> Self {
        self.monitor = Arc::new(monitor);
        self
    }

    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Replace any existing hook.
    pub fn with_hook<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Add a hook after the existing ones.
    pub fn add_hook<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.add_hook_arc(Arc::new(hook))
    }

    pub fn add_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hook = Some(match self.hook.take() {
            None => hook,
            Some(existing) => Arc::new(CompositeHook::new().add_arc(existing).add_arc(hook)),
        });
        self
    }

    pub fn is_monitoring_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn inner(&self) -> &D {
        &self.driver
    }

    pub fn into_inner(self) -> D {
        self.driver
    }

    fn apply_hook(&self, ctx: &QueryContext) -> Result<(), DriverError> {
        let Some(hook) = &self.hook else {
            return Ok(());
        };
        match hook.before_query(ctx) {
            HookAction::Continue => Ok(()),
            HookAction::Abort(reason) => Err(DriverError::rejected(format!(
                "statement aborted by hook: {reason}"
            ))),
        }
    }

    fn report(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        if let Some(hook) = &self.hook {
            hook.after_query(ctx, duration, outcome);
        }
        if !self.config.is_enabled() {
            return;
        }
        self.monitor.on_query_complete(ctx, duration, outcome);
        if self.config.is_slow(duration) {
            self.monitor.on_slow_query(ctx, duration);
        }
    }
}

impl<D: Driver> Driver for InstrumentedDriver<D> {
    fn run(&self, sql: &str, values: &[Value]) -> Result<Vec<Vec<Value>>, DriverError> {
        let ctx = QueryContext::new(sql, values.len());
        self.apply_hook(&ctx)?;

        if self.config.is_enabled() {
            self.monitor.on_query_start(&ctx);
        }
        let start = Instant::now();
        let result = self.driver.run(sql, values);
        let duration = start.elapsed();

        let outcome = match &result {
            Ok(rows) => QueryOutcome::Rows(rows.len()),
            Err(err) => QueryOutcome::error(err.to_string()),
        };
        self.report(&ctx, duration, &outcome);
        result
    }
}
