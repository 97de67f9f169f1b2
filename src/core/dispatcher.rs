//! Dispatch core: filter each log call, fan accepted records out to the sinks

use super::{
    appender::Appender,
    composite::CompositeSink,
    directive::{load_directives, DirectiveKind},
    error::Result,
    filter::{FilterDecision, FilterPolicy},
    log_fields::LogFields,
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::DispatchMetrics,
    output_format::OutputFormat,
    timestamp::TimestampFormat,
};
use crate::config::{compose_sinks, DispatchConfig};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Called after a fatal record has been delivered and the sinks flushed
pub type FatalHook = Arc<dyn Fn() + Send + Sync>;

fn exit_process() -> FatalHook {
    Arc::new(|| std::process::exit(1))
}

/// Filters log calls and hands accepted records to the active composite sink.
///
/// `verbose`, `debug`, `success`, `info` and the generic `log` go through the
/// [`FilterPolicy`]. `warn`, `error` and `fatal` are always emitted.
pub struct Dispatcher {
    policy: Arc<FilterPolicy>,
    sink: RwLock<Arc<CompositeSink>>,
    /// Sink set aside by `disable`, restored by `enable`
    parked: Mutex<Option<Arc<CompositeSink>>>,
    metrics: Arc<DispatchMetrics>,
    on_fatal: FatalHook,
}

impl Dispatcher {
    pub fn new(policy: Arc<FilterPolicy>, sink: CompositeSink, metrics: Arc<DispatchMetrics>) -> Self {
        Self {
            policy,
            sink: RwLock::new(Arc::new(sink)),
            parked: Mutex::new(None),
            metrics,
            on_fatal: exit_process(),
        }
    }

    /// Build a dispatcher from startup configuration.
    ///
    /// Whitelist directives are registered before blacklist directives; bad
    /// directives are reported and skipped.
    ///
    /// # Errors
    ///
    /// Returns `SinkInitialization` when an enabled sink cannot be built
    pub fn from_config(config: &DispatchConfig) -> Result<Self> {
        let metrics = Arc::new(DispatchMetrics::new());
        let sink = compose_sinks(config, Arc::clone(&metrics))?;

        let policy = Arc::new(FilterPolicy::new(config.threshold));
        load_directives(&policy, DirectiveKind::ForceAllow, &config.whitelist);
        load_directives(&policy, DirectiveKind::Suppress, &config.blacklist);

        Ok(Self::new(policy, sink, metrics))
    }

    /// Replace the fatal action of an already built dispatcher
    #[must_use = "returns the dispatcher with the new hook"]
    pub fn with_fatal_hook(mut self, hook: FatalHook) -> Self {
        self.on_fatal = hook;
        self
    }

    pub fn policy(&self) -> &Arc<FilterPolicy> {
        &self.policy
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    pub fn set_threshold(&self, level: LogLevel) {
        self.policy.set_threshold(level);
    }

    pub fn suppress_module(&self, module: impl Into<String>, level: LogLevel) {
        self.policy.suppress(module, level);
    }

    pub fn force_allow_module(&self, module: impl Into<String>, level: LogLevel) {
        self.policy.force_allow(module, level);
    }

    /// Filtered path: consult the policy, emit on acceptance.
    ///
    /// Returns `true` when the record was accepted.
    pub fn dispatch(&self, record: LogRecord) -> bool {
        let decision = self.policy.decide(record.level, record.module());

        match decision {
            FilterDecision::Suppressed | FilterDecision::BelowThreshold => {
                self.metrics.record_filtered();
                false
            }
            FilterDecision::ForcedByModule | FilterDecision::AboveThreshold => {
                self.emit(record);
                true
            }
        }
    }

    /// Unfiltered path: hand the record straight to the active sinks.
    pub fn emit(&self, record: LogRecord) {
        // Clone the Arc so no lock is held while appenders run
        let sink = Arc::clone(&self.sink.read());
        if sink.is_dead() {
            return;
        }
        self.metrics.record_accepted();
        sink.emit(&record, &self.metrics);
    }

    /// Emit, flush every sink (bounded by the remote timeout), then run the
    /// fatal hook. With the default hook this never returns.
    pub fn emit_fatal(&self, record: LogRecord) {
        self.emit(record);
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush before fatal exit: {}", e);
        }
        (self.on_fatal)();
    }

    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        self.dispatch(LogRecord::new(level, message));
    }

    pub fn log_with_fields(&self, level: LogLevel, message: impl AsRef<str>, fields: LogFields) {
        self.dispatch(LogRecord::new(level, message).with_fields(fields));
    }

    #[inline]
    pub fn verbose(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Verbose, message);
    }

    #[inline]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn success(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Success, message);
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl AsRef<str>) {
        self.emit(LogRecord::new(LogLevel::Warn, message));
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(LogRecord::new(LogLevel::Error, message));
    }

    #[inline]
    pub fn fatal(&self, message: impl AsRef<str>) {
        self.emit_fatal(LogRecord::new(LogLevel::Fatal, message));
    }

    pub fn verbose_with_fields(&self, message: impl AsRef<str>, fields: LogFields) {
        self.log_with_fields(LogLevel::Verbose, message, fields);
    }

    pub fn debug_with_fields(&self, message: impl AsRef<str>, fields: LogFields) {
        self.log_with_fields(LogLevel::Debug, message, fields);
    }

    pub fn success_with_fields(&self, message: impl AsRef<str>, fields: LogFields) {
        self.log_with_fields(LogLevel::Success, message, fields);
    }

    pub fn info_with_fields(&self, message: impl AsRef<str>, fields: LogFields) {
        self.log_with_fields(LogLevel::Info, message, fields);
    }

    pub fn warn_with_fields(&self, message: impl AsRef<str>, fields: LogFields) {
        self.emit(LogRecord::new(LogLevel::Warn, message).with_fields(fields));
    }

    pub fn error_with_fields(&self, message: impl AsRef<str>, fields: LogFields) {
        self.emit(LogRecord::new(LogLevel::Error, message).with_fields(fields));
    }

    pub fn fatal_with_fields(&self, message: impl AsRef<str>, fields: LogFields) {
        self.emit_fatal(LogRecord::new(LogLevel::Fatal, message).with_fields(fields));
    }

    /// Swap in a sink that discards everything. The current sink is kept
    /// for [`enable`](Self::enable).
    pub fn disable(&self) {
        let mut sink = self.sink.write();
        if sink.is_dead() {
            return;
        }
        let previous = std::mem::replace(&mut *sink, Arc::new(CompositeSink::dead()));
        *self.parked.lock() = Some(previous);
    }

    /// Restore the sink set aside by [`disable`](Self::disable).
    pub fn enable(&self) {
        let mut sink = self.sink.write();
        if let Some(previous) = self.parked.lock().take() {
            *sink = previous;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.parked.lock().is_none()
    }

    /// Replace the active sink set. Clears anything parked by `disable`.
    pub fn replace_sink(&self, sink: CompositeSink) {
        let mut active = self.sink.write();
        *active = Arc::new(sink);
        self.parked.lock().take();
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.sink.read().appender_names()
    }

    pub fn flush(&self) -> Result<()> {
        let sink = Arc::clone(&self.sink.read());
        sink.flush()
    }

    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("threshold", &self.policy.threshold())
            .field("sinks", &self.sink_names())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Builder for constructing a Dispatcher with a fluent API
///
/// # Example
/// ```
/// use rust_log_dispatch::prelude::*;
///
/// let dispatcher = Dispatcher::builder()
///     .threshold(LogLevel::Info)
///     .format(OutputFormat::Text)
///     .appender(ConsoleAppender::new())
///     .build();
///
/// dispatcher.suppress_module("db", LogLevel::Warn);
/// dispatcher.info("ready");
/// ```
pub struct DispatcherBuilder {
    threshold: Option<LogLevel>,
    policy: Option<Arc<FilterPolicy>>,
    format: OutputFormat,
    timestamp_format: TimestampFormat,
    appenders: Vec<Box<dyn Appender>>,
    metrics: Option<Arc<DispatchMetrics>>,
    on_fatal: Option<FatalHook>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            threshold: None,
            policy: None,
            format: OutputFormat::default(),
            timestamp_format: TimestampFormat::default(),
            appenders: Vec::new(),
            metrics: None,
            on_fatal: None,
        }
    }

    /// Set the global threshold (default `Debug`)
    #[must_use = "builder methods return a new value"]
    pub fn threshold(mut self, level: LogLevel) -> Self {
        self.threshold = Some(level);
        self
    }

    /// Share an existing policy instead of creating a fresh one
    #[must_use = "builder methods return a new value"]
    pub fn policy(mut self, policy: Arc<FilterPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn boxed_appender(mut self, appender: Box<dyn Appender>) -> Self {
        self.appenders.push(appender);
        self
    }

    /// Share metrics with appenders built outside the builder
    #[must_use = "builder methods return a new value"]
    pub fn metrics(mut self, metrics: Arc<DispatchMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Replace the default fatal action (`std::process::exit(1)`)
    #[must_use = "builder methods return a new value"]
    pub fn on_fatal(mut self, hook: FatalHook) -> Self {
        self.on_fatal = Some(hook);
        self
    }

    pub fn build(self) -> Dispatcher {
        let policy = self
            .policy
            .unwrap_or_else(|| Arc::new(FilterPolicy::new(LogLevel::Debug)));
        if let Some(level) = self.threshold {
            policy.set_threshold(level);
        }

        let sink = CompositeSink::new(self.format, self.appenders)
            .with_timestamp_format(self.timestamp_format);
        let metrics = self.metrics.unwrap_or_default();

        let dispatcher = Dispatcher::new(policy, sink, metrics);
        match self.on_fatal {
            Some(hook) => dispatcher.with_fatal_hook(hook),
            None => dispatcher,
        }
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
