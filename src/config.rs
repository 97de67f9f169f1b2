//! Startup configuration and sink composition
//!
//! [`DispatchConfig`] gathers everything read once at startup: the global
//! threshold, the module directive lists and which optional sinks are on.
//! [`compose_sinks`] turns it into the composite target; a sink that is
//! switched on but cannot be built is a hard error.

use crate::appenders::{
    parse_dsn, resolve_collector_endpoint, ConsoleAppender, DeliveryOptions,
    ErrorTrackingAppender, RemoteAppender, SentryTracker,
};
use crate::core::{Appender, CompositeSink, DispatchMetrics, LogLevel, LoggerError, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Dispatch configuration
///
/// # Example
///
/// ```
/// use rust_log_dispatch::{DispatchConfig, LogLevel};
///
/// let config: DispatchConfig = serde_json::from_str(
///     r#"{ "threshold": "info", "blacklist": "db=warn", "remote_collector": false }"#,
/// ).unwrap();
/// assert_eq!(config.threshold, LogLevel::Info);
/// assert_eq!(config.remote_timeout_ms, 250);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Global threshold
    pub threshold: LogLevel,
    /// Force-allow directives, `module=level,...`
    pub whitelist: String,
    /// Suppress directives, `module=level,...`
    pub blacklist: String,
    /// Ship lines to the remote collector
    pub remote_collector: bool,
    /// Explicit collector URL; otherwise chosen by `inside_container`
    pub remote_endpoint: Option<String>,
    pub inside_container: bool,
    pub remote_timeout_ms: u64,
    pub remote_workers: usize,
    pub remote_queue_capacity: usize,
    /// Forward severe lines to the error tracker
    pub error_tracking: bool,
    pub error_tracking_dsn: Option<String>,
    pub error_tracking_min_level: LogLevel,
    pub format: OutputFormat,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        let delivery = DeliveryOptions::default();
        Self {
            threshold: LogLevel::Debug,
            whitelist: String::new(),
            blacklist: String::new(),
            remote_collector: false,
            remote_endpoint: None,
            inside_container: false,
            remote_timeout_ms: delivery.timeout.as_millis() as u64,
            remote_workers: delivery.workers,
            remote_queue_capacity: delivery.queue_capacity,
            error_tracking: false,
            error_tracking_dsn: None,
            error_tracking_min_level: LogLevel::Error,
            format: OutputFormat::Json,
        }
    }
}

impl DispatchConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// Recognized keys: `LOGHUB_SINK` (`enabled`), `LOGHUB_ENDPOINT`,
    /// `INSIDE_DOCKER`, `SENTRY_SINK` (DSN), `LOG_WHITELIST`,
    /// `LOG_BLACKLIST`, `LOG_LEVEL`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        config.remote_collector = lookup("LOGHUB_SINK").as_deref() == Some("enabled");
        config.remote_endpoint = non_empty("LOGHUB_ENDPOINT");
        config.inside_container = non_empty("INSIDE_DOCKER").is_some();

        if let Some(dsn) = non_empty("SENTRY_SINK") {
            config.error_tracking = true;
            config.error_tracking_dsn = Some(dsn);
        }

        config.whitelist = lookup("LOG_WHITELIST").unwrap_or_default();
        config.blacklist = lookup("LOG_BLACKLIST").unwrap_or_default();

        if let Some(token) = non_empty("LOG_LEVEL") {
            match token.parse::<LogLevel>() {
                Ok(level) => config.threshold = level,
                Err(e) => eprintln!("[LOG CONFIG] Ignoring LOG_LEVEL: {}", e),
            }
        }

        config
    }

    /// Collector URL the remote sink posts to
    pub fn collector_endpoint(&self) -> String {
        self.remote_endpoint
            .clone()
            .unwrap_or_else(|| resolve_collector_endpoint(self.inside_container).to_string())
    }

    pub fn delivery_options(&self) -> DeliveryOptions {
        DeliveryOptions {
            timeout: Duration::from_millis(self.remote_timeout_ms),
            workers: self.remote_workers,
            queue_capacity: self.remote_queue_capacity,
        }
    }
}

/// Build the composite sink for `config`.
///
/// The console is always present; the remote collector and the error
/// tracker are added independently when enabled, so all three can be active
/// at once.
///
/// # Errors
///
/// Returns `SinkInitialization` when an enabled sink is missing its
/// destination or the destination is invalid
pub fn compose_sinks(config: &DispatchConfig, metrics: Arc<DispatchMetrics>) -> Result<CompositeSink> {
    let mut appenders: Vec<Box<dyn Appender>> = vec![Box::new(ConsoleAppender::new())];

    if config.remote_collector {
        let remote = RemoteAppender::with_options(
            &config.collector_endpoint(),
            config.delivery_options(),
            Arc::clone(&metrics),
        )?;
        appenders.push(Box::new(remote));
    }

    if config.error_tracking {
        let raw = config.error_tracking_dsn.as_deref().ok_or_else(|| {
            LoggerError::sink_init("error-tracking", "requested error tracking, but no DSN is set")
        })?;
        let dsn = parse_dsn(raw)?;
        eprintln!("[SENTRY] Sending logs to error tracker at: {}", dsn.envelope_api_url());

        let tracker = SentryTracker::new(dsn, config.delivery_options().timeout);
        appenders.push(Box::new(
            ErrorTrackingAppender::new(Box::new(tracker))
                .with_min_level(config.error_tracking_min_level),
        ));
    }

    Ok(CompositeSink::new(config.format, appenders))
}
