//! Error-tracking appender
//!
//! Forwards severe lines to an error-tracking service. The service client is
//! pluggable through [`ErrorTracker`]; [`SentryTracker`] reports through the
//! Sentry SDK, which owns DSN validation and the HTTP transport.

use crate::core::{Appender, EncodedLine, LogLevel, LoggerError, Result};
use sentry::types::Dsn;
use sentry::{Client, ClientOptions, Hub, Scope};
use std::sync::Arc;
use std::time::Duration;

/// Slack added on top of the delivery timeout when flushing the SDK queue
const FLUSH_MARGIN: Duration = Duration::from_millis(50);

/// Client for an error-tracking service
pub trait ErrorTracker: Send + Sync {
    /// Report one encoded line. Must not block on the network.
    fn capture(&self, line: &EncodedLine) -> Result<()>;

    /// Wait (bounded) for pending reports. Returns `true` when nothing is pending.
    fn flush(&self) -> bool {
        true
    }

    fn name(&self) -> &str;
}

/// Parse an error-tracking DSN. Surrounding whitespace and single quotes are stripped.
///
/// # Errors
///
/// Returns `SinkInitialization` when the DSN is empty or the SDK rejects it
pub fn parse_dsn(raw: &str) -> Result<Dsn> {
    let raw = raw.trim().trim_matches('\'');
    if raw.is_empty() {
        return Err(LoggerError::sink_init("error-tracking", "DSN is empty"));
    }

    raw.parse::<Dsn>().map_err(|e| {
        LoggerError::sink_init("error-tracking", format!("invalid DSN '{}': {}", raw, e))
    })
}

/// Severity understood by the error-tracking service
fn tracker_level(level: LogLevel) -> sentry::Level {
    match level {
        LogLevel::Verbose | LogLevel::Debug => sentry::Level::Debug,
        LogLevel::Success | LogLevel::Info => sentry::Level::Info,
        LogLevel::Warn => sentry::Level::Warning,
        LogLevel::Error => sentry::Level::Error,
        LogLevel::Fatal => sentry::Level::Fatal,
    }
}

/// Sentry client bound to its own hub, so several dispatchers never share
/// the process-global SDK state
pub struct SentryTracker {
    dsn: Dsn,
    client: Arc<Client>,
    hub: Hub,
    flush_timeout: Duration,
}

impl SentryTracker {
    /// Build a client for `dsn`. `timeout` bounds every flush.
    pub fn new(dsn: Dsn, timeout: Duration) -> Self {
        let options = sentry::apply_defaults(ClientOptions {
            dsn: Some(dsn.clone()),
            default_integrations: false,
            shutdown_timeout: timeout,
            ..Default::default()
        });
        let client = Arc::new(Client::from(options));
        let hub = Hub::new(Some(Arc::clone(&client)), Arc::new(Scope::default()));

        Self {
            dsn,
            client,
            hub,
            flush_timeout: timeout + FLUSH_MARGIN,
        }
    }

    pub fn dsn(&self) -> &Dsn {
        &self.dsn
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_enabled()
    }
}

impl ErrorTracker for SentryTracker {
    fn capture(&self, line: &EncodedLine) -> Result<()> {
        // The SDK queues the event on its transport thread
        self.hub.capture_message(&line.text, tracker_level(line.level));
        Ok(())
    }

    fn flush(&self) -> bool {
        self.client.flush(Some(self.flush_timeout))
    }

    fn name(&self) -> &str {
        "sentry"
    }
}

impl std::fmt::Debug for SentryTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryTracker")
            .field("endpoint", &self.dsn.envelope_api_url().as_str())
            .field("flush_timeout", &self.flush_timeout)
            .finish()
    }
}

/// Appender forwarding lines at or above `min_level` to an [`ErrorTracker`]
pub struct ErrorTrackingAppender {
    tracker: Box<dyn ErrorTracker>,
    min_level: LogLevel,
}

impl ErrorTrackingAppender {
    pub fn new(tracker: Box<dyn ErrorTracker>) -> Self {
        Self {
            tracker,
            min_level: LogLevel::Error,
        }
    }

    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

impl Appender for ErrorTrackingAppender {
    fn append(&mut self, line: &EncodedLine) -> Result<()> {
        if line.level < self.min_level {
            return Ok(());
        }
        self.tracker.capture(line)
    }

    fn flush(&mut self) -> Result<()> {
        if !self.tracker.flush() {
            eprintln!("[SENTRY] reports still pending after flush timeout");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "error-tracking"
    }
}
