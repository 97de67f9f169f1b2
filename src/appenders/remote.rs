//! Remote collector appender
//!
//! Posts each encoded line as a `text/plain` body to an HTTP log collector.
//! Delivery is fire-and-forget: [`RemoteAppender::deliver`] queues the line
//! and returns at once, a worker posts it with a short timeout, and failures
//! are reported on stderr only. Lines may arrive out of order or not at all.

use super::delivery::{DeliveryOptions, DeliveryPool, DeliveryRequest};
use crate::core::{Appender, DispatchMetrics, EncodedLine, LoggerError, Result};
use std::sync::Arc;
use url::Url;

/// Collector address used inside the container network
pub const INTERNAL_COLLECTOR_ENDPOINT: &str = "http://loghub:8000/log";

/// Collector address used when running directly on a host
pub const LOOPBACK_COLLECTOR_ENDPOINT: &str = "http://127.0.0.1:8000/log";

/// Pick the collector endpoint for the deployment environment.
pub fn resolve_collector_endpoint(inside_container: bool) -> &'static str {
    if inside_container {
        INTERNAL_COLLECTOR_ENDPOINT
    } else {
        LOOPBACK_COLLECTOR_ENDPOINT
    }
}

/// Appender that ships lines to a remote collector over HTTP
///
/// # Example
///
/// ```no_run
/// use rust_log_dispatch::appenders::RemoteAppender;
/// use rust_log_dispatch::DispatchMetrics;
/// use std::sync::Arc;
///
/// let metrics = Arc::new(DispatchMetrics::new());
/// let appender = RemoteAppender::new("http://127.0.0.1:8000/log", metrics)
///     .expect("valid collector url");
/// appender.deliver("{\"message\":\"hello\"}");
/// ```
#[derive(Debug)]
pub struct RemoteAppender {
    endpoint: Url,
    pool: DeliveryPool,
}

impl RemoteAppender {
    /// Create a remote appender with the default timeout and pool size
    ///
    /// # Errors
    ///
    /// Returns `SinkInitialization` if the endpoint is not an http(s) URL
    pub fn new(endpoint: &str, metrics: Arc<DispatchMetrics>) -> Result<Self> {
        Self::with_options(endpoint, DeliveryOptions::default(), metrics)
    }

    pub fn with_options(
        endpoint: &str,
        options: DeliveryOptions,
        metrics: Arc<DispatchMetrics>,
    ) -> Result<Self> {
        let endpoint = parse_http_url(endpoint).map_err(|msg| LoggerError::sink_init("remote", msg))?;
        let pool = DeliveryPool::start("LOGHUB", options, metrics)?;
        Ok(Self { endpoint, pool })
    }

    /// Queue `line` for delivery and return immediately.
    pub fn deliver(&self, line: &str) {
        let request = DeliveryRequest::new(self.endpoint.clone(), "text/plain", line);
        // Queue-full and shutdown are already reported by the pool
        let _ = self.pool.submit(request);
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub fn in_flight(&self) -> usize {
        self.pool.in_flight()
    }
}

impl Appender for RemoteAppender {
    fn append(&mut self, line: &EncodedLine) -> Result<()> {
        self.deliver(&line.text);
        Ok(())
    }

    /// Waits for in-flight posts, bounded by the request timeout
    fn flush(&mut self) -> Result<()> {
        if !self.pool.drain() {
            eprintln!(
                "[LOGHUB][HTTP] {} deliveries still in flight after flush timeout",
                self.pool.in_flight()
            );
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "remote"
    }
}

pub(crate) fn parse_http_url(raw: &str) -> std::result::Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("invalid URL '{}': {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{}' in '{}'", other, raw)),
    }
}
