//! Best-effort HTTP delivery pool
//!
//! Lines are queued on a bounded channel and posted by a fixed set of worker
//! threads. Submitting never blocks: when the queue is full the line is
//! dropped. Every post runs inside a panic boundary and every failure ends as
//! a stderr diagnostic plus a metrics counter, never as an error returned to
//! the thread that logged.

use crate::core::composite::panic_message;
use crate::core::{DispatchMetrics, LoggerError, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use url::Url;

/// Request timeout for a single post
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_millis(250);

/// Slack added on top of the request timeout when waiting for in-flight posts
const DRAIN_MARGIN: Duration = Duration::from_millis(50);

/// Tuning for a [`DeliveryPool`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOptions {
    pub timeout: Duration,
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_DELIVERY_TIMEOUT,
            workers: 4,
            queue_capacity: 1024,
        }
    }
}

/// One queued post
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub url: Url,
    pub content_type: &'static str,
    pub body: String,
}

impl DeliveryRequest {
    pub fn new(url: Url, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            url,
            content_type,
            body: body.into(),
        }
    }
}

/// Fixed-size pool of delivery workers draining a bounded queue
pub struct DeliveryPool {
    tag: &'static str,
    sender: Option<Sender<DeliveryRequest>>,
    workers: Vec<thread::JoinHandle<()>>,
    /// Queued plus currently executing requests
    in_flight: Arc<AtomicUsize>,
    metrics: Arc<DispatchMetrics>,
    options: DeliveryOptions,
}

impl DeliveryPool {
    /// Start the workers. `tag` prefixes every diagnostic, e.g. `LOGHUB`.
    pub fn start(
        tag: &'static str,
        options: DeliveryOptions,
        metrics: Arc<DispatchMetrics>,
    ) -> Result<Self> {
        if options.workers == 0 || options.queue_capacity == 0 {
            return Err(LoggerError::sink_init(
                tag,
                "delivery pool needs at least one worker and one queue slot",
            ));
        }

        let (sender, receiver) = bounded(options.queue_capacity);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let mut workers = Vec::with_capacity(options.workers);

        for idx in 0..options.workers {
            let receiver = receiver.clone();
            let in_flight = Arc::clone(&in_flight);
            let metrics = Arc::clone(&metrics);
            let timeout = options.timeout;

            let handle = thread::Builder::new()
                .name(format!("{}-delivery-{}", tag.to_lowercase(), idx))
                .spawn(move || Self::worker_loop(tag, receiver, timeout, &in_flight, &metrics))
                .map_err(|e| LoggerError::sink_init(tag, format!("cannot spawn worker: {}", e)))?;
            workers.push(handle);
        }

        Ok(Self {
            tag,
            sender: Some(sender),
            workers,
            in_flight,
            metrics,
            options,
        })
    }

    fn worker_loop(
        tag: &'static str,
        receiver: Receiver<DeliveryRequest>,
        timeout: Duration,
        in_flight: &AtomicUsize,
        metrics: &DispatchMetrics,
    ) {
        // Built on the worker thread so no async runtime of the caller is involved
        let client = match Client::builder().timeout(timeout).build() {
            Ok(client) => Some(client),
            Err(e) => {
                eprintln!("[{}][HTTP] cannot build client: {}", tag, e);
                None
            }
        };

        for request in receiver.iter() {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                match client.as_ref() {
                    Some(client) => Self::post(client, request),
                    None => Err(LoggerError::other("HTTP client unavailable")),
                }
            }));

            match outcome {
                Ok(Ok(())) => {
                    metrics.record_remote_sent();
                }
                Ok(Err(LoggerError::HttpStatus { status, body })) => {
                    eprintln!("[{}][HTTP][<- {}] error: ['{}']", tag, status, body);
                    metrics.record_remote_failed();
                }
                Ok(Err(e)) => {
                    eprintln!("[{}][HTTP][pre-send] error: ['{}']", tag, e);
                    metrics.record_remote_failed();
                }
                Err(panic_info) => {
                    let err = LoggerError::DeliveryPanicked(panic_message(panic_info.as_ref()));
                    eprintln!("[{}][HTTP] {}", tag, err);
                    metrics.record_remote_failed();
                }
            }

            in_flight.fetch_sub(1, Ordering::AcqRel);
        }
    }

    fn post(client: &Client, request: DeliveryRequest) -> Result<()> {
        let endpoint = request.url.to_string();
        let response = client
            .post(request.url)
            .header(reqwest::header::CONTENT_TYPE, request.content_type)
            .body(request.body)
            .send()
            .map_err(|e| LoggerError::delivery(&endpoint, e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            return Err(LoggerError::http_status(status.as_u16(), body));
        }

        Ok(())
    }

    /// Queue a request. Never blocks; a full queue drops the request.
    pub fn submit(&self, request: DeliveryRequest) -> Result<()> {
        let Some(sender) = self.sender.as_ref() else {
            return Err(LoggerError::other("delivery pool is shut down"));
        };

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        match sender.try_send(request) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.in_flight.fetch_sub(1, Ordering::AcqRel);
                let dropped = self.metrics.record_remote_dropped();
                // Alert on first drop and periodically thereafter
                if dropped == 0 || (dropped + 1) % 1000 == 0 {
                    eprintln!(
                        "[{}][HTTP] delivery queue full, {} lines dropped",
                        self.tag,
                        dropped + 1
                    );
                }
                Err(LoggerError::QueueFull {
                    capacity: self.options.queue_capacity,
                })
            }
            Err(TrySendError::Disconnected(_)) => {
                self.in_flight.fetch_sub(1, Ordering::AcqRel);
                Err(LoggerError::other("delivery workers are gone"))
            }
        }
    }

    /// Requests queued or being posted right now
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn options(&self) -> &DeliveryOptions {
        &self.options
    }

    /// Wait until nothing is in flight or `limit` elapses. Returns `true` when idle.
    pub fn wait_idle(&self, limit: Duration) -> bool {
        let start = Instant::now();
        loop {
            if self.in_flight() == 0 {
                return true;
            }
            if start.elapsed() >= limit {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Bounded drain used by flush: one request timeout plus a small margin.
    pub fn drain(&self) -> bool {
        self.wait_idle(self.options.timeout + DRAIN_MARGIN)
    }
}

impl Drop for DeliveryPool {
    fn drop(&mut self) {
        // Closing the channel lets workers finish what is queued and exit
        drop(self.sender.take());

        let start = Instant::now();
        let limit = self.options.timeout + DRAIN_MARGIN;
        let mut detached = 0;
        for handle in self.workers.drain(..) {
            while !handle.is_finished() && start.elapsed() < limit {
                thread::sleep(Duration::from_millis(5));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                // Left running; exits once its post times out
                detached += 1;
            }
        }

        if detached > 0 {
            eprintln!(
                "[LOGGER WARNING] {} {} delivery workers still busy at shutdown, {} lines in flight",
                detached,
                self.tag,
                self.in_flight()
            );
        }
    }
}

impl std::fmt::Debug for DeliveryPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryPool")
            .field("tag", &self.tag)
            .field("options", &self.options)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
