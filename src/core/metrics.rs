//! Dispatch metrics for observability
//!
//! Counters for filter outcomes, sink failures and best-effort remote
//! deliveries.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for dispatcher observability
///
/// # Example
///
/// ```
/// use rust_log_dispatch::DispatchMetrics;
///
/// let metrics = DispatchMetrics::new();
/// metrics.record_accepted();
/// metrics.record_filtered();
///
/// assert_eq!(metrics.accepted(), 1);
/// assert_eq!(metrics.filtered(), 1);
/// ```
#[derive(Debug)]
pub struct DispatchMetrics {
    /// Records that passed filtering (or bypassed it)
    accepted: AtomicU64,

    /// Records rejected by the threshold or a suppress entry
    filtered: AtomicU64,

    /// Records every synchronous sink accepted
    delivered: AtomicU64,

    /// Records at least one sink failed or panicked on
    sink_failures: AtomicU64,

    /// Remote deliveries acknowledged with 200
    remote_sent: AtomicU64,

    /// Remote deliveries that errored, timed out or got a non-200 reply
    remote_failed: AtomicU64,

    /// Lines dropped because the delivery queue was full
    remote_dropped: AtomicU64,
}

impl DispatchMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            accepted: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            remote_sent: AtomicU64::new(0),
            remote_failed: AtomicU64::new(0),
            remote_dropped: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn remote_sent(&self) -> u64 {
        self.remote_sent.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn remote_failed(&self) -> u64 {
        self.remote_failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn remote_dropped(&self) -> u64 {
        self.remote_dropped.load(Ordering::Relaxed)
    }

    /// Record an accepted record. Returns the previous count.
    #[inline]
    pub fn record_accepted(&self) -> u64 {
        self.accepted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_remote_sent(&self) -> u64 {
        self.remote_sent.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_remote_failed(&self) -> u64 {
        self.remote_failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_remote_dropped(&self) -> u64 {
        self.remote_dropped.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of remote lines lost (failed or dropped) as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing was handed to the remote sink yet.
    pub fn remote_loss_rate(&self) -> f64 {
        let lost = (self.remote_failed() + self.remote_dropped()) as f64;
        let total = self.remote_sent() as f64 + lost;
        if total == 0.0 {
            0.0
        } else {
            (lost / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.accepted.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
        self.delivered.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
        self.remote_sent.store(0, Ordering::Relaxed);
        self.remote_failed.store(0, Ordering::Relaxed);
        self.remote_dropped.store(0, Ordering::Relaxed);
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DispatchMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            accepted: AtomicU64::new(self.accepted()),
            filtered: AtomicU64::new(self.filtered()),
            delivered: AtomicU64::new(self.delivered()),
            sink_failures: AtomicU64::new(self.sink_failures()),
            remote_sent: AtomicU64::new(self.remote_sent()),
            remote_failed: AtomicU64::new(self.remote_failed()),
            remote_dropped: AtomicU64::new(self.remote_dropped()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = DispatchMetrics::new();
        assert_eq!(metrics.accepted(), 0);
        assert_eq!(metrics.filtered(), 0);
        assert_eq!(metrics.delivered(), 0);
        assert_eq!(metrics.sink_failures(), 0);
        assert_eq!(metrics.remote_sent(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = DispatchMetrics::new();
        assert_eq!(metrics.record_remote_dropped(), 0);
        assert_eq!(metrics.record_remote_dropped(), 1);
        assert_eq!(metrics.remote_dropped(), 2);
    }

    #[test]
    fn test_remote_loss_rate() {
        let metrics = DispatchMetrics::new();
        assert_eq!(metrics.remote_loss_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_remote_sent();
        }
        for _ in 0..5 {
            metrics.record_remote_failed();
            metrics.record_remote_dropped();
        }

        let rate = metrics.remote_loss_rate();
        assert!((9.9..=10.1).contains(&rate), "Loss rate was {}", rate);
    }

    #[test]
    fn test_snapshot_and_reset() {
        let metrics = DispatchMetrics::new();
        metrics.record_accepted();
        metrics.record_filtered();

        let snapshot = metrics.clone();
        metrics.reset();

        assert_eq!(snapshot.accepted(), 1);
        assert_eq!(snapshot.filtered(), 1);
        assert_eq!(metrics.accepted(), 0);
        assert_eq!(metrics.filtered(), 0);
    }
}
