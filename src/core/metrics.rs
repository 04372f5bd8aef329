//! Logger metrics for observability
//!
//! Counters for every way a record can leave the pipeline: delivered,
//! failed in a sink, dropped on overflow, rejected after stop, or filtered
//! below the minimum severity.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use sherlog::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dropped();
/// metrics.record_delivered();
///
/// assert_eq!(metrics.dropped_count(), 1);
/// assert_eq!(metrics.delivered_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records accepted into the dispatch queue
    enqueued: AtomicU64,

    /// Records every sink accepted
    delivered: AtomicU64,

    /// Records at least one sink failed or panicked on
    sink_failures: AtomicU64,

    /// Records dropped due to queue overflow
    dropped: AtomicU64,

    /// Records rejected because the logger was draining or stopped
    rejected: AtomicU64,

    /// Records below the minimum severity
    filtered: AtomicU64,

    /// Number of times the queue was found full
    queue_full_events: AtomicU64,

    /// Number of times a producer blocked waiting for queue space
    block_events: AtomicU64,

    /// Records a lossy policy kept by blocking because of their severity
    preserved: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            queue_full_events: AtomicU64::new(0),
            block_events: AtomicU64::new(0),
            preserved: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failure_count(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered_count(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn queue_full_events(&self) -> u64 {
        self.queue_full_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn block_events(&self) -> u64 {
        self.block_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn preserved_count(&self) -> u64 {
        self.preserved.load(Ordering::Relaxed)
    }

    /// Records that reached the consumer, whether or not a sink failed
    pub fn processed_count(&self) -> u64 {
        self.delivered_count() + self.sink_failure_count()
    }

    // The record_* methods return the previous value, like fetch_add.

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
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
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_queue_full(&self) -> u64 {
        self.queue_full_events.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_block(&self) -> u64 {
        self.block_events.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_preserved(&self) -> u64 {
        self.preserved.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0) of records that were
    /// either enqueued or dropped
    ///
    /// Returns 0.0 if nothing has been logged.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.enqueued_count() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        for counter in [
            &self.enqueued,
            &self.delivered,
            &self.sink_failures,
            &self.dropped,
            &self.rejected,
            &self.filtered,
            &self.queue_full_events,
            &self.block_events,
            &self.preserved,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued_count()),
            delivered: AtomicU64::new(self.delivered_count()),
            sink_failures: AtomicU64::new(self.sink_failure_count()),
            dropped: AtomicU64::new(self.dropped_count()),
            rejected: AtomicU64::new(self.rejected_count()),
            filtered: AtomicU64::new(self.filtered_count()),
            queue_full_events: AtomicU64::new(self.queue_full_events()),
            block_events: AtomicU64::new(self.block_events()),
            preserved: AtomicU64::new(self.preserved_count()),
        }
    }
}
