//! Logger façade and lifecycle

use super::{
    classifier::classify,
    error::{LoggerError, Result},
    leveled_error::Leveled,
    metrics::LoggerMetrics,
    overflow_policy::{OverflowCallback, OverflowPolicy},
    queue::DispatchQueue,
    record::{BoxError, LogRecord},
    severity::Severity,
    sink::Sink,
    worker::{panic_message, Worker},
};
use crossbeam_channel::bounded;
use parking_lot::{Mutex, RwLock};
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default dispatch queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default upper bound on how long [`Logger::flush`] waits for the consumer
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle of a [`Logger`]
///
/// Transitions only move forward: `Created → Running → Draining → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LoggerState {
    /// Queue allocated, consumer not started; records are buffered
    Created = 0,
    /// Consumer running, records accepted
    Running = 1,
    /// `stop` called, new records rejected, queue being flushed
    Draining = 2,
    /// Consumer exited, sinks will not be called again
    Stopped = 3,
}

impl LoggerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LoggerState::Created,
            1 => LoggerState::Running,
            2 => LoggerState::Draining,
            _ => LoggerState::Stopped,
        }
    }
}

impl fmt::Display for LoggerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoggerState::Created => "Created",
            LoggerState::Running => "Running",
            LoggerState::Draining => "Draining",
            LoggerState::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// Sinks waiting for the consumer, and the consumer once it runs
struct Lifecycle {
    sinks: Vec<Box<dyn Sink>>,
    handle: Option<thread::JoinHandle<()>>,
}

/// Asynchronous logger for error values
///
/// Any number of threads may call [`log`](Logger::log) concurrently; each call
/// classifies the error, wraps it in a [`LogRecord`] and queues it. A single
/// consumer thread writes records to the sinks in queue order.
/// [`stop`](Logger::stop) is the synchronization point: it returns only once
/// every accepted record has been handed to the sinks.
///
/// # Example
///
/// ```
/// use sherlog::prelude::*;
///
/// let sink = MemorySink::new();
/// let logger = Logger::builder().sink(sink.clone()).start().unwrap();
///
/// logger.log(LeveledError::warning("slow op"));
/// logger.log(LeveledError::operational("db down"));
/// logger.log(std::io::Error::other("plain"));
/// logger.stop().unwrap();
///
/// let severities: Vec<Severity> = sink.records().into_iter().map(|r| r.severity).collect();
/// assert_eq!(severities, vec![Severity::Warning, Severity::Operational, Severity::Error]);
/// ```
pub struct Logger {
    min_severity: RwLock<Severity>,
    queue: DispatchQueue,
    state: AtomicU8,
    lifecycle: Mutex<Lifecycle>,
    metrics: Arc<LoggerMetrics>,
    sequence: AtomicU64,
    flush_timeout: Duration,
}

impl Logger {
    /// Create a logger with default configuration and no sinks
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use sherlog::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .min_severity(Severity::Warning)
    ///     .queue_capacity(256)
    ///     .build();
    /// assert_eq!(logger.state(), LoggerState::Created);
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn state(&self) -> LoggerState {
        LoggerState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: LoggerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Add a sink; only possible before the consumer starts
    pub fn add_sink<S: Sink + 'static>(&self, sink: S) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        if self.state() != LoggerState::Created {
            return Err(LoggerError::config(
                "Logger",
                format!("sinks can only be added before start (state: {})", self.state()),
            ));
        }
        lifecycle.sinks.push(Box::new(sink));
        Ok(())
    }

    /// Start the consumer thread
    ///
    /// Calling `start` on a running logger is a no-op. A draining or stopped
    /// logger cannot be restarted.
    pub fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        match self.state() {
            LoggerState::Created => {
                self.spawn_worker(&mut lifecycle)?;
                self.set_state(LoggerState::Running);
                Ok(())
            }
            LoggerState::Running => Ok(()),
            LoggerState::Draining | LoggerState::Stopped => Err(LoggerError::LoggerStopped),
        }
    }

    fn spawn_worker(&self, lifecycle: &mut Lifecycle) -> Result<()> {
        let sinks = std::mem::take(&mut lifecycle.sinks);
        let worker = Worker::new(sinks, self.queue.receiver(), Arc::clone(&self.metrics));
        lifecycle.handle = Some(worker.spawn()?);
        Ok(())
    }

    /// Stop accepting records and block until the queue is drained
    ///
    /// On return the consumer thread has exited and no sink will be called
    /// again. Calling `stop` again, from any thread, waits for the first call
    /// to finish and then returns `Ok(())`. A logger that was never started is
    /// started first so that records buffered while `Created` are delivered.
    pub fn stop(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        match self.state() {
            LoggerState::Stopped => return Ok(()),
            LoggerState::Created => {
                if let Err(e) = self.spawn_worker(&mut lifecycle) {
                    self.queue.close();
                    self.set_state(LoggerState::Stopped);
                    return Err(e);
                }
            }
            LoggerState::Running | LoggerState::Draining => {}
        }

        self.set_state(LoggerState::Draining);
        self.queue.close();

        let result = match lifecycle.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|payload| LoggerError::WorkerPanicked(panic_message(payload.as_ref()))),
            None => Ok(()),
        };

        self.set_state(LoggerState::Stopped);
        result
    }

    /// Block until every record accepted before this call has been written
    /// and the sinks flushed
    ///
    /// Returns immediately when the consumer is not running.
    pub fn flush(&self) -> Result<()> {
        if self.state() != LoggerState::Running {
            return Ok(());
        }

        let (ack, done) = bounded(1);
        match self.queue.enqueue_flush(ack) {
            Ok(()) => {}
            // Raced with stop, which drains on its own
            Err(LoggerError::LoggerStopped) => return Ok(()),
            Err(e) => return Err(e),
        }

        done.recv_timeout(self.flush_timeout)
            .map_err(|_| LoggerError::FlushTimeout(self.flush_timeout))
    }

    /// Log an error value
    ///
    /// Classifies `err` and queues it for the consumer. Never returns an
    /// error and never waits for sink I/O; it may wait for queue space under
    /// the `Block` overflow policy. After `stop` the call is a counted no-op.
    #[inline]
    pub fn log<E: Into<BoxError>>(&self, err: E) {
        let _ = self.try_log(err);
    }

    /// Like [`log`](Logger::log) but reports rejection or overflow drops
    pub fn try_log<E: Into<BoxError>>(&self, err: E) -> Result<()> {
        let error: BoxError = err.into();
        let severity = classify(error.as_ref());
        self.submit(severity, error)
    }

    /// Log an error whose own [`Leveled`] implementation decides the severity
    ///
    /// Needs no registration; see [`register_leveled`](crate::register_leveled)
    /// for making [`log`](Logger::log) recognise the type as well.
    pub fn log_leveled<L>(&self, err: L)
    where
        L: Leveled + Error + Send + Sync + 'static,
    {
        let severity = err.severity();
        let _ = self.submit(severity, Box::new(err));
    }

    /// Log the error if there is one; `None` is a no-op
    #[inline]
    pub fn log_opt<E: Into<BoxError>>(&self, err: Option<E>) {
        if let Some(err) = err {
            self.log(err);
        }
    }

    /// Log the error side of a result and pass the value through
    pub fn log_result<T, E: Into<BoxError>>(&self, result: std::result::Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.log(err);
                None
            }
        }
    }

    fn submit(&self, severity: Severity, error: BoxError) -> Result<()> {
        if self.state() >= LoggerState::Draining {
            self.metrics.record_rejected();
            return Err(LoggerError::LoggerStopped);
        }

        if severity < *self.min_severity.read() {
            self.metrics.record_filtered();
            return Ok(());
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let record = LogRecord::new(sequence, severity, error);

        self.queue.enqueue(record).inspect_err(|e| {
            if matches!(e, LoggerError::LoggerStopped) {
                self.metrics.record_rejected();
            }
        })
    }

    pub fn set_min_severity(&self, severity: Severity) {
        *self.min_severity.write() = severity;
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity.read().clone()
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use sherlog::Logger;
    ///
    /// let logger = Logger::new();
    /// let metrics = logger.metrics();
    /// println!("Dropped: {}", metrics.dropped_count());
    /// println!("Drop rate: {:.2}%", metrics.drop_rate());
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Number of records dropped by a lossy overflow policy
    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    /// Records currently waiting in the dispatch queue
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// `None` for an unbounded queue
    pub fn queue_capacity(&self) -> Option<usize> {
        self.queue.capacity()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("state", &self.state())
            .field("min_severity", &self.min_severity().name())
            .field("queue_len", &self.queue_len())
            .field("queue_capacity", &self.queue_capacity())
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            eprintln!("[SHERLOG ERROR] Failed to stop logger during drop: {}", e);
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[SHERLOG WARNING] Logger shutting down with {} dropped records (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use sherlog::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let logger = Logger::builder()
///     .min_severity(Severity::Warning)
///     .sink(MemorySink::new())
///     .queue_capacity(1000)
///     .overflow_policy(OverflowPolicy::BlockWithTimeout(Duration::from_millis(50)))
///     .on_overflow(Arc::new(|count| {
///         eprintln!("ALERT: {} records dropped", count);
///     }))
///     .start()
///     .unwrap();
/// logger.stop().unwrap();
/// ```
pub struct LoggerBuilder {
    min_severity: Severity,
    sinks: Vec<Box<dyn Sink>>,
    capacity: Option<usize>,
    overflow_policy: OverflowPolicy,
    preserve_at: Severity,
    on_overflow: Option<OverflowCallback>,
    flush_timeout: Duration,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_severity: Severity::Info,
            sinks: Vec::new(),
            capacity: Some(DEFAULT_QUEUE_CAPACITY),
            overflow_policy: OverflowPolicy::Block,
            preserve_at: Severity::Error,
            on_overflow: None,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }

    /// Records below this severity are discarded at `log` time
    #[must_use = "builder methods return a new value"]
    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Bound the dispatch queue at `capacity` records
    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Let the dispatch queue grow without bound
    ///
    /// The overflow policy never applies to an unbounded queue.
    #[must_use = "builder methods return a new value"]
    pub fn unbounded(mut self) -> Self {
        self.capacity = None;
        self
    }

    /// Set the overflow policy for a full queue. Default is `Block`.
    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Records at or above this severity wait for space even under a lossy
    /// overflow policy. Default is `Error`.
    #[must_use = "builder methods return a new value"]
    pub fn preserve_at(mut self, severity: Severity) -> Self {
        self.preserve_at = severity;
        self
    }

    /// Set a callback for overflow notifications
    ///
    /// The callback is invoked when records are dropped due to queue
    /// overflow. The parameter is the total count of dropped records.
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    /// Build the Logger in the `Created` state
    pub fn build(self) -> Logger {
        let metrics = Arc::new(LoggerMetrics::new());
        let queue = DispatchQueue::new(
            self.capacity,
            self.overflow_policy,
            self.preserve_at,
            Arc::clone(&metrics),
            self.on_overflow,
        );

        Logger {
            min_severity: RwLock::new(self.min_severity),
            queue,
            state: AtomicU8::new(LoggerState::Created as u8),
            lifecycle: Mutex::new(Lifecycle {
                sinks: self.sinks,
                handle: None,
            }),
            metrics,
            sequence: AtomicU64::new(0),
            flush_timeout: self.flush_timeout,
        }
    }

    /// Build the Logger and start its consumer thread
    pub fn start(self) -> Result<Logger> {
        let logger = self.build();
        logger.start()?;
        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LeveledError;
    use crate::sinks::MemorySink;
    use std::io;

    #[test]
    fn test_builder_defaults() {
        let logger = Logger::builder().build();
        assert_eq!(logger.state(), LoggerState::Created);
        assert_eq!(logger.min_severity(), Severity::Info);
        assert_eq!(logger.queue_capacity(), Some(DEFAULT_QUEUE_CAPACITY));
        assert_eq!(logger.dropped_count(), 0);
    }

    #[test]
    fn test_builder_unbounded() {
        let logger = Logger::builder().unbounded().build();
        assert_eq!(logger.queue_capacity(), None);
    }

    #[test]
    fn test_state_transitions() {
        let logger = Logger::builder().sink(MemorySink::new()).build();
        assert_eq!(logger.state(), LoggerState::Created);

        logger.start().unwrap();
        assert_eq!(logger.state(), LoggerState::Running);
        logger.start().unwrap();
        assert_eq!(logger.state(), LoggerState::Running);

        logger.stop().unwrap();
        assert_eq!(logger.state(), LoggerState::Stopped);
        assert!(matches!(logger.start(), Err(LoggerError::LoggerStopped)));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let sink = MemorySink::new();
        let logger = Logger::builder().sink(sink.clone()).start().unwrap();
        logger.log(LeveledError::warning("once"));

        logger.stop().unwrap();
        logger.stop().unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(logger.state(), LoggerState::Stopped);
    }

    #[test]
    fn test_log_after_stop_is_rejected() {
        let sink = MemorySink::new();
        let logger = Logger::builder().sink(sink.clone()).start().unwrap();
        logger.stop().unwrap();

        logger.log(io::Error::other("late"));
        assert!(matches!(
            logger.try_log(io::Error::other("late")),
            Err(LoggerError::LoggerStopped)
        ));
        assert_eq!(logger.metrics().rejected_count(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_records_buffered_while_created_are_drained_by_stop() {
        let sink = MemorySink::new();
        let logger = Logger::builder().sink(sink.clone()).build();
        logger.log(LeveledError::warning("early"));
        assert_eq!(logger.queue_len(), 1);

        logger.stop().unwrap();
        assert_eq!(sink.messages(), vec!["early"]);
    }

    #[test]
    fn test_add_sink_only_before_start() {
        let logger = Logger::new();
        logger.add_sink(MemorySink::new()).unwrap();
        logger.start().unwrap();
        assert!(logger.add_sink(MemorySink::new()).is_err());
        logger.stop().unwrap();
    }

    #[test]
    fn test_min_severity_filters_at_log_time() {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .min_severity(Severity::Warning)
            .sink(sink.clone())
            .start()
            .unwrap();

        logger.log(LeveledError::info("noise"));
        logger.log(LeveledError::warning("kept"));
        logger.set_min_severity(Severity::Fatal);
        logger.log(LeveledError::operational("filtered later"));
        logger.stop().unwrap();

        assert_eq!(sink.messages(), vec!["kept"]);
        assert_eq!(logger.metrics().filtered_count(), 2);
    }

    #[test]
    fn test_log_opt_none_is_noop() {
        let sink = MemorySink::new();
        let logger = Logger::builder().sink(sink.clone()).build();
        logger.log_opt(None::<io::Error>);
        assert_eq!(logger.queue_len(), 0);

        logger.stop().unwrap();
        assert!(sink.is_empty());
        assert_eq!(logger.metrics().enqueued_count(), 0);
    }

    #[test]
    fn test_log_result_passes_value_through() {
        let sink = MemorySink::new();
        let logger = Logger::builder().sink(sink.clone()).start().unwrap();

        let ok: std::result::Result<u32, io::Error> = Ok(7);
        assert_eq!(logger.log_result(ok), Some(7));

        let err: std::result::Result<u32, io::Error> = Err(io::Error::other("bad"));
        assert_eq!(logger.log_result(err), None);

        logger.stop().unwrap();
        assert_eq!(sink.messages(), vec!["bad"]);
    }

    #[test]
    fn test_log_leveled_uses_own_severity() {
        #[derive(Debug)]
        struct Throttled;

        impl fmt::Display for Throttled {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("throttled by upstream")
            }
        }

        impl Error for Throttled {}

        impl Leveled for Throttled {
            fn severity(&self) -> Severity {
                Severity::Warning
            }
        }

        let sink = MemorySink::new();
        let logger = Logger::builder().sink(sink.clone()).start().unwrap();
        logger.log_leveled(Throttled);

        crate::core::register_leveled::<Throttled>();
        logger.log(Throttled);
        logger.log_opt(Some(Throttled));
        let failed: std::result::Result<(), Throttled> = Err(Throttled);
        let _ = logger.log_result(failed);
        logger.stop().unwrap();

        let severities: Vec<Severity> = sink.records().into_iter().map(|r| r.severity).collect();
        assert_eq!(severities, vec![Severity::Warning; 4]);
    }

    #[test]
    fn test_flush_waits_for_delivery() {
        let sink = MemorySink::new();
        let logger = Logger::builder().sink(sink.clone()).start().unwrap();
        for i in 0..20 {
            logger.log(io::Error::other(format!("message {}", i)));
        }

        logger.flush().unwrap();
        assert_eq!(sink.len(), 20);
        logger.stop().unwrap();
    }

    #[test]
    fn test_flush_when_not_running_is_noop() {
        let logger = Logger::new();
        logger.flush().unwrap();
        logger.stop().unwrap();
        logger.flush().unwrap();
    }

    #[test]
    fn test_sequence_numbers_are_monotonic() {
        let sink = MemorySink::new();
        let logger = Logger::builder().sink(sink.clone()).start().unwrap();
        for i in 0..5 {
            logger.log(io::Error::other(format!("m{}", i)));
        }
        logger.stop().unwrap();

        let sequences: Vec<u64> = sink.records().into_iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(LoggerState::Draining.to_string(), "Draining");
        assert!(LoggerState::Created < LoggerState::Stopped);
    }
}
