//! Consumer loop
//!
//! The one thread that takes records off the dispatch queue and hands them
//! to the sinks. It is the only place sink I/O happens.

use super::{
    error::{LoggerError, Result},
    metrics::LoggerMetrics,
    queue::Message,
    record::LogRecord,
    sink::Sink,
};
use crossbeam_channel::Receiver;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

pub(crate) const WORKER_THREAD_NAME: &str = "sherlog-consumer";

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

pub(crate) struct Worker {
    sinks: Vec<Box<dyn Sink>>,
    receiver: Receiver<Message>,
    metrics: Arc<LoggerMetrics>,
}

impl Worker {
    pub(crate) fn new(
        sinks: Vec<Box<dyn Sink>>,
        receiver: Receiver<Message>,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        Self {
            sinks,
            receiver,
            metrics,
        }
    }

    pub(crate) fn spawn(self) -> Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || self.run())
            .map_err(|e| LoggerError::io_operation("spawning consumer thread", e.to_string(), e))
    }

    /// Process messages until every sender is gone and the queue is empty
    pub(crate) fn run(mut self) {
        // recv keeps returning queued messages after disconnect, so this drains
        while let Ok(message) = self.receiver.recv() {
            match message {
                Message::Record(record) => self.dispatch(&record),
                Message::Flush(ack) => {
                    self.flush_sinks();
                    let _ = ack.send(());
                }
            }

            if self.receiver.is_empty() {
                self.flush_sinks();
            }
        }

        self.flush_sinks();
    }

    /// Write one record to every sink
    ///
    /// **Per-Sink Panic Isolation**: each sink call is wrapped in
    /// `catch_unwind`, so one failing sink never stops the others or the loop.
    fn dispatch(&mut self, record: &LogRecord) {
        let mut has_error = false;

        for (idx, sink) in self.sinks.iter_mut().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| sink.write(record))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[SHERLOG ERROR] Sink #{} ({}) failed on record {}: {}",
                        idx,
                        sink.name(),
                        record.sequence,
                        e
                    );
                    has_error = true;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[SHERLOG CRITICAL] Sink #{} ({}) panicked on record {}: {}. \
                         Other sinks continue to function.",
                        idx,
                        sink.name(),
                        record.sequence,
                        panic_message(panic_info.as_ref())
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            self.metrics.record_sink_failure();
        } else {
            self.metrics.record_delivered();
        }
    }

    fn flush_sinks(&mut self) {
        for (idx, sink) in self.sinks.iter_mut().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| sink.flush())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[SHERLOG ERROR] Sink #{} ({}) flush failed: {}", idx, sink.name(), e);
                }
                Err(panic_info) => {
                    eprintln!(
                        "[SHERLOG CRITICAL] Sink #{} ({}) panicked during flush: {}",
                        idx,
                        sink.name(),
                        panic_message(panic_info.as_ref())
                    );
                }
            }
        }
    }
}
