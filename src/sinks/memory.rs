//! In-memory sink for tests and embedding applications

use crate::core::{LogRecord, Result, Severity, Sink};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// What a [`MemorySink`] keeps of each record
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRecord {
    pub sequence: u64,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub thread: String,
    pub message: String,
    pub causes: Vec<String>,
}

impl From<&LogRecord> for CapturedRecord {
    fn from(record: &LogRecord) -> Self {
        Self {
            sequence: record.sequence,
            severity: record.severity.clone(),
            timestamp: record.timestamp,
            thread: record.thread_label().to_string(),
            message: record.message(),
            causes: record.causes(),
        }
    }
}

/// Captures records in a shared buffer
///
/// Clones share the same buffer: hand one clone to the logger and keep
/// another to inspect what was written.
///
/// ```
/// use sherlog::prelude::*;
///
/// let sink = MemorySink::new();
/// let logger = Logger::builder().sink(sink.clone()).start().unwrap();
/// logger.log(LeveledError::warning("disk 91% full"));
/// logger.stop().unwrap();
///
/// assert_eq!(sink.messages(), vec!["disk 91% full"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
    flushes: Arc<Mutex<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything captured so far, in delivery order
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn flush_count(&self) -> usize {
        *self.flushes.lock()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write(&mut self, record: &LogRecord) -> Result<()> {
        self.records.lock().push(CapturedRecord::from(record));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        *self.flushes.lock() += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
