//! Log record flowing through the dispatch queue

use super::severity::Severity;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::error::Error;
use std::fmt;

/// Owned, thread-safe error value accepted by the logger
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

fn current_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Replace newlines, carriage returns and tabs with escape sequences so a
/// single record can never masquerade as several lines of output.
pub(crate) fn sanitize(message: &str) -> String {
    message
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// A classified error waiting to be written
///
/// The severity is resolved by the producer when the record is created.
/// Text rendering is deferred to the consumer thread.
pub struct LogRecord {
    pub sequence: u64,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub thread_id: String,
    pub thread_name: Option<String>,
    error: BoxError,
}

impl LogRecord {
    pub fn new(sequence: u64, severity: Severity, error: BoxError) -> Self {
        Self {
            sequence,
            severity,
            timestamp: Utc::now(),
            thread_id: current_thread_id(),
            thread_name: current_thread_name(),
            error,
        }
    }

    /// The logged value itself
    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.error.as_ref()
    }

    /// Sanitized display text of the logged value
    pub fn message(&self) -> String {
        sanitize(&self.error.to_string())
    }

    /// Sanitized display text of each error in the source chain, outermost first
    pub fn causes(&self) -> Vec<String> {
        let mut causes = Vec::new();
        let mut current = self.error.source();
        while let Some(cause) = current {
            causes.push(sanitize(&cause.to_string()));
            current = cause.source();
        }
        causes
    }

    /// Thread name when the producer thread has one, its id otherwise
    pub fn thread_label(&self) -> &str {
        self.thread_name.as_deref().unwrap_or(&self.thread_id)
    }
}

impl fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRecord")
            .field("sequence", &self.sequence)
            .field("severity", &self.severity.name())
            .field("timestamp", &self.timestamp)
            .field("thread", &self.thread_label())
            .field("error", &self.error)
            .finish()
    }
}
