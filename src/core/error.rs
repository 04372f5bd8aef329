//! Error types for the logging pipeline

use std::time::Duration;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Queue full under a lossy overflow policy; the record was dropped
    #[error("Dispatch queue full ({capacity} records), record dropped")]
    QueueFull { capacity: usize },

    /// Logger is draining or stopped and no longer accepts records
    #[error("Logger already stopped")]
    LoggerStopped,

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Custom severity rank already used by a built-in level
    #[error("Custom severity '{name}' rank {rank} collides with built-in {existing}")]
    SeverityCollision {
        name: String,
        rank: u8,
        existing: String,
    },

    /// File sink error with path
    #[error("File sink error for '{path}': {message}")]
    FileSinkError { path: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Channel send error
    #[error("Failed to send log record to the consumer thread")]
    ChannelSendError,

    /// Flush barrier was not acknowledged in time
    #[error("Flush did not complete within {0:?}")]
    FlushTimeout(Duration),

    /// Consumer thread panicked
    #[error("Consumer thread panicked: {0}")]
    WorkerPanicked(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn queue_full(capacity: usize) -> Self {
        LoggerError::QueueFull { capacity }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn severity_collision(
        name: impl Into<String>,
        rank: u8,
        existing: impl Into<String>,
    ) -> Self {
        LoggerError::SeverityCollision {
            name: name.into(),
            rank,
            existing: existing.into(),
        }
    }

    /// Create a file sink error
    pub fn file_sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileSinkError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::queue_full(1000);
        assert!(matches!(err, LoggerError::QueueFull { capacity: 1000 }));

        let err = LoggerError::config("FileSink", "Invalid path");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_sink("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::FileSinkError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::queue_full(64);
        assert_eq!(err.to_string(), "Dispatch queue full (64 records), record dropped");

        let err = LoggerError::severity_collision("SHOUT", 30, "WARNING");
        assert_eq!(
            err.to_string(),
            "Custom severity 'SHOUT' rank 30 collides with built-in WARNING"
        );

        let err = LoggerError::FlushTimeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Flush did not complete within 250ms");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("opening log file", "cannot open file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("opening log file"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
