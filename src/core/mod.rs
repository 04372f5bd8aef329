//! Core logger types and traits

pub mod classifier;
pub mod error;
pub mod leveled_error;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod overflow_policy;
pub(crate) mod queue;
pub mod record;
pub mod severity;
pub mod sink;
pub mod timestamp;
pub(crate) mod worker;

pub use classifier::{classify, register_leveled, DEFAULT_SEVERITY};
pub use error::{LoggerError, Result};
pub use leveled_error::{Leveled, LeveledError};
pub use logger::{
    Logger, LoggerBuilder, LoggerState, DEFAULT_FLUSH_TIMEOUT, DEFAULT_QUEUE_CAPACITY,
};
pub use metrics::LoggerMetrics;
pub use output_format::OutputFormat;
pub use overflow_policy::{OverflowCallback, OverflowPolicy};
pub use record::{BoxError, LogRecord};
pub use severity::{CustomSeverity, Severity};
pub use sink::Sink;
pub use timestamp::TimestampFormat;
