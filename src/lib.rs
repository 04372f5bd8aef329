//! # Sherlog
//!
//! Errors that know how serious they are, and an asynchronous logger for them.
//!
//! ## Features
//!
//! - **Leveled errors**: [`LeveledError`] carries a [`Severity`] and still
//!   behaves like any other `std::error::Error`
//! - **Non-blocking producers**: `log` classifies and queues, a single
//!   consumer thread does all sink I/O in queue order
//! - **Graceful shutdown**: [`Logger::stop`] returns once every accepted
//!   record has reached the sinks
//! - **Overflow policies**: block, block with timeout, drop newest or drop
//!   oldest, with severe records always preserved
//!
//! ## Example
//!
//! ```
//! use sherlog::prelude::*;
//!
//! let logger = Logger::builder().sink(ConsoleSink::new()).start().unwrap();
//!
//! logger.log(LeveledError::operational("primary database unreachable"));
//! logger.log(std::io::Error::other("plain errors are logged at ERROR"));
//!
//! logger.stop().unwrap();
//! ```

pub mod core;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        classify, register_leveled, Leveled, LeveledError, LogRecord, Logger, LoggerBuilder,
        LoggerError, LoggerMetrics, LoggerState, OutputFormat, OverflowPolicy, Result, Severity,
        Sink, TimestampFormat,
    };
    pub use crate::sinks::{ConsoleSink, FileSink, MemorySink};
}

pub use crate::core::{
    classify, register_leveled, BoxError, CustomSeverity, Leveled, LeveledError, LogRecord,
    Logger, LoggerBuilder, LoggerError, LoggerMetrics, LoggerState, OutputFormat,
    OverflowCallback, OverflowPolicy, Result, Severity, Sink, TimestampFormat,
    DEFAULT_FLUSH_TIMEOUT, DEFAULT_QUEUE_CAPACITY, DEFAULT_SEVERITY,
};
pub use sinks::{ConsoleSink, FileSink, MemorySink};
