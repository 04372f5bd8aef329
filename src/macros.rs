//! Macros for building leveled errors with `format!`-style messages.
//!
//! # Examples
//!
//! ```
//! use sherlog::prelude::*;
//! use sherlog::{leveled, ops_error, warning};
//!
//! let shard = 3;
//! let err = ops_error!("shard {} unreachable", shard);
//! assert_eq!(err.severity(), Severity::Operational);
//!
//! let slow = warning!("took {}ms", 1200);
//! assert_eq!(slow.to_string(), "took 1200ms");
//!
//! let debug = leveled!(Severity::Debug, "cache miss for {}", "user:42");
//! assert_eq!(debug.severity(), Severity::Debug);
//! ```

/// Build a [`LeveledError`](crate::LeveledError) at the given severity.
///
/// ```
/// # use sherlog::prelude::*;
/// use sherlog::leveled;
/// let err = leveled!(Severity::Fatal, "config missing: {}", "db.url");
/// assert_eq!(err.to_string(), "config missing: db.url");
/// ```
#[macro_export]
macro_rules! leveled {
    ($severity:expr, $($arg:tt)+) => {
        $crate::LeveledError::new($severity, format!($($arg)+))
    };
}

/// Build a `WARNING` leveled error.
#[macro_export]
macro_rules! warning {
    ($($arg:tt)+) => {
        $crate::leveled!($crate::Severity::Warning, $($arg)+)
    };
}

/// Build an `OPERATIONAL` leveled error.
///
/// ```
/// # use sherlog::prelude::*;
/// use sherlog::ops_error;
/// let logger = Logger::builder().sink(MemorySink::new()).start().unwrap();
/// logger.log(ops_error!("replica {} lagging", "eu-1"));
/// logger.stop().unwrap();
/// ```
#[macro_export]
macro_rules! ops_error {
    ($($arg:tt)+) => {
        $crate::leveled!($crate::Severity::Operational, $($arg)+)
    };
}
