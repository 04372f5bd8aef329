//! Error values that carry a severity
//!
//! A [`LeveledError`] is an ordinary `std::error::Error` that also exposes a
//! [`Severity`] through the [`Leveled`] capability. It can be returned, boxed
//! and wrapped like any other error, and the logger recognises it when it is
//! handed in, classifying everything else at the default severity.

use super::error::Result;
use super::severity::Severity;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Capability of exposing a severity
///
/// Implemented by [`LeveledError`]. User error types can implement it too and
/// go through [`Logger::log_leveled`](crate::Logger::log_leveled) to keep their
/// own severity.
pub trait Leveled {
    fn severity(&self) -> Severity;
}

impl<T: Leveled + ?Sized> Leveled for &T {
    fn severity(&self) -> Severity {
        (**self).severity()
    }
}

impl<T: Leveled + ?Sized> Leveled for Box<T> {
    fn severity(&self) -> Severity {
        (**self).severity()
    }
}

/// An immutable error with a message, a severity and an optional cause
///
/// Two leveled errors are equal when message and severity are equal; the
/// cause does not take part in comparison.
///
/// # Example
///
/// ```
/// use sherlog::{LeveledError, Severity};
///
/// fn slow_operation() -> Result<(), LeveledError> {
///     Err(LeveledError::warning("thing took longer than it normally does"))
/// }
///
/// let err = slow_operation().unwrap_err();
/// assert_eq!(err.severity(), Severity::Warning);
/// assert_eq!(err.to_string(), "thing took longer than it normally does");
/// ```
#[derive(Clone)]
pub struct LeveledError {
    message: String,
    severity: Severity,
    source: Option<Arc<dyn Error + Send + Sync + 'static>>,
}

impl LeveledError {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
            source: None,
        }
    }

    #[inline]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    #[inline]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// An error operators should look at, but not a crash
    #[inline]
    pub fn operational(message: impl Into<String>) -> Self {
        Self::new(Severity::Operational, message)
    }

    #[inline]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, message)
    }

    /// Create an error at a user-defined severity
    ///
    /// Fails when `rank` collides with a built-in severity; build the level
    /// with [`Severity::custom_unchecked`] and use [`LeveledError::new`] when
    /// the collision is wanted.
    pub fn custom(name: impl Into<String>, rank: u8, message: impl Into<String>) -> Result<Self> {
        Ok(Self::new(Severity::custom(name, rank)?, message))
    }

    /// Create an error that wraps an underlying cause
    pub fn wrap<E>(severity: Severity, message: impl Into<String>, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::new(severity, message).with_source(cause)
    }

    #[must_use]
    pub fn with_source<E>(mut self, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(cause));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity.clone()
    }
}

impl Leveled for LeveledError {
    fn severity(&self) -> Severity {
        LeveledError::severity(self)
    }
}

impl fmt::Display for LeveledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for LeveledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("LeveledError");
        debug
            .field("severity", &self.severity.name())
            .field("message", &self.message);
        if let Some(source) = &self.source {
            debug.field("source", source);
        }
        debug.finish()
    }
}

impl Error for LeveledError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|cause| cause.as_ref() as &(dyn Error + 'static))
    }
}

impl PartialEq for LeveledError {
    fn eq(&self, other: &Self) -> bool {
        self.severity == other.severity && self.message == other.message
    }
}

impl Eq for LeveledError {}
