//! Severity resolution for arbitrary errors

use super::leveled_error::{Leveled, LeveledError};
use super::severity::Severity;
use parking_lot::{const_rwlock, RwLock};
use std::any::TypeId;
use std::error::Error;

/// Severity given to errors that do not carry one
pub const DEFAULT_SEVERITY: Severity = Severity::Error;

/// Reads the severity of one concrete [`Leveled`] type out of a type-erased error
type SeverityReader = fn(&(dyn Error + 'static)) -> Option<Severity>;

static LEVELED_TYPES: RwLock<Vec<(TypeId, SeverityReader)>> = const_rwlock(Vec::new());

fn read_severity<T: Leveled + Error + 'static>(err: &(dyn Error + 'static)) -> Option<Severity> {
    err.downcast_ref::<T>().map(Leveled::severity)
}

/// Make [`classify`] recognise a user error type by its [`Leveled`] capability
///
/// Once registered, values of `T` keep their own severity however they reach
/// the logger: `log`, `log_result`, `log_opt` or `global::log`. Registering
/// the same type twice has no further effect.
///
/// ```
/// use sherlog::{classify, register_leveled, Leveled, Severity};
/// use std::fmt;
///
/// #[derive(Debug)]
/// struct Throttled;
///
/// impl fmt::Display for Throttled {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str("throttled")
///     }
/// }
///
/// impl std::error::Error for Throttled {}
///
/// impl Leveled for Throttled {
///     fn severity(&self) -> Severity {
///         Severity::Warning
///     }
/// }
///
/// register_leveled::<Throttled>();
/// let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(Throttled);
/// assert_eq!(classify(boxed.as_ref()), Severity::Warning);
/// ```
pub fn register_leveled<T: Leveled + Error + 'static>() {
    let id = TypeId::of::<T>();
    let mut types = LEVELED_TYPES.write();
    if !types.iter().any(|(registered, _)| *registered == id) {
        types.push((id, read_severity::<T>));
    }
}

/// Resolve the effective severity of any error
///
/// A [`LeveledError`], or a value of a type passed to [`register_leveled`],
/// yields exactly its own severity. Anything else, including errors from
/// unrelated crates, yields [`DEFAULT_SEVERITY`]. Only the value itself is
/// inspected, not its source chain.
///
/// # Example
///
/// ```
/// use sherlog::{classify, LeveledError, Severity, DEFAULT_SEVERITY};
///
/// let warning = LeveledError::warning("slow op");
/// assert_eq!(classify(&warning), Severity::Warning);
///
/// let plain = std::io::Error::other("plain");
/// assert_eq!(classify(&plain), DEFAULT_SEVERITY);
/// ```
pub fn classify(err: &(dyn Error + 'static)) -> Severity {
    if let Some(leveled) = err.downcast_ref::<LeveledError>() {
        return leveled.severity();
    }

    LEVELED_TYPES
        .read()
        .iter()
        .find_map(|(_, read)| read(err))
        .unwrap_or(DEFAULT_SEVERITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::io;

    #[derive(Debug)]
    struct ForeignError;

    impl fmt::Display for ForeignError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("foreign")
        }
    }

    impl Error for ForeignError {}

    #[test]
    fn test_leveled_errors_keep_their_severity() {
        let custom = Severity::custom("AUDIT", 45).unwrap();
        let cases = [
            (LeveledError::warning("w"), Severity::Warning),
            (LeveledError::operational("o"), Severity::Operational),
            (LeveledError::new(custom.clone(), "c"), custom),
        ];

        for (err, expected) in cases {
            assert_eq!(classify(&err), expected);
            assert_eq!(classify(&err), expected, "classification is stable");
        }
    }

    #[test]
    fn test_foreign_errors_get_default() {
        assert_eq!(classify(&ForeignError), DEFAULT_SEVERITY);
        assert_eq!(classify(&io::Error::other("plain")), DEFAULT_SEVERITY);
        assert_eq!(classify(&"x".parse::<u32>().unwrap_err()), DEFAULT_SEVERITY);
    }

    #[test]
    fn test_leveled_cause_does_not_leak_through_wrapper() {
        let inner = LeveledError::warning("inner");
        let outer = io::Error::other(inner);
        assert_eq!(classify(&outer), DEFAULT_SEVERITY);
    }

    #[derive(Debug)]
    struct RateLimited;

    impl fmt::Display for RateLimited {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("rate limited")
        }
    }

    impl Error for RateLimited {}

    impl Leveled for RateLimited {
        fn severity(&self) -> Severity {
            Severity::Warning
        }
    }

    #[test]
    fn test_registered_leveled_type_keeps_its_severity() {
        register_leveled::<RateLimited>();
        register_leveled::<RateLimited>();

        let boxed: Box<dyn Error + Send + Sync> = Box::new(RateLimited);
        assert_eq!(classify(boxed.as_ref()), Severity::Warning);
        assert_eq!(classify(&RateLimited), Severity::Warning);
        assert_eq!(classify(&ForeignError), DEFAULT_SEVERITY);
        assert_eq!(
            LEVELED_TYPES
                .read()
                .iter()
                .filter(|(id, _)| *id == TypeId::of::<RateLimited>())
                .count(),
            1
        );
    }

    #[test]
    fn test_classify_boxed_trait_object() {
        let boxed: Box<dyn Error + Send + Sync> = Box::new(LeveledError::fatal("boom"));
        assert_eq!(classify(boxed.as_ref()), Severity::Fatal);
    }
}
