//! Overflow policies for the bounded dispatch queue
//!
//! When the queue is full, the policy decides whether the producer waits or
//! a record is dropped. Dropping is always counted, never silent.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Policy for handling a full dispatch queue
///
/// # Example
///
/// ```
/// use sherlog::OverflowPolicy;
/// use std::time::Duration;
///
/// // Default behavior: wait for space, never drop
/// let policy = OverflowPolicy::default();
/// assert_eq!(policy, OverflowPolicy::Block);
///
/// // Block with timeout
/// let policy = OverflowPolicy::BlockWithTimeout(Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Block until space is available
    ///
    /// The producer is held until the consumer frees a slot. No record is
    /// ever lost to overflow.
    #[default]
    Block,

    /// Block with timeout, then drop the new record
    BlockWithTimeout(Duration),

    /// Drop the new record when the queue is full
    DropNewest,

    /// Evict the oldest queued record to make room for the new one
    DropOldest,
}

impl OverflowPolicy {
    /// Whether this policy may ever drop a record
    pub fn is_lossy(&self) -> bool {
        !matches!(self, OverflowPolicy::Block)
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Block => write!(f, "Block"),
            OverflowPolicy::BlockWithTimeout(d) => write!(f, "BlockWithTimeout({:?})", d),
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
            OverflowPolicy::DropOldest => write!(f, "DropOldest"),
        }
    }
}

/// Callback type for overflow notifications
///
/// Called when records are dropped due to queue overflow.
/// The parameter is the total count of dropped records so far.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_policy_default() {
        assert_eq!(OverflowPolicy::default(), OverflowPolicy::Block);
        assert!(!OverflowPolicy::default().is_lossy());
    }

    #[test]
    fn test_overflow_policy_display() {
        assert_eq!(OverflowPolicy::Block.to_string(), "Block");
        assert_eq!(OverflowPolicy::DropNewest.to_string(), "DropNewest");
        assert_eq!(OverflowPolicy::DropOldest.to_string(), "DropOldest");
        assert_eq!(
            OverflowPolicy::BlockWithTimeout(Duration::from_millis(100)).to_string(),
            "BlockWithTimeout(100ms)"
        );
    }

    #[test]
    fn test_lossy_policies() {
        assert!(OverflowPolicy::DropNewest.is_lossy());
        assert!(OverflowPolicy::DropOldest.is_lossy());
        assert!(OverflowPolicy::BlockWithTimeout(Duration::from_millis(1)).is_lossy());
    }
}
