//! Severity definitions

use super::error::{LoggerError, Result};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// A user-defined severity with its own display name and rank
#[derive(Debug, Clone)]
pub struct CustomSeverity {
    name: Arc<str>,
    rank: u8,
}

impl CustomSeverity {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }
}

/// How serious a logged condition is
///
/// Built-in levels are ranked `Debug < Info < Warning < Operational < Error < Fatal`.
/// Custom levels slot in anywhere by rank. Equality, ordering and hashing all
/// use `(rank, name)`, so a custom level only equals a built-in one when it was
/// deliberately given the same rank and name.
#[derive(Debug, Clone, Default)]
pub enum Severity {
    Debug,
    #[default]
    Info,
    Warning,
    Operational,
    Error,
    Fatal,
    Custom(CustomSeverity),
}

impl Severity {
    pub const BUILTINS: [Severity; 6] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Operational,
        Severity::Error,
        Severity::Fatal,
    ];

    /// Create a custom severity, rejecting ranks already taken by a built-in
    ///
    /// # Example
    ///
    /// ```
    /// use sherlog::Severity;
    ///
    /// let audit = Severity::custom("AUDIT", 45).unwrap();
    /// assert!(audit > Severity::Operational);
    /// assert!(audit < Severity::Error);
    ///
    /// assert!(Severity::custom("LOUD", 30).is_err());
    /// ```
    pub fn custom(name: impl Into<String>, rank: u8) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LoggerError::config("Severity", "custom severity name is empty"));
        }
        if let Some(existing) = Self::BUILTINS.iter().find(|b| b.rank() == rank) {
            return Err(LoggerError::severity_collision(name, rank, existing.name()));
        }
        Ok(Self::custom_unchecked(name, rank))
    }

    /// Create a custom severity without the built-in collision check
    pub fn custom_unchecked(name: impl Into<String>, rank: u8) -> Self {
        Severity::Custom(CustomSeverity {
            name: Arc::from(name.into()),
            rank,
        })
    }

    pub fn rank(&self) -> u8 {
        match self {
            Severity::Debug => 10,
            Severity::Info => 20,
            Severity::Warning => 30,
            Severity::Operational => 40,
            Severity::Error => 50,
            Severity::Fatal => 60,
            Severity::Custom(custom) => custom.rank,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Operational => "OPERATIONAL",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
            Severity::Custom(custom) => custom.name(),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Severity::Custom(_))
    }
}

impl PartialEq for Severity {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank() && self.name() == other.name()
    }
}

impl Eq for Severity {}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.name().cmp(other.name()))
    }
}

impl Hash for Severity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        self.name().hash(state);
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "WARN" | "WARNING" => Ok(Severity::Warning),
            "OPS" | "OPERATIONAL" => Ok(Severity::Operational),
            "ERROR" => Ok(Severity::Error),
            "FATAL" => Ok(Severity::Fatal),
            _ => Err(format!("Invalid severity: '{}'", s)),
        }
    }
}
