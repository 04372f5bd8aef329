//! Timestamp rendering for formatted records

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const ISO8601_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// How a record's timestamp is written
///
/// ```
/// use sherlog::TimestampFormat;
/// use chrono::Utc;
///
/// let rendered = TimestampFormat::Iso8601.format(&Utc::now());
/// assert!(rendered.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// `2025-01-08T10:30:45.123456Z`, for ordering records from busy producers
    Iso8601Micros,

    /// `2025-01-08T10:30:45.123456+00:00`
    Rfc3339,

    /// Seconds since the epoch
    Unix,

    /// Milliseconds since the epoch
    UnixMillis,

    /// Any strftime pattern, e.g. `"%d/%b/%Y:%H:%M:%S %z"`
    ///
    /// Prefer [`TimestampFormat::custom`], which rejects invalid patterns.
    /// A pattern that cannot be rendered falls back to ISO-8601.
    Custom(String),
}

impl TimestampFormat {
    /// Checked constructor for [`TimestampFormat::Custom`]
    ///
    /// ```
    /// use sherlog::TimestampFormat;
    ///
    /// assert!(TimestampFormat::custom("%Y-%m-%d").is_ok());
    /// assert!(TimestampFormat::custom("%Q").is_err());
    /// ```
    pub fn custom(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| item == Item::Error) {
            return Err(LoggerError::config(
                "TimestampFormat",
                format!("invalid strftime pattern: {:?}", pattern),
            ));
        }
        Ok(TimestampFormat::Custom(pattern))
    }

    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format(ISO8601_PATTERN).to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(pattern) => {
                let mut rendered = String::new();
                match write!(rendered, "{}", datetime.format(pattern)) {
                    Ok(()) => rendered,
                    Err(_) => datetime.format(ISO8601_PATTERN).to_string(),
                }
            }
        }
    }

    /// Numeric formats become JSON numbers, everything else a string
    #[must_use]
    pub fn to_json_value(&self, datetime: &DateTime<Utc>) -> serde_json::Value {
        match self {
            TimestampFormat::Unix => datetime.timestamp().into(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().into(),
            _ => serde_json::Value::String(self.format(datetime)),
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::Unix | TimestampFormat::UnixMillis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_iso8601_variants() {
        assert_eq!(
            TimestampFormat::Iso8601.format(&fixed_datetime()),
            "2025-01-08T10:30:45.123Z"
        );
        assert_eq!(
            TimestampFormat::Iso8601Micros.format(&fixed_datetime()),
            "2025-01-08T10:30:45.123456Z"
        );
    }

    #[test]
    fn test_rfc3339_has_offset() {
        let result = TimestampFormat::Rfc3339.format(&fixed_datetime());
        assert!(result.starts_with("2025-01-08T10:30:45"));
        assert!(result.ends_with("+00:00"));
    }

    #[test]
    fn test_numeric_formats() {
        let seconds: i64 = TimestampFormat::Unix.format(&fixed_datetime()).parse().unwrap();
        let millis: i64 = TimestampFormat::UnixMillis.format(&fixed_datetime()).parse().unwrap();
        assert_eq!(seconds * 1000 + 123, millis);
        assert!(TimestampFormat::Unix.is_numeric());
        assert!(!TimestampFormat::Custom("%s".to_string()).is_numeric());
    }

    #[test]
    fn test_custom_pattern() {
        let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S +0000".to_string());
        assert_eq!(format.format(&fixed_datetime()), "08/Jan/2025:10:30:45 +0000");
    }

    #[test]
    fn test_custom_rejects_invalid_pattern() {
        let err = TimestampFormat::custom("%Q").unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert_eq!(
            TimestampFormat::custom("%Y").unwrap(),
            TimestampFormat::Custom("%Y".to_string())
        );
    }

    #[test]
    fn test_invalid_custom_pattern_falls_back_to_iso8601() {
        let format = TimestampFormat::Custom("%Q".to_string());
        assert_eq!(format.format(&fixed_datetime()), "2025-01-08T10:30:45.123Z");
        assert_eq!(
            format.to_json_value(&fixed_datetime()),
            serde_json::json!("2025-01-08T10:30:45.123Z")
        );
    }

    #[test]
    fn test_json_value() {
        assert!(TimestampFormat::UnixMillis.to_json_value(&fixed_datetime()).is_i64());
        assert_eq!(
            TimestampFormat::Iso8601.to_json_value(&fixed_datetime()),
            serde_json::json!("2025-01-08T10:30:45.123Z")
        );
    }

    #[test]
    fn test_serde_round_trip_from_config() {
        let format: TimestampFormat = serde_json::from_str(r#"{"Custom":"%Y-%m-%d"}"#).unwrap();
        assert_eq!(format, TimestampFormat::Custom("%Y-%m-%d".to_string()));
        assert_eq!(serde_json::to_string(&TimestampFormat::Unix).unwrap(), "\"Unix\"");
    }
}
