//! Line formats for records
//!
//! - Text: `[2025-01-08T10:30:45.123Z] [ERROR      ] main #42 - db down: connection refused`
//! - Json: one object per line with severity, rank, sequence, message and causes
//! - Logfmt: `key=value` pairs for log aggregation tools

use super::record::LogRecord;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Logfmt,
}

impl OutputFormat {
    /// Render a record as a single line, without the trailing newline
    pub fn format(&self, record: &LogRecord, timestamp_format: &TimestampFormat) -> String {
        match self {
            OutputFormat::Text => format_text(record, timestamp_format),
            OutputFormat::Json => format_json(record, timestamp_format),
            OutputFormat::Logfmt => format_logfmt(record, timestamp_format),
        }
    }
}

fn format_text(record: &LogRecord, timestamp_format: &TimestampFormat) -> String {
    let mut line = format!(
        "[{}] [{:11}] {} #{} - {}",
        timestamp_format.format(&record.timestamp),
        record.severity,
        record.thread_label(),
        record.sequence,
        record.message()
    );

    for cause in record.causes() {
        line.push_str(": ");
        line.push_str(&cause);
    }

    line
}

fn format_json(record: &LogRecord, timestamp_format: &TimestampFormat) -> String {
    let mut object = serde_json::Map::new();

    object.insert(
        "timestamp".to_string(),
        timestamp_format.to_json_value(&record.timestamp),
    );
    object.insert("severity".to_string(), record.severity.name().into());
    object.insert("rank".to_string(), record.severity.rank().into());
    object.insert("sequence".to_string(), record.sequence.into());
    object.insert("message".to_string(), record.message().into());

    let causes = record.causes();
    if !causes.is_empty() {
        object.insert("causes".to_string(), causes.into());
    }

    object.insert("thread_id".to_string(), record.thread_id.clone().into());
    if let Some(ref name) = record.thread_name {
        object.insert("thread_name".to_string(), name.clone().into());
    }

    serde_json::Value::Object(object).to_string()
}

fn format_logfmt(record: &LogRecord, timestamp_format: &TimestampFormat) -> String {
    let mut parts = vec![
        format!(
            "timestamp={}",
            escape_value(&timestamp_format.format(&record.timestamp))
        ),
        format!("severity={}", escape_value(record.severity.name())),
        format!("rank={}", record.severity.rank()),
        format!("sequence={}", record.sequence),
        // Always quoted
        format!("message={}", quote_value(&record.message())),
    ];

    let causes = record.causes();
    if !causes.is_empty() {
        parts.push(format!("causes={}", quote_value(&causes.join(": "))));
    }

    parts.push(format!("thread={}", escape_value(record.thread_label())));
    parts.join(" ")
}

/// Quote when the value would otherwise break key=value parsing
fn escape_value(value: &str) -> String {
    if value.is_empty() || value.contains([' ', '"', '=']) {
        quote_value(value)
    } else {
        value.to_string()
    }
}

fn quote_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
