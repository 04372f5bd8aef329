//! Console sink implementation

use crate::core::{LogRecord, OutputFormat, Result, Severity, Sink, TimestampFormat};
#[cfg(feature = "console")]
use colored::{Color, Colorize};
use std::io::Write;

/// Writes records to the terminal
///
/// `OPERATIONAL` and everything above it goes to stderr, the rest to stdout.
pub struct ConsoleSink {
    #[cfg_attr(not(feature = "console"), allow(dead_code))]
    use_colors: bool,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        }
    }

    /// Colors only take effect with the `console` feature
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// ```
    /// use sherlog::sinks::ConsoleSink;
    /// use sherlog::OutputFormat;
    ///
    /// let sink = ConsoleSink::new().with_output_format(OutputFormat::Json);
    /// ```
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn render(&self, record: &LogRecord) -> String {
        #[cfg(feature = "console")]
        {
            if self.use_colors && self.output_format == OutputFormat::Text {
                return self.render_colored(record);
            }
        }

        self.output_format.format(record, &self.timestamp_format)
    }

    #[cfg(feature = "console")]
    fn render_colored(&self, record: &LogRecord) -> String {
        let label = format!("{:11}", record.severity).color(severity_color(&record.severity));
        let mut line = format!(
            "[{}] [{}] {} #{} - {}",
            self.timestamp_format.format(&record.timestamp),
            label,
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
}

/// Terminal color for a severity; custom severities take the color of the
/// built-in band their rank falls in
#[cfg(feature = "console")]
pub fn severity_color(severity: &Severity) -> Color {
    match severity.rank() {
        0..=19 => Color::Cyan,
        20..=29 => Color::Green,
        30..=39 => Color::Yellow,
        40..=49 => Color::Magenta,
        50..=59 => Color::Red,
        _ => Color::BrightRed,
    }
}

fn goes_to_stderr(severity: &Severity) -> bool {
    *severity >= Severity::Operational
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, record: &LogRecord) -> Result<()> {
        let line = self.render(record);

        if goes_to_stderr(&record.severity) {
            writeln!(std::io::stderr().lock(), "{}", line)?;
        } else {
            writeln!(std::io::stdout().lock(), "{}", line)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_routing() {
        assert!(!goes_to_stderr(&Severity::Debug));
        assert!(!goes_to_stderr(&Severity::Warning));
        assert!(goes_to_stderr(&Severity::Operational));
        assert!(goes_to_stderr(&Severity::Fatal));
        assert!(goes_to_stderr(&Severity::custom_unchecked("AUDIT", 45)));
    }

    #[test]
    fn test_plain_render_matches_output_format() {
        let sink = ConsoleSink::new()
            .with_colors(false)
            .with_output_format(OutputFormat::Logfmt);
        let record = LogRecord::new(0, Severity::Warning, "slow".into());
        assert!(sink.render(&record).contains("severity=WARNING"));
    }

    #[cfg(feature = "console")]
    #[test]
    fn test_custom_severity_color_follows_rank_band() {
        assert_eq!(severity_color(&Severity::Error), Color::Red);
        assert_eq!(
            severity_color(&Severity::custom_unchecked("AUDIT", 45)),
            severity_color(&Severity::Operational)
        );
    }

    #[test]
    fn test_write_does_not_fail() {
        let mut sink = ConsoleSink::new();
        let record = LogRecord::new(0, Severity::Info, "console smoke test".into());
        sink.write(&record).unwrap();
        sink.flush().unwrap();
    }
}
