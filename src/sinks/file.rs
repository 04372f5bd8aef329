//! File sink implementation

use crate::core::{LogRecord, LoggerError, OutputFormat, Result, Sink, TimestampFormat};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends one line per record to a file
///
/// Writes are buffered; the consumer flushes the sink whenever the queue
/// runs empty and once more on shutdown.
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LoggerError::file_sink(path.display().to_string(), e.to_string()))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        })
    }

    /// ```no_run
    /// use sherlog::sinks::FileSink;
    /// use sherlog::{OutputFormat, TimestampFormat};
    ///
    /// let sink = FileSink::new("/var/log/app.log")
    ///     .unwrap()
    ///     .with_output_format(OutputFormat::Json)
    ///     .with_timestamp_format(TimestampFormat::UnixMillis);
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

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write(&mut self, record: &LogRecord) -> Result<()> {
        let line = self.output_format.format(record, &self.timestamp_format);
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
