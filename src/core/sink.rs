//! Sink trait for log output destinations

use super::{error::Result, record::LogRecord};

/// Destination that performs the actual output of records
///
/// Sinks are owned and driven by the single consumer thread, so they only
/// need to be `Send`. `write` is called exactly once per record; an error
/// from it is reported on stderr and the record is not retried.
pub trait Sink: Send {
    fn write(&mut self, record: &LogRecord) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&mut self, record: &LogRecord) -> Result<()> {
        (**self).write(record)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
