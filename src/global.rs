//! Process-wide logger
//!
//! Applications that want one logger for the whole process install it once
//! with [`init`] and log through [`log`] from anywhere. Explicit [`Logger`]
//! instances keep working alongside it.

use crate::core::{BoxError, Logger, LoggerError, Result};
use std::sync::OnceLock;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Install and start the process-wide logger
///
/// Fails if a logger was already installed; the given one is then dropped,
/// which stops it.
pub fn init(logger: Logger) -> Result<()> {
    let mut pending = Some(logger);
    let installed = GLOBAL.get_or_init(|| pending.take().unwrap_or_default());

    if pending.is_some() {
        return Err(LoggerError::config("global", "logger already initialized"));
    }
    installed.start()
}

/// The installed logger, if any
pub fn logger() -> Option<&'static Logger> {
    GLOBAL.get()
}

/// Log through the process-wide logger; a no-op before [`init`]
pub fn log<E: Into<BoxError>>(err: E) {
    if let Some(logger) = GLOBAL.get() {
        logger.log(err);
    }
}

/// Drain and stop the process-wide logger
///
/// Statics are never dropped, so call this before the process exits.
pub fn stop() -> Result<()> {
    match GLOBAL.get() {
        Some(logger) => logger.stop(),
        None => Ok(()),
    }
}
