//! Logs one error of each kind through a console logger.
//!
//! Run with: cargo run --example polylogger

use sherlog::prelude::*;
use sherlog::{ops_error, LoggerError};

fn return_error() -> std::result::Result<(), LeveledError> {
    Err(LeveledError::new(Severity::Error, "the request could not be completed"))
}

fn return_ops_error() -> std::result::Result<(), LeveledError> {
    Err(ops_error!("connection to {} was refused", "db-primary:5432"))
}

fn return_custom_leveled_error() -> std::result::Result<(), LeveledError> {
    let audit = LeveledError::custom("AUDIT", 45, "user 42 was granted admin")
        .map_err(|e: LoggerError| LeveledError::wrap(Severity::Fatal, "invalid severity", e))?;
    Err(audit)
}

fn return_warning() -> Option<LeveledError> {
    let potential_warning = do_something_that_takes_longer_than_expected();
    println!("Doing other work without checking: the result is either nothing or a warning");
    potential_warning
}

fn do_something_that_takes_longer_than_expected() -> Option<LeveledError> {
    println!("Something just took 100x longer than it normally does");
    let took_longer_than_normal = true;
    took_longer_than_normal.then(|| LeveledError::warning("thing took longer than it normally does"))
}

fn main() -> sherlog::Result<()> {
    let logger = Logger::builder()
        .min_severity(Severity::Debug)
        .sink(ConsoleSink::new())
        .start()?;

    logger.log_result(return_error());
    logger.log_result(return_ops_error());
    logger.log_opt(return_warning());
    logger.log_result(return_custom_leveled_error());
    logger.log(std::io::Error::other(
        "an accidental plain error, logged at the default severity",
    ));

    // Blocks until every record above has been written
    logger.stop()
}
