//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize logging before anything else emits
//! - Turn setup failures into a clear operator diagnostic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - No fallback destination when the log file cannot be opened

use std::process;

use crate::config::ServiceSettings;
use crate::observability::{self, Logger, LoggingError};

/// Message printed when the log destination cannot be set up.
pub const LOG_SETUP_FAILED: &str = "Failed to setup log path, please check your service.yaml config.";

/// Initialize logging or terminate the process with a diagnostic.
pub fn init_logging_or_exit<C>(config: &C) -> Logger
where
    C: ServiceSettings + ?Sized,
{
    match observability::init(config) {
        Ok(logger) => logger,
        Err(e) => exit_with(&e),
    }
}

/// Text printed for a logging setup failure.
pub fn describe_failure(error: &LoggingError) -> String {
    match error {
        LoggingError::AlreadyInstalled => error.to_string(),
        _ => format!("{} ({})", LOG_SETUP_FAILED, error),
    }
}

fn exit_with(error: &LoggingError) -> ! {
    eprintln!("{}", describe_failure(error));
    process::exit(1)
}
