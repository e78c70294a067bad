//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Pick destination, format and level from the environment
//! - Install the logger as the process-wide `tracing` dispatcher
//!
//! # Design Decisions
//! - JSON to `<log dir>/turbo.log` at INFO for production
//! - Text to stderr at DEBUG with caller attribution everywhere else
//! - Level and hooks are fixed once built; only the output can change later

use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{ServiceSettings, PRODUCTION, TURBO_LOG_PATH};
use crate::observability::caller::CallerLocator;
use crate::observability::format::Format;
use crate::observability::logger::Logger;
use crate::observability::paths::{open_log_file, resolve_log_directory};
use crate::observability::LoggingError;

/// Build the logger for the configured environment.
///
/// In production this creates the log directory and opens the log file.
pub fn initialize<C>(config: &C) -> Result<Logger, LoggingError>
where
    C: ServiceSettings + ?Sized,
{
    if config.env() == PRODUCTION {
        let root = if config.service_root_path().trim().is_empty() {
            String::new()
        } else {
            config.service_root_path_absolute().to_string_lossy().into_owned()
        };
        let dir = resolve_log_directory(config.get(TURBO_LOG_PATH).unwrap_or(""), &root);
        let (path, file) = open_log_file(&dir)?;

        let logger = Logger::builder()
            .level(LevelFilter::INFO)
            .format(Format::Json)
            .output(file)
            .build();

        tracing::debug!(path = %path.display(), "Production log file opened");
        Ok(logger)
    } else {
        Ok(Logger::builder()
            .level(LevelFilter::DEBUG)
            .format(Format::Text)
            .output(std::io::stderr())
            .hook(CallerLocator::default())
            .build())
    }
}

/// Make `logger` the global `tracing` dispatcher.
pub fn install(logger: &Logger) -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(logger.layer())
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)
}

/// [`initialize`] followed by [`install`].
pub fn init<C>(config: &C) -> Result<Logger, LoggingError>
where
    C: ServiceSettings + ?Sized,
{
    let logger = initialize(config)?;
    install(&logger)?;

    tracing::info!(
        env = %config.env(),
        min_level = %logger.level(),
        format = ?logger.format(),
        "Logging initialized"
    );
    Ok(logger)
}
