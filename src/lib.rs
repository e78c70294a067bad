//! Logging bootstrap for turbo services.
//!
//! Production services log JSON to `<service root>/<log dir>/turbo.log` at
//! INFO; every other environment logs text to stderr at DEBUG with the
//! calling file, function and line attached to each entry.

pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::{ServiceConfig, ServiceSettings};
pub use observability::{Logger, LoggingError};
