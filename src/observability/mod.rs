//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! tracing::info!(...) anywhere in the process
//!     → layer.rs (event → Entry, level check)
//!     → logger.rs (hooks in order, e.g. caller.rs adds file/func/line)
//!     → format.rs (JSON or text line)
//!     → current sink (turbo.log, stderr, or an override)
//! ```
//!
//! # Design Decisions
//! - One explicit Logger handle, installed once as the global dispatcher
//! - Hooks are plain trait objects run synchronously
//! - Writes are synchronous and unbuffered beyond the destination itself

use std::path::PathBuf;

use thiserror::Error;

pub mod caller;
pub mod entry;
pub mod format;
pub mod hooks;
pub mod layer;
pub mod logger;
pub mod logging;
pub mod paths;

#[cfg(test)]
pub(crate) mod testing;

pub use caller::{Caller, CallerLocator, Frame};
pub use entry::{Callsite, Entry};
pub use format::Format;
pub use hooks::Hook;
pub use logger::{Logger, LoggerBuilder};
pub use logging::{init, initialize, install};

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log file {}: {source}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a global logger is already installed")]
    AlreadyInstalled,
}
