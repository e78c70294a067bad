//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Initialize logging → Run service
//! ```
//!
//! # Design Decisions
//! - Logging is the first subsystem up, so later failures are recorded
//! - Startup errors terminate the process with a diagnostic on stderr

pub mod startup;

pub use startup::init_logging_or_exit;
