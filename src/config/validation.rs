//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject paths the filesystem cannot represent
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{ServiceConfig, TURBO_LOG_PATH};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("`{field}` contains a NUL byte")]
    NulByte { field: String },

    #[error("`env` must not contain whitespace: {0:?}")]
    EnvWhitespace(String),

    #[error("config key must not be empty")]
    EmptyKey,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service_root.contains('\0') {
        errors.push(ValidationError::NulByte {
            field: "service_root".into(),
        });
    }

    if config.env.chars().any(char::is_whitespace) {
        errors.push(ValidationError::EnvWhitespace(config.env.clone()));
    }

    if config.configs.keys().any(|k| k.trim().is_empty()) {
        errors.push(ValidationError::EmptyKey);
    }

    if let Some(path) = config.configs.get(TURBO_LOG_PATH) {
        if path.contains('\0') {
            errors.push(ValidationError::NulByte {
                field: format!("configs.{}", TURBO_LOG_PATH),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
