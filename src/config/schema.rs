//! Configuration schema definitions.
//!
//! This module defines the service configuration consumed by the logging
//! bootstrap. All types derive Serde traits for deserialization from config
//! files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::observability::paths::clean_path;

/// Key under which the log directory is stored in [`ServiceConfig::configs`].
pub const TURBO_LOG_PATH: &str = "turbo_log_path";

/// Environment name that selects the production logging profile.
pub const PRODUCTION: &str = "production";

/// Read access to the service configuration.
///
/// The logging initializer only depends on this trait, so callers can hand
/// it their own configuration object.
pub trait ServiceSettings {
    /// Environment name, e.g. `"production"` or `"development"`.
    fn env(&self) -> &str;

    /// Service root as written in the configuration.
    fn service_root_path(&self) -> &str;

    /// Service root made absolute against the working directory.
    fn service_root_path_absolute(&self) -> PathBuf;

    /// Generic string lookup.
    fn get(&self, key: &str) -> Option<&str>;
}

/// Root configuration for a service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Environment name (empty means development).
    pub env: String,

    /// Service root directory, relative or absolute.
    pub service_root: String,

    /// Free-form string settings.
    pub configs: HashMap<String, String>,
}

impl ServiceConfig {
    /// Convenience accessor for the configured log directory.
    pub fn log_path(&self) -> Option<&str> {
        self.get(TURBO_LOG_PATH)
    }

    /// Whether this configuration selects the production profile.
    pub fn is_production(&self) -> bool {
        self.env == PRODUCTION
    }
}

impl ServiceSettings for ServiceConfig {
    fn env(&self) -> &str {
        &self.env
    }

    fn service_root_path(&self) -> &str {
        &self.service_root
    }

    fn service_root_path_absolute(&self) -> PathBuf {
        let root = Path::new(self.service_root.trim());
        if root.is_absolute() {
            return clean_path(root);
        }
        match std::env::current_dir() {
            Ok(cwd) => clean_path(&cwd.join(root)),
            Err(_) => clean_path(root),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.configs.get(key).map(String::as_str)
    }
}
