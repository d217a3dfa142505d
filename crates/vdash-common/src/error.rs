//! ---
//! vdash_section: "01-core-functionality"
//! vdash_subsection: "module"
//! vdash_type: "source"
//! vdash_scope: "code"
//! vdash_description: "Configuration error taxonomy."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Failures raised while reading the dashboard configuration resource.
///
/// Callers in this workspace never propagate these to the user; they log a
/// warning and fall back to defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file '{}' not found", .0.display())]
    Missing(PathBuf),
    #[error("configuration file '{}' is malformed: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl ConfigError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ConfigError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ConfigError::Missing(_))
    }
}
