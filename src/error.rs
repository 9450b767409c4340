//! Error types for the provisioning configuration model.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration must be finalized before it can be read or resolved")]
    NotFinalized,

    #[error("Invalid zone name: {0:?}")]
    InvalidZoneName(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Logging error: {0}")]
    Logging(String),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}
