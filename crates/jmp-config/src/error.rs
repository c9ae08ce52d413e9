// error.rs — Error types for settings resolution and .env persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, validating, or writing settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A setting could not be parsed into its declared type.
    #[error("invalid value for {key}: {value:?} (expected {expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    /// A lower bound is above its upper bound.
    #[error("{min_key}={min} must not exceed {max_key}={max}")]
    InvalidRange {
        min_key: &'static str,
        min: u32,
        max_key: &'static str,
        max: u32,
    },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}
