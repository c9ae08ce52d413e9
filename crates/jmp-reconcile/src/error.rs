// error.rs — Error types for the install and remove pipelines.

use std::path::PathBuf;

use jmp_config::ConfigError;
use jmp_identity::IdentityError;
use jmp_stack::StackError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Stack(#[from] StackError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The tool configuration file could not be read or parsed.
    #[error("invalid tool configuration {path}: {message}")]
    ToolConfig { path: PathBuf, message: String },

    /// Another run holds the installation lock.
    #[error("another run is in progress (lock held on {0})")]
    Locked(PathBuf),

    /// Removal was requested but there is nothing installed.
    #[error("installation directory {0} does not exist")]
    NotInstalled(PathBuf),
}

impl ReconcileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReconcileError::Io {
            path: path.into(),
            source,
        }
    }
}
