// error.rs — Error types for stack rendering and runtime control.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing or driving the container stack.
#[derive(Debug, Error)]
pub enum StackError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A command could not be started at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// A command ran and exited unsuccessfully.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// None of the supported package managers is installed.
    #[error("no supported package manager found (need apt-get, dnf or yum)")]
    UnsupportedPackageManager,

    /// The host distribution cannot be mapped to a vendor repository.
    #[error("unsupported distribution: {0}")]
    UnsupportedDistribution(String),

    /// Not root, and no sudo to elevate with.
    #[error("must run as root or with sudo available")]
    InsufficientPrivilege,

    /// Neither `docker compose` nor `docker-compose` works.
    #[error("docker compose is not available")]
    ComposeUnavailable,

    /// Stack definition could not be serialised.
    #[error("failed to render stack definition: {0}")]
    Render(#[from] serde_yaml::Error),
}

impl StackError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StackError::Io {
            path: path.into(),
            source,
        }
    }
}
