// error.rs — Error types for identity store operations and the credential record.

use std::path::PathBuf;

use jmp_stack::StackError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The container runtime could not run the administration tool.
    #[error("container runtime error: {0}")]
    Runtime(#[from] StackError),

    /// The identity store refused the operation.
    #[error("{operation} failed for {account}: {message}")]
    Rejected {
        operation: &'static str,
        account: String,
        message: String,
    },
}

impl IdentityError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IdentityError::Io {
            path: path.into(),
            source,
        }
    }
}
