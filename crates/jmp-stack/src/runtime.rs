//! Core ContainerRuntime trait and the compose project it operates on.

use std::path::{Path, PathBuf};

use crate::error::StackError;
use crate::packages::PackageManager;
use crate::runner::CommandOutput;

/// A compose project on disk: directory, definition file, project name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeProject {
    pub dir: PathBuf,
    pub file: PathBuf,
    pub name: String,
}

impl ComposeProject {
    pub fn new(dir: impl AsRef<Path>, file_name: &str, name: impl Into<String>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            file: dir.join(file_name),
            dir,
            name: name.into(),
        }
    }
}

/// What `ensure_runtime` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeStatus {
    AlreadyPresent,
    Installed(PackageManager),
}

/// Lifecycle capabilities the reconciler needs from a container runtime.
///
/// Every call is synchronous and blocking. None of them retries on its own.
pub trait ContainerRuntime {
    /// Make sure the runtime and its compose tooling are installed and
    /// running.
    ///
    /// For Docker: install Docker Engine from the vendor repository if absent,
    /// start the daemon, detect `docker compose` or `docker-compose`.
    /// For the fake: record the call.
    fn ensure_runtime(&self) -> Result<RuntimeStatus, StackError>;

    /// Pull every image referenced by the stack definition.
    fn pull(&self, project: &ComposeProject) -> Result<(), StackError>;

    /// Start the stack, recreating every service.
    fn start(&self, project: &ComposeProject) -> Result<(), StackError>;

    /// Stop and remove the stack's containers. With `purge`, images and
    /// volumes go too.
    fn stop(&self, project: &ComposeProject, purge: bool) -> Result<(), StackError>;

    /// Whether `service` has a running container.
    fn service_running(&self, project: &ComposeProject, service: &str) -> Result<bool, StackError>;

    /// The last `tail` log lines of `service`.
    fn service_logs(&self, project: &ComposeProject, service: &str, tail: usize) -> Result<String, StackError>;

    /// Run a command inside the running `service` container.
    fn exec(&self, project: &ComposeProject, service: &str, args: &[String]) -> Result<CommandOutput, StackError>;

    /// Runtime display name (for logs and the run summary).
    fn name(&self) -> &str;
}
