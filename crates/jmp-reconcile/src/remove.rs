//! Full removal of an installation.

use std::fs;
use std::path::PathBuf;

use jmp_stack::ContainerRuntime;

use crate::error::ReconcileError;
use crate::layout::InstallLayout;
use crate::lock::RunLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveReport {
    pub root: PathBuf,
    /// False when there was no stack definition to tear down.
    pub stack_stopped: bool,
}

/// Stop the stack, drop its images and volumes, then delete the install
/// directory.
pub fn run_remove(layout: &InstallLayout, runtime: &dyn ContainerRuntime) -> Result<RemoveReport, ReconcileError> {
    if !layout.root.is_dir() {
        return Err(ReconcileError::NotInstalled(layout.root.clone()));
    }
    let _lock = RunLock::acquire(&layout.lock_file)?;

    let stack_stopped = if layout.compose_file.exists() {
        runtime.stop(&layout.project(), true)?;
        true
    } else {
        tracing::warn!(path = %layout.compose_file.display(), "no stack definition, skipping container teardown");
        false
    };

    fs::remove_dir_all(&layout.root).map_err(|source| ReconcileError::io(&layout.root, source))?;
    tracing::info!(path = %layout.root.display(), "installation removed");

    Ok(RemoveReport {
        root: layout.root.clone(),
        stack_stopped,
    })
}
