// privilege.rs — Decide how privileged commands are run.
//
// Package installation, docker, modprobe and the files under the install
// directory all need root. Running as root proceeds directly; otherwise the
// binary re-executes itself through `sudo` if it is on PATH.

use crate::error::StackError;

/// How the run obtains root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    Root,
    Sudo,
}

/// Inspect the current process and PATH.
pub fn detect_elevation() -> Result<Elevation, StackError> {
    elevation_for(is_root(), which::which("sudo").is_ok())
}

/// Pick an elevation strategy from the two facts that matter.
pub fn elevation_for(is_root: bool, has_sudo: bool) -> Result<Elevation, StackError> {
    match (is_root, has_sudo) {
        (true, _) => Ok(Elevation::Root),
        (false, true) => Ok(Elevation::Sudo),
        (false, false) => Err(StackError::InsufficientPrivilege),
    }
}

#[cfg(unix)]
fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}
