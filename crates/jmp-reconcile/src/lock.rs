// lock.rs — Exclusive per-installation run lock.
//
// One run at a time per install directory. The lock is a non-blocking flock
// on `.provision.lock`; it is released when the guard drops or the process
// exits.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::ReconcileError;

/// Held for the duration of a run.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Take the lock at `path`, failing with [`ReconcileError::Locked`] if
    /// another process holds it.
    pub fn acquire(path: &Path) -> Result<Self, ReconcileError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| ReconcileError::io(path, source))?;

        try_lock(&file).map_err(|e| {
            if e.kind() == std::io::ErrorKind::WouldBlock {
                ReconcileError::Locked(path.to_path_buf())
            } else {
                ReconcileError::io(path, e)
            }
        })?;

        tracing::debug!(path = %path.display(), "run lock acquired");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let ret = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if ret == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
impl Drop for RunLock {
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;

        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
        tracing::debug!(path = %self.path.display(), "run lock released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[cfg(unix)]
    #[test]
    fn second_holder_is_refused_until_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".provision.lock");

        let first = RunLock::acquire(&path).unwrap();
        assert!(matches!(RunLock::acquire(&path), Err(ReconcileError::Locked(_))));

        drop(first);
        assert!(RunLock::acquire(&path).is_ok());
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent").join(".provision.lock");
        assert!(matches!(RunLock::acquire(&path), Err(ReconcileError::Io { .. })));
    }
}
