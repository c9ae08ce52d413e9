// host.rs — Host preparation outside the container runtime.

use crate::error::StackError;
use crate::runner::{CommandRunner, CommandSpec};

/// Kernel module the recording agent needs for its virtual sound card.
pub const RECORDER_SOUND_MODULE: &str = "snd-aloop";

/// Host-level operations the reconciler needs besides the container runtime.
pub trait HostOps {
    /// Load a kernel module (no-op if it is already loaded).
    fn load_kernel_module(&self, module: &str) -> Result<(), StackError>;
}

/// `modprobe`-backed host operations.
pub struct SystemHost<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> SystemHost<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> HostOps for SystemHost<R> {
    fn load_kernel_module(&self, module: &str) -> Result<(), StackError> {
        tracing::debug!(module, "loading kernel module");
        self.runner
            .run_checked(&CommandSpec::new("modprobe").arg(module))?;
        Ok(())
    }
}
