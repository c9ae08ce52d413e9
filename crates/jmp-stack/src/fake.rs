//! In-memory doubles for [`ContainerRuntime`] and [`HostOps`].
//!
//! Used by unit tests here and by the flow tests of the reconciler. Every call
//! is recorded; failures can be injected per operation name.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::StackError;
use crate::host::HostOps;
use crate::readiness::ACTIVATION_MARKER;
use crate::runner::CommandOutput;
use crate::runtime::{ComposeProject, ContainerRuntime, RuntimeStatus};

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    running: bool,
    probes: usize,
    failing: Vec<String>,
    exec_responses: VecDeque<CommandOutput>,
    execs: Vec<Vec<String>>,
}

/// A container runtime that only records what it was asked to do.
#[derive(Default)]
pub struct FakeRuntime {
    state: RefCell<FakeState>,
    not_ready_for: usize,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the stack as not ready for the first `probes` running checks.
    pub fn ready_after(mut self, probes: usize) -> Self {
        self.not_ready_for = probes;
        self
    }

    /// Make `operation` (`ensure_runtime`, `pull`, `start`, `stop`, `exec`)
    /// fail.
    pub fn failing(self, operation: &str) -> Self {
        self.state.borrow_mut().failing.push(operation.to_string());
        self
    }

    /// Queue an answer for the next `exec`. Unqueued execs succeed silently.
    pub fn push_exec_response(&self, output: CommandOutput) {
        self.state.borrow_mut().exec_responses.push_back(output);
    }

    /// Operation names in call order, e.g. `["ensure_runtime", "pull"]`.
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn exec_calls(&self) -> Vec<Vec<String>> {
        self.state.borrow().execs.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    fn record(&self, operation: &str) -> Result<(), StackError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(operation.to_string());
        if state.failing.iter().any(|f| f == operation) {
            return Err(StackError::CommandFailed {
                command: format!("fake {}", operation),
                stderr: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl ContainerRuntime for FakeRuntime {
    fn ensure_runtime(&self) -> Result<RuntimeStatus, StackError> {
        self.record("ensure_runtime")?;
        Ok(RuntimeStatus::AlreadyPresent)
    }

    fn pull(&self, _project: &ComposeProject) -> Result<(), StackError> {
        self.record("pull")
    }

    fn start(&self, _project: &ComposeProject) -> Result<(), StackError> {
        self.record("start")?;
        self.state.borrow_mut().running = true;
        Ok(())
    }

    fn stop(&self, _project: &ComposeProject, purge: bool) -> Result<(), StackError> {
        self.record(if purge { "stop --purge" } else { "stop" })?;
        self.state.borrow_mut().running = false;
        Ok(())
    }

    fn service_running(&self, _project: &ComposeProject, _service: &str) -> Result<bool, StackError> {
        let mut state = self.state.borrow_mut();
        state.probes += 1;
        Ok(state.running && state.probes > self.not_ready_for)
    }

    fn service_logs(&self, _project: &ComposeProject, _service: &str, _tail: usize) -> Result<String, StackError> {
        let state = self.state.borrow();
        if state.running && state.probes > self.not_ready_for {
            Ok(format!("focus.meet.jitsi:component info\t{} 'focus'\n", ACTIVATION_MARKER))
        } else {
            Ok(String::new())
        }
    }

    fn exec(&self, _project: &ComposeProject, _service: &str, args: &[String]) -> Result<CommandOutput, StackError> {
        self.record("exec")?;
        let mut state = self.state.borrow_mut();
        state.execs.push(args.to_vec());
        Ok(state
            .exec_responses
            .pop_front()
            .unwrap_or_else(|| CommandOutput::ok("")))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Host operations double: remembers loaded modules, optionally fails.
#[derive(Default)]
pub struct FakeHost {
    loaded: RefCell<Vec<String>>,
    fail: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            loaded: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn loaded_modules(&self) -> Vec<String> {
        self.loaded.borrow().clone()
    }
}

impl HostOps for FakeHost {
    fn load_kernel_module(&self, module: &str) -> Result<(), StackError> {
        if self.fail {
            return Err(StackError::CommandFailed {
                command: format!("modprobe {}", module),
                stderr: "module not found".to_string(),
            });
        }
        self.loaded.borrow_mut().push(module.to_string());
        Ok(())
    }
}
