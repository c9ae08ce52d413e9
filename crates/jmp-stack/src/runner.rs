//! Command runner abstraction for host commands.
//!
//! `CommandRunner` is the trait the Docker runtime, package installation and
//! host preparation use to execute programs. `SystemRunner` is the production
//! implementation. `MockRunner` records commands and answers them from prefix
//! rules.

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::StackError;

/// A program invocation: program, arguments, optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Trait for executing host commands.
pub trait CommandRunner {
    /// Run a command to completion. A non-zero exit is `Ok` with
    /// `success == false`; only failure to start is an `Err`.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, StackError>;

    /// Run a command and turn a non-zero exit into `CommandFailed`.
    fn run_checked(&self, spec: &CommandSpec) -> Result<String, StackError> {
        let output = self.run(spec)?;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(StackError::CommandFailed {
                command: spec.to_string(),
                stderr: output.stderr.trim().to_string(),
            })
        }
    }

    /// Whether the command runs and exits successfully.
    fn succeeds(&self, spec: &CommandSpec) -> bool {
        self.run(spec).map(|o| o.success).unwrap_or(false)
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, StackError> {
        (**self).run(spec)
    }
}

/// Production runner backed by `std::process::Command`. Expects the process
/// to already run as root.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        SystemRunner
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, StackError> {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            command.current_dir(dir);
        }

        tracing::debug!(command = %spec, "running");
        let output = command.output().map_err(|source| StackError::Spawn {
            command: spec.to_string(),
            source,
        })?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Test-double runner that records commands and answers from prefix rules.
///
/// The most recently added rule whose prefix matches the rendered command
/// wins; unmatched commands succeed with empty output.
pub struct MockRunner {
    rules: RefCell<Vec<(String, CommandOutput)>>,
    commands: RefCell<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner {
            rules: RefCell::new(Vec::new()),
            commands: RefCell::new(Vec::new()),
        }
    }

    /// Answer commands starting with `prefix` with `output`.
    pub fn respond(self, prefix: &str, output: CommandOutput) -> Self {
        self.rules.borrow_mut().push((prefix.to_string(), output));
        self
    }

    /// Make commands starting with `prefix` exit unsuccessfully.
    pub fn fail(self, prefix: &str) -> Self {
        self.respond(prefix, CommandOutput::failed(format!("{}: failed", prefix)))
    }

    pub fn executed_commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    /// Whether any executed command starts with `prefix`.
    pub fn ran(&self, prefix: &str) -> bool {
        self.commands.borrow().iter().any(|c| c.starts_with(prefix))
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, StackError> {
        let line = spec.to_string();
        self.commands.borrow_mut().push(line.clone());
        let rules = self.rules.borrow();
        Ok(rules
            .iter()
            .rev()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput::ok("")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_spec_renders_program_and_args() {
        let spec = CommandSpec::new("docker").args(["compose", "up", "-d"]);
        assert_eq!(spec.to_string(), "docker compose up -d");
    }

    #[test]
    fn mock_runner_records_commands() {
        let runner = MockRunner::new();
        runner.run(&CommandSpec::new("echo").arg("hello")).unwrap();
        runner.run(&CommandSpec::new("echo").arg("world")).unwrap();
        assert_eq!(runner.executed_commands(), vec!["echo hello", "echo world"]);
    }

    #[test]
    fn mock_runner_latest_matching_rule_wins() {
        let runner = MockRunner::new()
            .respond("docker", CommandOutput::ok("generic"))
            .respond("docker compose", CommandOutput::ok("compose"));
        let out = runner.run(&CommandSpec::new("docker").arg("compose")).unwrap();
        assert_eq!(out.stdout, "compose");
        let out = runner.run(&CommandSpec::new("docker").arg("--version")).unwrap();
        assert_eq!(out.stdout, "generic");
    }

    #[test]
    fn run_checked_reports_failure() {
        let runner = MockRunner::new().fail("apt-get install");
        let err = runner
            .run_checked(&CommandSpec::new("apt-get").args(["install", "-y", "x"]))
            .unwrap_err();
        assert!(matches!(err, StackError::CommandFailed { ref command, .. } if command == "apt-get install -y x"));
        assert!(!runner.succeeds(&CommandSpec::new("apt-get").arg("install")));
    }
}
