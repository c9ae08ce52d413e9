//! Docker runtime: `docker` plus either the compose plugin or standalone
//! `docker-compose`.

use std::cell::OnceCell;
use std::path::PathBuf;

use crate::error::StackError;
use crate::packages::{docker_install_plan, OsRelease, PackageManager};
use crate::runner::{CommandOutput, CommandRunner, CommandSpec};
use crate::runtime::{ComposeProject, ContainerRuntime, RuntimeStatus};

/// Which compose entry point the host provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeFlavor {
    /// `docker compose ...`
    Plugin,
    /// `docker-compose ...`
    Standalone,
}

/// Docker-backed [`ContainerRuntime`].
///
/// Features:
/// - Docker Engine install from download.docker.com when missing
/// - Daemon start through systemd
/// - Compose plugin preferred, standalone binary accepted
pub struct DockerRuntime<R: CommandRunner> {
    runner: R,
    os_release: PathBuf,
    program_lookup: Box<dyn Fn(&str) -> bool>,
    flavor: OnceCell<ComposeFlavor>,
}

impl<R: CommandRunner> DockerRuntime<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            os_release: PathBuf::from("/etc/os-release"),
            program_lookup: Box::new(|program| which::which(program).is_ok()),
            flavor: OnceCell::new(),
        }
    }

    /// Read distribution info from another os-release file.
    pub fn with_os_release(mut self, path: impl Into<PathBuf>) -> Self {
        self.os_release = path.into();
        self
    }

    /// Replace the PATH lookup used to find a package manager.
    pub fn with_program_lookup(mut self, lookup: impl Fn(&str) -> bool + 'static) -> Self {
        self.program_lookup = Box::new(lookup);
        self
    }

    fn docker_present(&self) -> bool {
        self.runner
            .succeeds(&CommandSpec::new("docker").arg("--version"))
    }

    fn install_docker(&self) -> Result<PackageManager, StackError> {
        let pm = PackageManager::detect_with(|p| (self.program_lookup)(p))
            .ok_or(StackError::UnsupportedPackageManager)?;
        let os = OsRelease::load(&self.os_release)?;
        tracing::info!(package_manager = pm.binary(), distro = %os.id, "installing Docker Engine");

        for step in docker_install_plan(pm, &os)? {
            self.runner.run_checked(&step)?;
        }
        Ok(pm)
    }

    fn start_daemon(&self) -> Result<(), StackError> {
        let active = CommandSpec::new("systemctl").args(["is-active", "--quiet", "docker"]);
        if self.runner.succeeds(&active) {
            tracing::debug!("docker daemon already running");
            return Ok(());
        }
        self.runner
            .run_checked(&CommandSpec::new("systemctl").args(["enable", "--now", "docker"]))?;
        Ok(())
    }

    fn detect_flavor(&self) -> Result<ComposeFlavor, StackError> {
        if self
            .runner
            .succeeds(&CommandSpec::new("docker").args(["compose", "version"]))
        {
            Ok(ComposeFlavor::Plugin)
        } else if self
            .runner
            .succeeds(&CommandSpec::new("docker-compose").arg("version"))
        {
            Ok(ComposeFlavor::Standalone)
        } else {
            Err(StackError::ComposeUnavailable)
        }
    }

    fn flavor(&self) -> Result<ComposeFlavor, StackError> {
        if let Some(flavor) = self.flavor.get() {
            return Ok(*flavor);
        }
        let flavor = self.detect_flavor()?;
        let _ = self.flavor.set(flavor);
        Ok(flavor)
    }

    fn compose(&self, project: &ComposeProject, args: &[&str]) -> Result<CommandSpec, StackError> {
        let base = match self.flavor()? {
            ComposeFlavor::Plugin => CommandSpec::new("docker").arg("compose"),
            ComposeFlavor::Standalone => CommandSpec::new("docker-compose"),
        };
        Ok(base
            .arg("-f")
            .arg(project.file.display().to_string())
            .arg("-p")
            .arg(project.name.clone())
            .args(args.iter().copied())
            .cwd(&project.dir))
    }
}

impl<R: CommandRunner> ContainerRuntime for DockerRuntime<R> {
    fn ensure_runtime(&self) -> Result<RuntimeStatus, StackError> {
        let status = if self.docker_present() {
            RuntimeStatus::AlreadyPresent
        } else {
            RuntimeStatus::Installed(self.install_docker()?)
        };
        self.start_daemon()?;
        let flavor = self.flavor()?;
        tracing::info!(?status, ?flavor, "container runtime ready");
        Ok(status)
    }

    fn pull(&self, project: &ComposeProject) -> Result<(), StackError> {
        tracing::info!(project = %project.name, "pulling images");
        self.runner.run_checked(&self.compose(project, &["pull"])?)?;
        Ok(())
    }

    fn start(&self, project: &ComposeProject) -> Result<(), StackError> {
        tracing::info!(project = %project.name, "starting stack");
        let spec = self.compose(project, &["up", "-d", "--force-recreate", "--remove-orphans"])?;
        self.runner.run_checked(&spec)?;
        Ok(())
    }

    fn stop(&self, project: &ComposeProject, purge: bool) -> Result<(), StackError> {
        let mut args = vec!["down", "--remove-orphans"];
        if purge {
            args.extend(["--rmi", "all", "--volumes"]);
        }
        tracing::info!(project = %project.name, purge, "stopping stack");
        self.runner.run_checked(&self.compose(project, &args)?)?;
        Ok(())
    }

    fn service_running(&self, project: &ComposeProject, service: &str) -> Result<bool, StackError> {
        let spec = self.compose(project, &["ps", "--status", "running", "-q", service])?;
        let output = self.runner.run(&spec)?;
        Ok(output.success && !output.stdout.trim().is_empty())
    }

    fn service_logs(&self, project: &ComposeProject, service: &str, tail: usize) -> Result<String, StackError> {
        let tail = tail.to_string();
        let spec = self.compose(project, &["logs", "--no-color", "--tail", &tail, service])?;
        self.runner.run_checked(&spec)
    }

    fn exec(&self, project: &ComposeProject, service: &str, args: &[String]) -> Result<CommandOutput, StackError> {
        let spec = self
            .compose(project, &["exec", "-T", service])?
            .args(args.iter().cloned());
        self.runner.run(&spec)
    }

    fn name(&self) -> &str {
        "docker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::MockRunner;
    use std::fs;
    use tempfile::tempdir;

    fn project() -> ComposeProject {
        ComposeProject::new("/opt/jm", "docker-compose.yml", "jitsi")
    }

    #[test]
    fn present_runtime_is_not_reinstalled() {
        let runner = MockRunner::new();
        let runtime = DockerRuntime::new(&runner).with_program_lookup(|_| true);

        assert_eq!(runtime.ensure_runtime().unwrap(), RuntimeStatus::AlreadyPresent);
        assert!(!runner.ran("apt-get"));
        assert!(!runner.ran("systemctl enable"));
        assert!(runner.ran("docker compose version"));
    }

    #[test]
    fn missing_runtime_installs_from_vendor_repo() {
        let dir = tempdir().unwrap();
        let os_release = dir.path().join("os-release");
        fs::write(&os_release, "ID=debian\nVERSION_CODENAME=bookworm\n").unwrap();

        let runner = MockRunner::new()
            .fail("docker --version")
            .fail("systemctl is-active");
        let runtime = DockerRuntime::new(&runner)
            .with_os_release(&os_release)
            .with_program_lookup(|p| p == "apt-get");

        assert_eq!(
            runtime.ensure_runtime().unwrap(),
            RuntimeStatus::Installed(PackageManager::Apt)
        );
        assert!(runner.ran("curl -fsSL https://download.docker.com/linux/debian/gpg"));
        assert!(runner.ran("apt-get install -y docker-ce"));
        assert!(runner.ran("systemctl enable --now docker"));
    }

    #[test]
    fn no_package_manager_is_fatal() {
        let runner = MockRunner::new().fail("docker --version");
        let runtime = DockerRuntime::new(&runner).with_program_lookup(|_| false);
        assert!(matches!(
            runtime.ensure_runtime(),
            Err(StackError::UnsupportedPackageManager)
        ));
    }

    #[test]
    fn failed_install_step_aborts() {
        let dir = tempdir().unwrap();
        let os_release = dir.path().join("os-release");
        fs::write(&os_release, "ID=fedora\n").unwrap();
        let runner = MockRunner::new()
            .fail("docker --version")
            .fail("dnf -y install docker-ce");
        let runtime = DockerRuntime::new(&runner)
            .with_os_release(&os_release)
            .with_program_lookup(|p| p == "dnf");

        assert!(matches!(
            runtime.ensure_runtime(),
            Err(StackError::CommandFailed { .. })
        ));
        assert!(!runner.ran("systemctl"));
    }

    #[test]
    fn standalone_compose_is_used_when_plugin_missing() {
        let runner = MockRunner::new().fail("docker compose");
        let runtime = DockerRuntime::new(&runner);
        runtime.start(&project()).unwrap();
        assert!(runner.ran(
            "docker-compose -f /opt/jm/docker-compose.yml -p jitsi up -d --force-recreate --remove-orphans"
        ));
    }

    #[test]
    fn no_compose_at_all_is_an_error() {
        let runner = MockRunner::new().fail("docker compose").fail("docker-compose");
        let runtime = DockerRuntime::new(&runner);
        assert!(matches!(runtime.pull(&project()), Err(StackError::ComposeUnavailable)));
    }

    #[test]
    fn pull_failure_propagates() {
        let runner = MockRunner::new().fail("docker compose -f /opt/jm/docker-compose.yml -p jitsi pull");
        let runtime = DockerRuntime::new(&runner);
        assert!(runtime.pull(&project()).is_err());
    }

    #[test]
    fn purge_removes_images_and_volumes() {
        let runner = MockRunner::new();
        let runtime = DockerRuntime::new(&runner);
        runtime.stop(&project(), true).unwrap();
        assert!(runner.ran(
            "docker compose -f /opt/jm/docker-compose.yml -p jitsi down --remove-orphans --rmi all --volumes"
        ));
    }

    #[test]
    fn running_probe_reads_ps_output() {
        let runner = MockRunner::new().respond(
            "docker compose -f /opt/jm/docker-compose.yml -p jitsi ps",
            CommandOutput::ok("3f2a9c\n"),
        );
        let runtime = DockerRuntime::new(&runner);
        assert!(runtime.service_running(&project(), "prosody").unwrap());

        let idle = MockRunner::new();
        let runtime = DockerRuntime::new(&idle);
        assert!(!runtime.service_running(&project(), "prosody").unwrap());
    }

    #[test]
    fn exec_runs_without_tty_in_service() {
        let runner = MockRunner::new();
        let runtime = DockerRuntime::new(&runner);
        runtime
            .exec(&project(), "prosody", &["prosodyctl".to_string(), "about".to_string()])
            .unwrap();
        assert!(runner.ran("docker compose -f /opt/jm/docker-compose.yml -p jitsi exec -T prosody prosodyctl about"));
    }
}
