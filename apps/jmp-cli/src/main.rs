//! # jitsi-meet-provision
//!
//! Installs, updates and removes a docker-based Jitsi Meet deployment.
//!
//! - `jitsi-meet-provision` — install or converge an existing installation
//! - `jitsi-meet-provision --remove` — tear everything down
//!
//! Deployment settings come from environment variables (`PUBLIC_URL`,
//! `ENABLE_AUTH`, `ADMIN_PASS`, ...); see the generated `.env` for the full
//! list.

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use jmp_reconcile::config::DEFAULT_CONFIG_PATH;
use jmp_reconcile::{InstallLayout, ProvisionConfig};
use jmp_stack::{detect_elevation, Elevation};
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("JMP_GIT_HASH"),
    " ",
    env!("JMP_BUILD_DATE"),
    ")"
);

const LOG_TARGETS: &[&str] = &["jmp_reconcile", "jmp_stack", "jmp_identity", "jmp_config", "jitsi_meet_provision"];

/// Provision a Jitsi Meet deployment on this host.
#[derive(Parser)]
#[command(name = "jitsi-meet-provision", version = VERSION, about)]
struct Cli {
    /// Stop the stack, delete its images and volumes, and remove the
    /// installation directory.
    #[arg(long)]
    remove: bool,

    /// Tool configuration file (defaults to /etc/jitsi-meet-provision.toml
    /// when it exists).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Installation directory.
    #[arg(long, env = "INSTALL_DIR", value_name = "DIR")]
    install_dir: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    if detect_elevation()? == Elevation::Sudo {
        return reexec_with_sudo();
    }

    let config = load_config(cli.config.as_deref(), cli.install_dir)?;
    let layout = InstallLayout::from_config(&config);

    if cli.remove {
        commands::remove::execute(&layout)
    } else {
        commands::install::execute(&layout, &config)
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let level = if verbose { "debug" } else { "info" };
            let mut filter = EnvFilter::new("warn");
            for target in LOG_TARGETS {
                filter = filter.add_directive(format!("{}={}", target, level).parse()?);
            }
            filter
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
    Ok(())
}

/// Tool configuration: an explicit `--config` must exist; the default path
/// is optional. `--install-dir` / `INSTALL_DIR` wins over the file.
fn load_config(path: Option<&Path>, install_dir: Option<PathBuf>) -> anyhow::Result<ProvisionConfig> {
    let mut config = match path {
        Some(path) => ProvisionConfig::load(path)?,
        None => ProvisionConfig::load_or_default(Path::new(DEFAULT_CONFIG_PATH))?,
    };
    if let Some(dir) = install_dir {
        config.install_dir = dir;
    }
    Ok(config)
}

/// Run this same invocation again as root, keeping the environment so the
/// deployment settings survive.
fn reexec_with_sudo() -> anyhow::Result<()> {
    let exe = std::env::current_exe().context("cannot locate own executable")?;
    tracing::info!("not running as root, re-executing through sudo");
    let status = std::process::Command::new("sudo")
        .arg("--preserve-env")
        .arg(exe)
        .args(std::env::args_os().skip(1))
        .status()
        .context("failed to run sudo")?;
    std::process::exit(status.code().unwrap_or(1));
}
