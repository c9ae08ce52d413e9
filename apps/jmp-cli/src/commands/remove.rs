// remove.rs — Tear down the deployment and delete the installation.

use anyhow::Context;
use jmp_reconcile::{run_remove, InstallLayout};
use jmp_stack::{DockerRuntime, SystemRunner};

pub fn execute(layout: &InstallLayout) -> anyhow::Result<()> {
    let runtime = DockerRuntime::new(SystemRunner::new());

    println!("Removing Jitsi Meet from {}", layout.root.display());
    let report = run_remove(layout, &runtime).context("removal failed")?;

    if !report.stack_stopped {
        println!("No stack definition found; no containers were stopped.");
    }
    println!("Removed {}", report.root.display());
    Ok(())
}
