// install.rs — Install or converge the deployment and print a summary.

use anyhow::Context;
use jmp_config::{HostFacts, Overrides};
use jmp_identity::{AdminOutcome, PasswordSource, ProsodyIdentity};
use jmp_reconcile::{run_install, Collaborators, InstallLayout, InstallReport, ProvisionConfig};
use jmp_stack::{DockerRuntime, Readiness, RuntimeStatus, SystemHost, SystemRunner};

pub fn execute(layout: &InstallLayout, config: &ProvisionConfig) -> anyhow::Result<()> {
    let runtime = DockerRuntime::new(SystemRunner::new());
    let host = SystemHost::new(SystemRunner::new());
    let project = layout.project();
    let identity = ProsodyIdentity::new(&runtime, &project);

    let overrides = Overrides::from_env();
    let host_facts = HostFacts::detect();

    println!("Provisioning Jitsi Meet in {}", layout.root.display());
    let report = run_install(
        layout,
        config,
        &overrides,
        &host_facts,
        &Collaborators {
            runtime: &runtime,
            host: &host,
            identity: &identity,
        },
    )
    .context("installation failed")?;

    print_summary(layout, &report);
    Ok(())
}

fn print_summary(layout: &InstallLayout, report: &InstallReport) {
    println!();
    match report.runtime {
        RuntimeStatus::AlreadyPresent => println!("Docker:        already installed"),
        RuntimeStatus::Installed(pm) => println!("Docker:        installed with {}", pm.binary()),
    }
    if report.env_created {
        println!("Configuration: created {}", layout.env_file.display());
    } else {
        println!("Configuration: kept {}", layout.env_file.display());
    }
    if !report.appended_keys.is_empty() {
        println!("  new settings: {}", report.appended_keys.join(", "));
    }
    if !report.filled_secrets.is_empty() {
        println!("  generated:    {}", report.filled_secrets.join(", "));
    }
    println!("Stack:         {}", report.stack.path.display());
    if let Some(archived) = &report.stack.archived {
        println!("  previous:     {}", archived.display());
    }
    if report.recorder_enabled {
        println!("  recording agent enabled");
    }
    match &report.readiness {
        Readiness::Ready { attempts } => println!("XMPP server:   ready ({} checks)", attempts),
        Readiness::TimedOut { .. } => println!("XMPP server:   not confirmed ready"),
        Readiness::Error(_) => println!("XMPP server:   readiness unknown"),
    }

    let admin = &report.admin;
    let action = match &admin.outcome {
        AdminOutcome::PasswordUpdated => "password set",
        AdminOutcome::Registered => "registered",
        AdminOutcome::Failed(_) => "NOT provisioned",
    };
    let source = match admin.password_source {
        PasswordSource::Override => "from ADMIN_PASS",
        PasswordSource::Recorded => "reused",
        PasswordSource::Generated => "generated",
    };
    println!(
        "Admin:         {}@{} {} (password {}, stored in {})",
        admin.username,
        admin.domain,
        action,
        source,
        admin.credentials_file.display()
    );

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }

    println!();
    println!("Jitsi Meet is available at {}", report.public_url);
}
