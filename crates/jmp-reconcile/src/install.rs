//! The install / update pipeline.
//!
//! Every step runs to completion before the next. Steps whose failure would
//! leave the installation inconsistent (runtime install, file writes, stack
//! start) abort the run; the recording agent's kernel module, the readiness
//! wait and the admin account only produce warnings.

use std::fs;
use std::path::PathBuf;

use jmp_config::{
    append_missing_keys, fill_empty_secrets, generate_secret, materialize, EnvFile, HostFacts,
    Overrides, SettingLayers, Settings,
};
use jmp_identity::{
    provision_admin, resolve_admin_password, Account, AdminCredentials, AdminOutcome,
    IdentityStore, PasswordSource,
};
use jmp_stack::compose::XMPP_SERVICE;
use jmp_stack::{
    prepare_config_dirs, wait_for_ready, write_stack, ComposeFile, ContainerRuntime, HostOps,
    Readiness, RuntimeStatus, ServiceProbe, StackWrite, RECORDER_SOUND_MODULE,
};

use crate::config::ProvisionConfig;
use crate::error::ReconcileError;
use crate::layout::InstallLayout;
use crate::lock::RunLock;

/// External systems an install talks to.
pub struct Collaborators<'a> {
    pub runtime: &'a dyn ContainerRuntime,
    pub host: &'a dyn HostOps,
    pub identity: &'a dyn IdentityStore,
}

/// What happened to the admin account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminReport {
    pub username: String,
    pub domain: String,
    pub password_source: PasswordSource,
    pub outcome: AdminOutcome,
    pub credentials_file: PathBuf,
}

/// Summary of one install run.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallReport {
    pub runtime: RuntimeStatus,
    pub public_url: String,
    pub env_created: bool,
    pub appended_keys: Vec<String>,
    pub filled_secrets: Vec<String>,
    pub recorder_enabled: bool,
    pub stack: StackWrite,
    pub readiness: Readiness,
    pub admin: AdminReport,
    /// Recovered problems, in the order they happened.
    pub warnings: Vec<String>,
}

/// Install or update the deployment in `layout.root`.
pub fn run_install(
    layout: &InstallLayout,
    config: &ProvisionConfig,
    overrides: &Overrides,
    host_facts: &HostFacts,
    collaborators: &Collaborators<'_>,
) -> Result<InstallReport, ReconcileError> {
    // Validate before anything on the host changes.
    resolve_desired(layout, overrides, host_facts)?;

    fs::create_dir_all(&layout.root).map_err(|source| ReconcileError::io(&layout.root, source))?;
    let _lock = RunLock::acquire(&layout.lock_file)?;
    let mut warnings = Vec::new();

    let runtime = collaborators.runtime.ensure_runtime()?;

    // Persisted configuration, re-read under the lock
    let desired = resolve_desired(layout, overrides, host_facts)?;

    let materialized = materialize(&layout.env_file, &desired)?;
    let env_created = materialized.was_created();
    let keys = append_missing_keys(&layout.env_file, materialized.file(), &desired.entries())?;
    let secrets = fill_empty_secrets(
        &layout.env_file,
        &keys.file,
        &desired.required_secret_keys(),
        generate_secret,
    )?;

    let settings = Settings::resolve(
        &SettingLayers::new(overrides, Some(&secrets.file)),
        host_facts,
        &layout.root,
    )?;

    // Stack definition
    let recorder_enabled = settings.features.jibri;
    if recorder_enabled {
        if let Err(e) = collaborators.host.load_kernel_module(RECORDER_SOUND_MODULE) {
            tracing::warn!(module = RECORDER_SOUND_MODULE, error = %e, "kernel module not loaded, recording may not work");
            warnings.push(format!("kernel module {} not loaded: {}", RECORDER_SOUND_MODULE, e));
        }
    }

    prepare_config_dirs(&layout.root.join(&settings.config_dir), recorder_enabled)?;
    let stack = write_stack(&layout.compose_file, &ComposeFile::for_settings(&settings))?;

    // Containers
    let project = layout.project();
    collaborators.runtime.pull(&project)?;
    collaborators.runtime.start(&project)?;

    let probe = ServiceProbe::new(collaborators.runtime, &project, XMPP_SERVICE);
    let readiness = wait_for_ready(&probe, &config.readiness.policy());
    match &readiness {
        Readiness::Ready { .. } => {}
        Readiness::TimedOut { attempts } => {
            tracing::warn!(attempts, "XMPP server not confirmed ready, provisioning admin anyway");
            warnings.push(format!("XMPP server not confirmed ready after {} attempts", attempts));
        }
        Readiness::Error(message) => {
            tracing::warn!(error = %message, "readiness probe failed, provisioning admin anyway");
            warnings.push(format!("readiness probe failed: {}", message));
        }
    }

    // Admin account
    let admin = reconcile_admin(layout, overrides, &settings, collaborators.identity, &mut warnings)?;

    Ok(InstallReport {
        runtime,
        public_url: settings.public_url.clone(),
        env_created,
        appended_keys: keys.appended,
        filled_secrets: secrets.filled,
        recorder_enabled,
        stack,
        readiness,
        admin,
        warnings,
    })
}

fn resolve_desired(
    layout: &InstallLayout,
    overrides: &Overrides,
    host_facts: &HostFacts,
) -> Result<Settings, ReconcileError> {
    let persisted = EnvFile::load(&layout.env_file)?;
    let settings = Settings::resolve(
        &SettingLayers::new(overrides, persisted.as_ref()),
        host_facts,
        &layout.root,
    )?;
    Ok(settings)
}

fn reconcile_admin(
    layout: &InstallLayout,
    overrides: &Overrides,
    settings: &Settings,
    identity: &dyn IdentityStore,
    warnings: &mut Vec<String>,
) -> Result<AdminReport, ReconcileError> {
    let username = settings.auth.admin_user.clone();
    let record = match AdminCredentials::load(&layout.credentials_file) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(error = %e, "credential record unreadable, treating it as absent");
            warnings.push(format!("credential record unreadable: {}", e));
            None
        }
    };

    let (password, password_source) = resolve_admin_password(
        overrides.admin_password(),
        record.as_ref(),
        &username,
        generate_secret,
    );
    tracing::info!(user = %username, source = ?password_source, "admin password resolved");

    let account = Account::new(username.clone(), settings.signup_domain(), password.clone());
    let outcome = provision_admin(identity, &account);
    if let AdminOutcome::Failed(message) = &outcome {
        warnings.push(format!("admin account {} not provisioned: {}", account.jid(), message));
    }

    AdminCredentials::new(username.clone(), password).save(&layout.credentials_file)?;

    Ok(AdminReport {
        username,
        domain: account.domain.clone(),
        password_source,
        outcome,
        credentials_file: layout.credentials_file.clone(),
    })
}
