// layout.rs — File locations inside an installation directory.

use std::path::{Path, PathBuf};

use jmp_stack::ComposeProject;

use crate::config::ProvisionConfig;

pub const ENV_FILE: &str = ".env";
pub const LOCK_FILE: &str = ".provision.lock";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    pub root: PathBuf,
    pub env_file: PathBuf,
    pub compose_file: PathBuf,
    pub credentials_file: PathBuf,
    pub lock_file: PathBuf,
    project_name: String,
    compose_name: String,
}

impl InstallLayout {
    pub fn new(root: impl AsRef<Path>, config: &ProvisionConfig) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            env_file: root.join(ENV_FILE),
            compose_file: root.join(&config.stack.compose_file),
            credentials_file: root.join(&config.admin.credentials_file),
            lock_file: root.join(LOCK_FILE),
            project_name: config.stack.project_name.clone(),
            compose_name: config.stack.compose_file.clone(),
            root,
        }
    }

    /// Layout for `config.install_dir`.
    pub fn from_config(config: &ProvisionConfig) -> Self {
        Self::new(&config.install_dir, config)
    }

    pub fn project(&self) -> ComposeProject {
        ComposeProject::new(&self.root, &self.compose_name, self.project_name.clone())
    }
}
