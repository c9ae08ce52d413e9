//! Tool configuration from /etc/jitsi-meet-provision.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use jmp_stack::ReadinessPolicy;
use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/jitsi-meet-provision.toml";

/// Top-level tool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Installation directory holding `.env`, the compose file and `config/`.
    #[serde(default = "default_install_dir")]
    pub install_dir: PathBuf,

    #[serde(default)]
    pub stack: StackConfig,

    #[serde(default)]
    pub readiness: ReadinessConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            install_dir: default_install_dir(),
            stack: StackConfig::default(),
            readiness: ReadinessConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

/// Compose project settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Compose project name (`-p`)
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Stack definition file name inside the install directory
    #[serde(default = "default_compose_file")]
    pub compose_file: String,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            compose_file: default_compose_file(),
        }
    }
}

/// XMPP readiness polling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessConfig {
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            interval_secs: default_interval_secs(),
            deadline_secs: default_deadline_secs(),
        }
    }
}

impl ReadinessConfig {
    pub fn policy(&self) -> ReadinessPolicy {
        ReadinessPolicy {
            attempts: self.attempts,
            interval: Duration::from_secs(self.interval_secs),
            deadline: Duration::from_secs(self.deadline_secs),
        }
    }
}

/// Administrator credential record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Relative paths are resolved against the install directory.
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            credentials_file: default_credentials_file(),
        }
    }
}

// Serde default functions
fn default_install_dir() -> PathBuf {
    PathBuf::from("/opt/jitsi-meet")
}

fn default_project_name() -> String {
    "jitsi".to_string()
}

fn default_compose_file() -> String {
    "docker-compose.yml".to_string()
}

fn default_attempts() -> u32 {
    30
}

fn default_interval_secs() -> u64 {
    2
}

fn default_deadline_secs() -> u64 {
    120
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from(".admin-credentials")
}

impl ProvisionConfig {
    /// Load and parse the file at `path`; a missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ReconcileError> {
        let content = std::fs::read_to_string(path).map_err(|e| ReconcileError::ToolConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ReconcileError::ToolConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    /// A file that exists and does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ReconcileError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no tool configuration, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_default_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = ProvisionConfig::load_or_default(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config, ProvisionConfig::default());
        assert_eq!(config.install_dir, PathBuf::from("/opt/jitsi-meet"));
        assert_eq!(config.readiness.policy(), ReadinessPolicy::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("provision.toml");
        std::fs::write(
            &path,
            "install_dir = \"/srv/meet\"\n\n[readiness]\nattempts = 5\n",
        )
        .unwrap();

        let config = ProvisionConfig::load(&path).unwrap();
        assert_eq!(config.install_dir, PathBuf::from("/srv/meet"));
        assert_eq!(config.readiness.attempts, 5);
        assert_eq!(config.readiness.interval_secs, 2);
        assert_eq!(config.stack.project_name, "jitsi");
    }

    #[test]
    fn malformed_or_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        assert!(matches!(
            ProvisionConfig::load(&path),
            Err(ReconcileError::ToolConfig { .. })
        ));

        std::fs::write(&path, "install_dir = [").unwrap();
        assert!(ProvisionConfig::load_or_default(&path).is_err());
    }
}
