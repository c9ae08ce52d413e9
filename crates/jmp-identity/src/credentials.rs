// credentials.rs — The administrator credential record and password choice.
//
// The record lives next to the installation, outside `.env`, readable only by
// its owner. It is the memory that lets a re-run keep the admin password the
// operator already knows.

use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use jmp_config::envfile::{quote_value, EnvFile};

use crate::error::IdentityError;

const KEY_USER: &str = "ADMIN_USER";
const KEY_PASS: &str = "ADMIN_PASS";
const KEY_UPDATED: &str = "UPDATED_AT";

/// Saved administrator username and password.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
    /// `None` if the record carries no readable timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl AdminCredentials {
    /// A record stamped with the current time.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            updated_at: Some(Utc::now()),
        }
    }

    /// Load the record at `path`. Returns `Ok(None)` when there is no file or
    /// it lacks a username or password.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, IdentityError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(IdentityError::io(path, source)),
        };

        let env = EnvFile::parse(&content);
        let (Some(username), Some(password)) = (
            env.get(KEY_USER).filter(|v| !v.is_empty()),
            env.get(KEY_PASS).filter(|v| !v.is_empty()),
        ) else {
            tracing::warn!(path = %path.display(), "credential record incomplete, ignoring it");
            return Ok(None);
        };

        let updated_at = env
            .get(KEY_UPDATED)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|t| t.with_timezone(&Utc));

        Ok(Some(Self {
            username: username.to_string(),
            password: password.to_string(),
            updated_at,
        }))
    }

    pub fn render(&self) -> String {
        let updated = self
            .updated_at
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        format!(
            "{}={}\n{}={}\n{}={}\n",
            KEY_USER,
            quote_value(&self.username),
            KEY_PASS,
            quote_value(&self.password),
            KEY_UPDATED,
            updated
        )
    }

    /// Write the record with owner-only permissions, replacing any previous
    /// one.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), IdentityError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "credentials".to_string());
        let tmp = path.with_file_name(format!("{}.tmp", name));

        write_private(&tmp, self.render().as_bytes())?;
        fs::rename(&tmp, path).map_err(|source| IdentityError::io(path, source))?;
        tracing::debug!(path = %path.display(), "credential record saved");
        Ok(())
    }
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> Result<(), IdentityError> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .map_err(|source| IdentityError::io(path, source))?;
    // An existing file keeps its old mode; force 0600.
    file.set_permissions(fs::Permissions::from_mode(0o600))
        .and_then(|_| file.write_all(bytes))
        .and_then(|_| file.sync_all())
        .map_err(|source| IdentityError::io(path, source))
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> Result<(), IdentityError> {
    fs::write(path, bytes).map_err(|source| IdentityError::io(path, source))
}

/// Where the admin password for this run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordSource {
    Override,
    Recorded,
    Generated,
}

/// Pick the admin password: an explicit override, else the recorded one if
/// the record is for the same user, else a new secret from `generate`.
pub fn resolve_admin_password(
    override_password: Option<&str>,
    record: Option<&AdminCredentials>,
    username: &str,
    generate: impl FnOnce() -> String,
) -> (String, PasswordSource) {
    if let Some(password) = override_password.filter(|p| !p.is_empty()) {
        return (password.to_string(), PasswordSource::Override);
    }
    match record {
        Some(record) if record.username == username => {
            (record.password.clone(), PasswordSource::Recorded)
        }
        Some(record) => {
            tracing::info!(
                recorded = %record.username,
                current = %username,
                "credential record is for another user, generating a new password"
            );
            (generate(), PasswordSource::Generated)
        }
        None => (generate(), PasswordSource::Generated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".admin-credentials");
        let record = AdminCredentials::new("admin", "Ab3 with space");
        record.save(&path).unwrap();

        let loaded = AdminCredentials::load(&path).unwrap().unwrap();
        assert_eq!(loaded.username, "admin");
        assert_eq!(loaded.password, "Ab3 with space");
        assert!(loaded.updated_at.is_some());
        assert!(!dir.path().join(".admin-credentials.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn record_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join(".admin-credentials");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        AdminCredentials::new("admin", "pw").save(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn missing_or_incomplete_record_is_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".admin-credentials");
        assert!(AdminCredentials::load(&path).unwrap().is_none());

        fs::write(&path, "ADMIN_USER=admin\n").unwrap();
        assert!(AdminCredentials::load(&path).unwrap().is_none());
    }

    #[test]
    fn unreadable_timestamp_still_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".admin-credentials");
        fs::write(&path, "ADMIN_USER=admin\nADMIN_PASS=pw\nUPDATED_AT=yesterday\n").unwrap();
        let record = AdminCredentials::load(&path).unwrap().unwrap();
        assert_eq!(record.password, "pw");
        assert!(record.updated_at.is_none());
    }

    #[test]
    fn override_wins() {
        let record = AdminCredentials::new("admin", "recorded");
        let (pw, source) = resolve_admin_password(Some("given"), Some(&record), "admin", || "gen".into());
        assert_eq!((pw.as_str(), source), ("given", PasswordSource::Override));
    }

    #[test]
    fn matching_record_is_reused() {
        let record = AdminCredentials::new("admin", "recorded");
        let (pw, source) = resolve_admin_password(None, Some(&record), "admin", || "gen".into());
        assert_eq!((pw.as_str(), source), ("recorded", PasswordSource::Recorded));
    }

    #[test]
    fn other_user_or_no_record_generates() {
        let record = AdminCredentials::new("root", "recorded");
        let (pw, source) = resolve_admin_password(None, Some(&record), "admin", || "gen".into());
        assert_eq!((pw.as_str(), source), ("gen", PasswordSource::Generated));

        let (_, source) = resolve_admin_password(Some(""), None, "admin", || "gen".into());
        assert_eq!(source, PasswordSource::Generated);
    }
}
