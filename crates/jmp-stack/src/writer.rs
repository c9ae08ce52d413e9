// writer.rs — Write the stack definition, archiving the previous one.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::compose::ComposeFile;
use crate::error::StackError;

/// Where the new definition went and where the old one was archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackWrite {
    pub path: PathBuf,
    pub archived: Option<PathBuf>,
}

/// Archive any existing file at `path`, then write `compose` there.
pub fn write_stack(path: &Path, compose: &ComposeFile) -> Result<StackWrite, StackError> {
    write_stack_at(path, compose, Local::now())
}

pub(crate) fn write_stack_at(
    path: &Path,
    compose: &ComposeFile,
    now: DateTime<Local>,
) -> Result<StackWrite, StackError> {
    let yaml = compose.to_yaml()?;
    let tmp = path.with_extension("yml.tmp");
    fs::write(&tmp, yaml).map_err(|source| StackError::io(&tmp, source))?;

    let archived = if path.exists() {
        let target = archive_path(path, now);
        fs::rename(path, &target).map_err(|source| StackError::io(path, source))?;
        tracing::info!(archive = %target.display(), "previous stack definition archived");
        Some(target)
    } else {
        None
    };

    fs::rename(&tmp, path).map_err(|source| StackError::io(path, source))?;
    tracing::info!(path = %path.display(), services = compose.services.len(), "stack definition written");

    Ok(StackWrite {
        path: path.to_path_buf(),
        archived,
    })
}

/// `<file>.<YYYYMMDDHHMMSS>.bak`, with a counter if that name is taken.
fn archive_path(path: &Path, now: DateTime<Local>) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "docker-compose.yml".to_string());
    let stamp = now.format("%Y%m%d%H%M%S");

    let mut candidate = path.with_file_name(format!("{}.{}.bak", name, stamp));
    let mut counter = 1;
    while candidate.exists() {
        candidate = path.with_file_name(format!("{}.{}-{}.bak", name, stamp, counter));
        counter += 1;
    }
    candidate
}

/// Create the per-service config directories mounted by the stack.
pub fn prepare_config_dirs(config_dir: &Path, with_recorder: bool) -> Result<(), StackError> {
    let mut dirs = vec![
        "web",
        "transcripts",
        "prosody/config",
        "prosody/prosody-plugins-custom",
        "jicofo",
        "jvb",
    ];
    if with_recorder {
        dirs.push("jibri");
    }
    for dir in dirs {
        let path = config_dir.join(dir);
        fs::create_dir_all(&path).map_err(|source| StackError::io(&path, source))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jmp_config::{HostFacts, Overrides, SettingLayers, Settings};
    use tempfile::tempdir;

    fn compose(jibri: bool) -> ComposeFile {
        let flag = if jibri { "1" } else { "0" };
        let overrides = Overrides::from_pairs([("ENABLE_JIBRI", flag)]);
        let host = HostFacts {
            hostname: "h".into(),
            timezone: "UTC".into(),
        };
        let s = Settings::resolve(&SettingLayers::new(&overrides, None), &host, Path::new("/opt/jm")).unwrap();
        ComposeFile::for_settings(&s)
    }

    #[test]
    fn first_write_has_nothing_to_archive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docker-compose.yml");
        let result = write_stack(&path, &compose(false)).unwrap();
        assert!(result.archived.is_none());
        assert!(path.exists());
        assert!(!dir.path().join("docker-compose.yml.tmp").exists());
    }

    #[test]
    fn rewrite_archives_previous_with_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docker-compose.yml");
        fs::write(&path, "old: true\n").unwrap();

        let now = Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let result = write_stack_at(&path, &compose(true), now).unwrap();

        let archived = result.archived.unwrap();
        assert_eq!(
            archived.file_name().unwrap().to_str().unwrap(),
            "docker-compose.yml.20260304050607.bak"
        );
        assert_eq!(fs::read_to_string(&archived).unwrap(), "old: true\n");
        assert!(fs::read_to_string(&path).unwrap().contains("jitsi/jibri"));
    }

    #[test]
    fn same_second_archives_do_not_collide() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docker-compose.yml");
        let now = Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();

        fs::write(&path, "v1\n").unwrap();
        let first = write_stack_at(&path, &compose(false), now).unwrap().archived.unwrap();
        let second = write_stack_at(&path, &compose(false), now).unwrap().archived.unwrap();
        assert_ne!(first, second);
        assert_eq!(fs::read_to_string(first).unwrap(), "v1\n");
    }

    #[test]
    fn failed_write_keeps_previous_definition() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docker-compose.yml");
        fs::write(&path, "old: true\n").unwrap();
        // A directory where the temp file should go makes the write fail.
        fs::create_dir(dir.path().join("docker-compose.yml.tmp")).unwrap();

        assert!(write_stack(&path, &compose(false)).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old: true\n");
        let archives = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".bak"))
            .count();
        assert_eq!(archives, 0);
    }

    #[test]
    fn config_dirs_include_recorder_only_when_enabled() {
        let dir = tempdir().unwrap();
        prepare_config_dirs(dir.path(), false).unwrap();
        assert!(dir.path().join("prosody/config").is_dir());
        assert!(!dir.path().join("jibri").exists());

        prepare_config_dirs(dir.path(), true).unwrap();
        assert!(dir.path().join("jibri").is_dir());
    }
}
