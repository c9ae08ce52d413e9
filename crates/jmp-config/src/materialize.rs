// materialize.rs — First-run creation of the persisted .env file.
//
// A fresh file is written wholesale from the resolved settings. An existing
// file is never rewritten here; later steps only append to it or fill empty
// secrets.

use std::path::Path;

use chrono::Utc;

use crate::envfile::{EnvFile, EnvLine};
use crate::error::ConfigError;
use crate::settings::Settings;

/// Outcome of [`materialize`], carrying the file as it now exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    Created(EnvFile),
    Preserved(EnvFile),
}

impl Materialized {
    pub fn file(&self) -> &EnvFile {
        match self {
            Materialized::Created(f) | Materialized::Preserved(f) => f,
        }
    }

    pub fn into_file(self) -> EnvFile {
        match self {
            Materialized::Created(f) | Materialized::Preserved(f) => f,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Materialized::Created(_))
    }
}

/// Render a fresh .env document for `settings`.
pub fn render_fresh(settings: &Settings) -> EnvFile {
    let header = [
        "# Jitsi Meet deployment settings".to_string(),
        format!(
            "# Generated by jitsi-meet-provision on {}.",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ),
        "#".to_string(),
        "# Values in this file are kept across re-runs. New settings are appended".to_string(),
        "# at the end and empty component passwords are generated automatically.".to_string(),
    ];

    let mut lines: Vec<EnvLine> = header.into_iter().map(EnvLine::Verbatim).collect();
    for section in settings.sections() {
        lines.push(EnvLine::Verbatim(String::new()));
        lines.push(EnvLine::Verbatim(format!("# {}", section.title)));
        for (key, value) in &section.entries {
            lines.push(EnvLine::entry(key, value));
        }
    }
    EnvFile::from_lines(lines)
}

/// Write `path` from `settings` if it does not exist, else load and keep it.
pub fn materialize(path: impl AsRef<Path>, settings: &Settings) -> Result<Materialized, ConfigError> {
    let path = path.as_ref();
    if let Some(existing) = EnvFile::load(path)? {
        tracing::info!(path = %path.display(), "existing configuration preserved");
        return Ok(Materialized::Preserved(existing));
    }

    let fresh = render_fresh(settings);
    fresh.save(path)?;
    tracing::info!(path = %path.display(), "configuration written");
    Ok(Materialized::Created(fresh))
}
