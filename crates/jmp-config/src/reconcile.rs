// reconcile.rs — Idempotent upgrades of an existing .env file.
//
// Two operations, both safe to repeat:
// - append_missing_keys: add `KEY=default` for keys the file lacks. Existing
//   lines are never modified or reordered.
// - fill_empty_secrets: replace empty secret values with generated ones,
//   rewriting only those lines.

use std::path::Path;

use crate::envfile::{append_lines, EnvFile, EnvLine};
use crate::error::ConfigError;

/// Result of [`append_missing_keys`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyReconcile {
    pub file: EnvFile,
    pub appended: Vec<String>,
}

/// Result of [`fill_empty_secrets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretFill {
    pub file: EnvFile,
    pub filled: Vec<String>,
}

/// Entries from `defaults` whose keys are absent from `current`, in order.
pub fn missing_entries(current: &EnvFile, defaults: &[(&str, String)]) -> Vec<EnvLine> {
    let mut seen: Vec<&str> = Vec::new();
    defaults
        .iter()
        .filter(|(key, _)| {
            let fresh = !current.contains_key(key) && !seen.contains(key);
            seen.push(*key);
            fresh
        })
        .map(|(key, value)| EnvLine::entry(key, value))
        .collect()
}

/// Append every missing key to the file at `path`.
pub fn append_missing_keys(
    path: impl AsRef<Path>,
    current: &EnvFile,
    defaults: &[(&str, String)],
) -> Result<KeyReconcile, ConfigError> {
    let missing = missing_entries(current, defaults);
    let appended: Vec<String> = missing
        .iter()
        .filter_map(|line| match line {
            EnvLine::Entry { key, .. } => Some(key.clone()),
            EnvLine::Verbatim(_) => None,
        })
        .collect();

    if missing.is_empty() {
        return Ok(KeyReconcile {
            file: current.clone(),
            appended,
        });
    }

    append_lines(path.as_ref(), &missing)?;
    for key in &appended {
        tracing::info!(%key, "appended new setting");
    }
    Ok(KeyReconcile {
        file: current.with_appended(missing),
        appended,
    })
}

/// Generate a value for each of `keys` that is present but empty in
/// `current`, then save the file if anything changed.
pub fn fill_empty_secrets(
    path: impl AsRef<Path>,
    current: &EnvFile,
    keys: &[&str],
    mut generate: impl FnMut() -> String,
) -> Result<SecretFill, ConfigError> {
    let mut file = current.clone();
    let mut filled = Vec::new();

    for key in keys {
        if file.get(key) != Some("") {
            continue;
        }
        if let Some(updated) = file.with_value(key, &generate()) {
            file = updated;
            filled.push(key.to_string());
        }
    }

    if !filled.is_empty() {
        file.save(path.as_ref())?;
        for key in &filled {
            tracing::info!(%key, "generated component password");
        }
    }
    Ok(SecretFill { file, filled })
}
