// overrides.rs — Environment overrides for the current run.
//
// Only recognised setting keys (plus ADMIN_PASS) are captured, so unrelated
// variables in the caller's environment never leak into the .env file.

use std::collections::BTreeMap;

use crate::settings::{is_known_key, ADMIN_PASS};

/// Immutable snapshot of the overrides supplied for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    values: BTreeMap<String, String>,
}

impl Overrides {
    /// Capture recognised keys from the process environment.
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// Capture recognised keys from arbitrary pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k == ADMIN_PASS || is_known_key(k))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Administrator password supplied for this run, if any (empty counts as
    /// not supplied).
    pub fn admin_password(&self) -> Option<&str> {
        self.get(ADMIN_PASS).filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_are_dropped() {
        let o = Overrides::from_pairs([
            ("PUBLIC_URL", "https://meet.example.com"),
            ("HOME", "/root"),
            ("PATH", "/usr/bin"),
        ]);
        assert_eq!(o.get("PUBLIC_URL"), Some("https://meet.example.com"));
        assert_eq!(o.get("HOME"), None);
        assert_eq!(o.get("PATH"), None);
    }

    #[test]
    fn admin_password_is_captured_but_empty_is_ignored() {
        let o = Overrides::from_pairs([("ADMIN_PASS", "s3cret")]);
        assert_eq!(o.admin_password(), Some("s3cret"));

        let o = Overrides::from_pairs([("ADMIN_PASS", "")]);
        assert_eq!(o.admin_password(), None);
    }
}
