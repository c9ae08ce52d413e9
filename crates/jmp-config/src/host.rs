// host.rs — Host facts used to derive defaults (FQDN, timezone).

use std::fs;
use std::path::Path;

/// Facts about the host the stack is installed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFacts {
    /// Fully qualified where the host knows its domain, else the short name.
    pub hostname: String,
    pub timezone: String,
}

impl HostFacts {
    /// Inspect the running host.
    pub fn detect() -> Self {
        Self::detect_in(Path::new("/"))
    }

    /// Inspect a host whose filesystem is rooted at `root`.
    pub fn detect_in(root: &Path) -> Self {
        let hostname = read_hostname(root).unwrap_or_else(|| "localhost".to_string());
        let timezone = read_timezone(root).unwrap_or_else(|| "UTC".to_string());
        tracing::debug!(%hostname, %timezone, "detected host facts");
        Self { hostname, timezone }
    }
}

fn first_line(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let line = content.lines().next()?.trim();
    (!line.is_empty()).then(|| line.to_string())
}

fn read_hostname(root: &Path) -> Option<String> {
    let name = first_line(&root.join("etc/hostname"))
        .or_else(|| first_line(&root.join("proc/sys/kernel/hostname")))?;
    if name.contains('.') {
        return Some(name);
    }
    Some(qualify_from_hosts(root, &name).unwrap_or(name))
}

/// Canonical dotted name of the /etc/hosts line that lists `short`.
fn qualify_from_hosts(root: &Path, short: &str) -> Option<String> {
    let hosts = fs::read_to_string(root.join("etc/hosts")).ok()?;
    hosts.lines().find_map(|line| {
        let line = line.split('#').next().unwrap_or_default();
        let mut fields = line.split_whitespace();
        let _address = fields.next()?;
        let names: Vec<&str> = fields.collect();
        if !names.contains(&short) {
            return None;
        }
        names
            .iter()
            .find(|n| n.contains('.') && n.split('.').next() == Some(short))
            .map(|n| n.to_string())
    })
}

fn read_timezone(root: &Path) -> Option<String> {
    if let Some(tz) = first_line(&root.join("etc/timezone")) {
        return Some(tz);
    }
    // /etc/localtime -> /usr/share/zoneinfo/Region/City
    let target = fs::read_link(root.join("etc/localtime")).ok()?;
    let target = target.to_string_lossy();
    let (_, zone) = target.split_once("zoneinfo/")?;
    (!zone.is_empty()).then(|| zone.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_hostname_and_timezone_files() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("etc")).unwrap();
        fs::write(root.path().join("etc/hostname"), "meet.example.com\n").unwrap();
        fs::write(root.path().join("etc/timezone"), "Europe/Paris\n").unwrap();

        let facts = HostFacts::detect_in(root.path());
        assert_eq!(facts.hostname, "meet.example.com");
        assert_eq!(facts.timezone, "Europe/Paris");
    }

    #[cfg(unix)]
    #[test]
    fn timezone_from_localtime_symlink() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("etc")).unwrap();
        std::os::unix::fs::symlink(
            "/usr/share/zoneinfo/America/New_York",
            root.path().join("etc/localtime"),
        )
        .unwrap();

        let facts = HostFacts::detect_in(root.path());
        assert_eq!(facts.timezone, "America/New_York");
    }

    #[test]
    fn short_hostname_is_qualified_from_hosts_file() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("etc")).unwrap();
        fs::write(root.path().join("etc/hostname"), "meet\n").unwrap();
        fs::write(
            root.path().join("etc/hosts"),
            "127.0.0.1\tlocalhost\n# comment meet.wrong.org\n127.0.1.1\tmeet.example.org meet\n",
        )
        .unwrap();

        assert_eq!(HostFacts::detect_in(root.path()).hostname, "meet.example.org");
    }

    #[test]
    fn short_hostname_kept_without_hosts_entry() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("etc")).unwrap();
        fs::write(root.path().join("etc/hostname"), "meet\n").unwrap();
        fs::write(root.path().join("etc/hosts"), "127.0.0.1 localhost\n").unwrap();

        assert_eq!(HostFacts::detect_in(root.path()).hostname, "meet");
    }

    #[test]
    fn falls_back_when_nothing_is_readable() {
        let root = tempdir().unwrap();
        let facts = HostFacts::detect_in(root.path());
        assert_eq!(facts.hostname, "localhost");
        assert_eq!(facts.timezone, "UTC");
    }
}
