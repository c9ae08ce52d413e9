// envfile.rs — The persisted `.env` file.
//
// The file is an ordered list of lines. Entries (`KEY=VALUE`) are indexed by
// key; comments, blanks, and lines that fail to parse are kept verbatim so a
// rewrite never loses or reorders anything it did not mean to touch.
//
// The first occurrence of a duplicated key wins on read.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// One physical line of an env file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvLine {
    /// A parsed `KEY=VALUE` line. `raw` is the text as it appears on disk.
    Entry {
        key: String,
        value: String,
        raw: String,
    },
    /// A comment, a blank line, or a line that could not be parsed.
    Verbatim(String),
}

impl EnvLine {
    /// Build an entry line with shell-safe quoting.
    pub fn entry(key: &str, value: &str) -> Self {
        EnvLine::Entry {
            key: key.to_string(),
            value: value.to_string(),
            raw: format!("{}={}", key, quote_value(value)),
        }
    }

    fn raw(&self) -> &str {
        match self {
            EnvLine::Entry { raw, .. } => raw,
            EnvLine::Verbatim(raw) => raw,
        }
    }
}

/// An ordered `KEY=VALUE` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    lines: Vec<EnvLine>,
}

impl EnvFile {
    /// Parse file content. Never fails: lines that do not parse are kept
    /// verbatim and logged.
    pub fn parse(content: &str) -> Self {
        let mut lines = Vec::new();
        for (index, line) in content.lines().enumerate() {
            match parse_line(line) {
                ParsedLine::Entry(key, value) => lines.push(EnvLine::Entry {
                    key,
                    value,
                    raw: line.to_string(),
                }),
                ParsedLine::Ignored => lines.push(EnvLine::Verbatim(line.to_string())),
                ParsedLine::Malformed => {
                    tracing::warn!(line = index + 1, "skipping unparseable env line");
                    lines.push(EnvLine::Verbatim(line.to_string()));
                }
            }
        }
        Self { lines }
    }

    /// Load an env file from disk. Returns `Ok(None)` when the file does not
    /// exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(Self::parse(&content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::io(path, source)),
        }
    }

    /// Build a document from lines.
    pub fn from_lines(lines: Vec<EnvLine>) -> Self {
        Self { lines }
    }

    /// Value of the first entry with this key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            EnvLine::Entry { key: k, value, .. } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Entry keys in file order (duplicates included).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            EnvLine::Entry { key, .. } => Some(key.as_str()),
            EnvLine::Verbatim(_) => None,
        })
    }

    pub fn lines(&self) -> &[EnvLine] {
        &self.lines
    }

    /// A copy with extra entries appended after the existing lines.
    pub fn with_appended(&self, entries: impl IntoIterator<Item = EnvLine>) -> Self {
        let mut lines = self.lines.clone();
        lines.extend(entries);
        Self { lines }
    }

    /// A copy with the first entry for `key` replaced by `key=value`.
    /// Returns `None` if the key is absent.
    pub fn with_value(&self, key: &str, value: &str) -> Option<Self> {
        let position = self
            .lines
            .iter()
            .position(|line| matches!(line, EnvLine::Entry { key: k, .. } if k == key))?;
        let mut lines = self.lines.clone();
        lines[position] = EnvLine::entry(key, value);
        Some(Self { lines })
    }

    /// Render the document, one line per entry, newline-terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line.raw());
            out.push('\n');
        }
        out
    }

    /// Write the whole document through a sibling temp file and rename it
    /// into place.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_atomic(path.as_ref(), self.render().as_bytes())
    }
}

/// Append lines to an existing file without rewriting it. A missing final
/// newline in the existing content is added first.
pub fn append_lines(path: impl AsRef<Path>, lines: &[EnvLine]) -> Result<(), ConfigError> {
    let path = path.as_ref();
    if lines.is_empty() {
        return Ok(());
    }
    let needs_newline = match fs::read(path) {
        Ok(bytes) => !bytes.is_empty() && !bytes.ends_with(b"\n"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(source) => return Err(ConfigError::io(path, source)),
    };

    let mut buf = String::new();
    if needs_newline {
        buf.push('\n');
    }
    for line in lines {
        buf.push_str(line.raw());
        buf.push('\n');
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ConfigError::io(path, source))?;
    file.write_all(buf.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|source| ConfigError::io(path, source))
}

/// Write `bytes` to `path` via `<path>.tmp` + rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ConfigError> {
    let tmp = temp_sibling(path);
    fs::write(&tmp, bytes).map_err(|source| ConfigError::io(&tmp, source))?;
    fs::rename(&tmp, path).map_err(|source| ConfigError::io(path, source))
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "env".to_string());
    path.with_file_name(format!("{}.tmp", name))
}

/// Quote a value so the line stays valid for both `sh` and compose.
pub fn quote_value(value: &str) -> String {
    if value.chars().all(is_bare_char) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_./:@%+,=-".contains(c)
}

enum ParsedLine {
    Entry(String, String),
    Ignored,
    Malformed,
}

fn parse_line(line: &str) -> ParsedLine {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return ParsedLine::Ignored;
    }
    let body = trimmed
        .strip_prefix("export ")
        .map(str::trim_start)
        .unwrap_or(trimmed);
    let Some((key, value)) = body.split_once('=') else {
        return ParsedLine::Malformed;
    };
    let key = key.trim_end();
    if !is_valid_key(key) {
        return ParsedLine::Malformed;
    }
    match unquote(value.trim()) {
        Some(value) => ParsedLine::Entry(key.to_string(), value),
        None => ParsedLine::Malformed,
    }
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn unquote(value: &str) -> Option<String> {
    if let Some(rest) = value.strip_prefix('"') {
        let mut out = String::new();
        let mut chars = rest.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next()? {
                    e @ ('"' | '\\' | '$' | '`') => out.push(e),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                '"' => {
                    let tail = chars.as_str().trim_start();
                    return (tail.is_empty() || tail.starts_with('#')).then_some(out);
                }
                c => out.push(c),
            }
        }
        return None;
    }
    if let Some(rest) = value.strip_prefix('\'') {
        let end = rest.find('\'')?;
        let tail = rest[end + 1..].trim_start();
        return (tail.is_empty() || tail.starts_with('#')).then(|| rest[..end].to_string());
    }
    // Bare value: whitespace followed by `#` starts a comment.
    let cut = value
        .char_indices()
        .find(|&(i, c)| c == '#' && value[..i].ends_with(char::is_whitespace))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    Some(value[..cut].trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_skips_comments_and_blanks() {
        let env = EnvFile::parse("# header\n\nPUBLIC_URL=https://meet.example.com\n  # indented\nHTTP_PORT=8000\n");
        assert_eq!(env.get("PUBLIC_URL"), Some("https://meet.example.com"));
        assert_eq!(env.get("HTTP_PORT"), Some("8000"));
        assert_eq!(env.keys().count(), 2);
        assert_eq!(env.lines().len(), 5);
    }

    #[test]
    fn parse_keeps_malformed_lines_without_keys() {
        let env = EnvFile::parse("GOOD=1\nthis is not a setting\n9BAD=2\nQUOTE=\"open\nALSO_GOOD=2\n");
        assert_eq!(env.get("GOOD"), Some("1"));
        assert_eq!(env.get("ALSO_GOOD"), Some("2"));
        assert!(!env.contains_key("9BAD"));
        assert!(!env.contains_key("QUOTE"));
        assert_eq!(env.lines().len(), 5);
    }

    #[test]
    fn parse_handles_quotes_export_and_inline_comments() {
        let env = EnvFile::parse(
            "export APP_NAME=\"Jitsi Meet\"\nPROVIDER_NAME='Acme Corp' # vendor\nTZ=Europe/Berlin # host\nHASH=a#b\nESC=\"say \\\"hi\\\" \\$HOME\"\n",
        );
        assert_eq!(env.get("APP_NAME"), Some("Jitsi Meet"));
        assert_eq!(env.get("PROVIDER_NAME"), Some("Acme Corp"));
        assert_eq!(env.get("TZ"), Some("Europe/Berlin"));
        assert_eq!(env.get("HASH"), Some("a#b"));
        assert_eq!(env.get("ESC"), Some("say \"hi\" $HOME"));
    }

    #[test]
    fn first_duplicate_wins() {
        let env = EnvFile::parse("A=first\nA=second\n");
        assert_eq!(env.get("A"), Some("first"));
    }

    #[test]
    fn empty_value_is_present_but_empty() {
        let env = EnvFile::parse("JVB_AUTH_PASSWORD=\n");
        assert!(env.contains_key("JVB_AUTH_PASSWORD"));
        assert_eq!(env.get("JVB_AUTH_PASSWORD"), Some(""));
    }

    #[test]
    fn quote_value_only_quotes_when_needed() {
        assert_eq!(quote_value("https://meet.example.com"), "https://meet.example.com");
        assert_eq!(quote_value(""), "");
        assert_eq!(quote_value("Jitsi Meet"), "\"Jitsi Meet\"");
        assert_eq!(quote_value("a$b"), "\"a\\$b\"");
    }

    #[test]
    fn quoted_entry_reparses_to_same_value() {
        let value = "My \"Quoted\" App $1 `x`";
        let line = EnvLine::entry("APP_NAME", value);
        let env = EnvFile::from_lines(vec![line]);
        let reparsed = EnvFile::parse(&env.render());
        assert_eq!(reparsed.get("APP_NAME"), Some(value));
    }

    #[test]
    fn render_preserves_untouched_lines() {
        let content = "# keep me\nA=1\n\nweird line\nB=\"x y\"\n";
        assert_eq!(EnvFile::parse(content).render(), content);
    }

    #[test]
    fn with_value_rewrites_only_that_line() {
        let env = EnvFile::parse("A=1\nSECRET=\nB=2\n");
        let updated = env.with_value("SECRET", "abc").unwrap();
        assert_eq!(updated.render(), "A=1\nSECRET=abc\nB=2\n");
        assert!(env.with_value("MISSING", "x").is_none());
    }

    #[test]
    fn load_missing_returns_none() {
        let dir = tempdir().unwrap();
        assert!(EnvFile::load(dir.path().join(".env")).unwrap().is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        let env = EnvFile::parse("# c\nA=1\n");
        env.save(&path).unwrap();
        assert!(!dir.path().join(".env.tmp").exists());
        assert_eq!(EnvFile::load(&path).unwrap().unwrap(), env);
    }

    #[test]
    fn append_lines_adds_missing_newline_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "A=1").unwrap();
        append_lines(&path, &[EnvLine::entry("B", "2")]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "A=1\nB=2\n");
    }
}
