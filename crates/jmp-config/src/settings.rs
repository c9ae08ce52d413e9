// settings.rs — The typed Desired Configuration.
//
// Every setting has a key in the .env file, a type, and a default. Values are
// looked up as: environment override, then persisted .env value, then the
// built-in default. Empty strings count as unset at every layer.
//
// `Settings::entries()` is the schema order used when writing a fresh .env
// file and when appending keys a previous version did not know about.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::envfile::EnvFile;
use crate::error::ConfigError;
use crate::host::HostFacts;
use crate::overrides::Overrides;

/// Override-only key for the administrator password. Never persisted in .env.
pub const ADMIN_PASS: &str = "ADMIN_PASS";

/// Component passwords that are generated when left empty.
pub const CORE_SECRET_KEYS: &[&str] = &["JICOFO_AUTH_PASSWORD", "JVB_AUTH_PASSWORD"];

/// Recording-agent passwords, generated only when the agent is enabled.
pub const JIBRI_SECRET_KEYS: &[&str] = &["JIBRI_RECORDER_PASSWORD", "JIBRI_XMPP_PASSWORD"];

const KNOWN_KEYS: &[&str] = &[
    "CONFIG",
    "PUBLIC_URL",
    "HTTP_PORT",
    "HTTPS_PORT",
    "JVB_PORT",
    "TZ",
    "JITSI_IMAGE_VERSION",
    "ENABLE_AUTH",
    "ENABLE_GUESTS",
    "AUTH_TYPE",
    "ADMIN_USER",
    "XMPP_DOMAIN",
    "XMPP_SERVER",
    "XMPP_AUTH_DOMAIN",
    "XMPP_GUEST_DOMAIN",
    "XMPP_MUC_DOMAIN",
    "XMPP_INTERNAL_MUC_DOMAIN",
    "XMPP_RECORDER_DOMAIN",
    "APP_NAME",
    "PROVIDER_NAME",
    "DEFAULT_LANGUAGE",
    "ENABLE_LOBBY",
    "ENABLE_PREJOIN_PAGE",
    "ENABLE_WELCOME_PAGE",
    "ENABLE_P2P",
    "ENABLE_JIBRI",
    "ENABLE_RECORDING",
    "ENABLE_LIVESTREAMING",
    "RESOLUTION",
    "RESOLUTION_MIN",
    "RESOLUTION_WIDTH",
    "RESOLUTION_WIDTH_MIN",
    "JICOFO_AUTH_PASSWORD",
    "JVB_AUTH_PASSWORD",
    "JIBRI_RECORDER_USER",
    "JIBRI_RECORDER_PASSWORD",
    "JIBRI_XMPP_USER",
    "JIBRI_XMPP_PASSWORD",
];

/// Whether `key` is a setting this tool writes to .env.
pub fn is_known_key(key: &str) -> bool {
    KNOWN_KEYS.contains(&key)
}

/// Authentication backend used by the XMPP server when auth is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    Internal,
    Jwt,
    Ldap,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Internal => "internal",
            AuthType::Jwt => "jwt",
            AuthType::Ldap => "ldap",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "internal" => Ok(AuthType::Internal),
            "jwt" => Ok(AuthType::Jwt),
            "ldap" => Ok(AuthType::Ldap),
            _ => Err(()),
        }
    }
}

/// Where a setting value comes from, highest precedence first.
pub struct SettingLayers<'a> {
    overrides: &'a Overrides,
    persisted: Option<&'a EnvFile>,
}

impl<'a> SettingLayers<'a> {
    pub fn new(overrides: &'a Overrides, persisted: Option<&'a EnvFile>) -> Self {
        Self {
            overrides,
            persisted,
        }
    }

    /// First non-empty value across the layers.
    pub fn value(&self, key: &str) -> Option<&'a str> {
        self.overrides
            .get(key)
            .filter(|v| !v.is_empty())
            .or_else(|| {
                self.persisted
                    .and_then(|p| p.get(key))
                    .filter(|v| !v.is_empty())
            })
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.value(key).unwrap_or(default).to_string()
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.value(key) {
            None => Ok(default),
            Some(raw) => parse_flag(raw).ok_or_else(|| invalid(key, raw, "0/1 or true/false")),
        }
    }

    fn port(&self, key: &str, default: u16) -> Result<u16, ConfigError> {
        match self.value(key) {
            None => Ok(default),
            Some(raw) => raw
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| invalid(key, raw, "a port number 1-65535")),
        }
    }

    fn number(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        match self.value(key) {
            None => Ok(default),
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| invalid(key, raw, "a non-negative integer")),
        }
    }
}

fn invalid(key: &str, value: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

/// Parse the boolean spellings found in .env files.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn flag_str(value: bool) -> String {
    let digit = if value { "1" } else { "0" };
    digit.to_string()
}

fn pinned_flag_str(value: bool, set: bool) -> String {
    if set {
        flag_str(value)
    } else {
        String::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub enable_auth: bool,
    pub enable_guests: bool,
    pub auth_type: AuthType,
    pub admin_user: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmppDomains {
    pub domain: String,
    pub server: String,
    pub auth_domain: String,
    pub guest_domain: String,
    pub muc_domain: String,
    pub internal_muc_domain: String,
    pub recorder_domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub app_name: String,
    pub provider_name: String,
    pub default_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Features {
    pub lobby: bool,
    pub prejoin_page: bool,
    pub welcome_page: bool,
    pub p2p: bool,
    /// Optional recording agent service.
    pub jibri: bool,
    pub recording: bool,
    pub livestreaming: bool,
    /// Whether `recording` / `livestreaming` were given a value instead of
    /// following `jibri`.
    pub recording_set: bool,
    pub livestreaming_set: bool,
}

/// Video resolution bounds (heights and widths in pixels).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionBounds {
    pub height: u32,
    pub height_min: u32,
    pub width: u32,
    pub width_min: u32,
}

/// Inter-component credentials. Passwords may be empty until filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSecrets {
    pub jicofo_auth_password: String,
    pub jvb_auth_password: String,
    pub jibri_recorder_user: String,
    pub jibri_recorder_password: String,
    pub jibri_xmpp_user: String,
    pub jibri_xmpp_password: String,
}

/// Immutable, validated snapshot of the deployment settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_dir: PathBuf,
    pub public_url: String,
    pub http_port: u16,
    pub https_port: u16,
    pub jvb_port: u16,
    pub timezone: String,
    pub image_version: String,
    pub auth: AuthSettings,
    pub xmpp: XmppDomains,
    pub branding: Branding,
    pub features: Features,
    pub resolution: ResolutionBounds,
    pub secrets: ComponentSecrets,
}

/// A titled group of settings, used to lay out a fresh .env file.
#[derive(Debug, Clone)]
pub struct Section {
    pub title: &'static str,
    pub entries: Vec<(&'static str, String)>,
}

impl Settings {
    /// Resolve and validate the settings for this run.
    pub fn resolve(
        layers: &SettingLayers<'_>,
        host: &HostFacts,
        install_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let https_port = layers.port("HTTPS_PORT", 8443)?;
        let default_url = if https_port == 443 {
            format!("https://{}", host.hostname)
        } else {
            format!("https://{}:{}", host.hostname, https_port)
        };
        let public_url = layers.string("PUBLIC_URL", &default_url);
        if !(public_url.starts_with("https://") || public_url.starts_with("http://")) {
            return Err(invalid("PUBLIC_URL", &public_url, "an http:// or https:// URL"));
        }

        let auth_type = match layers.value("AUTH_TYPE") {
            None => AuthType::Internal,
            Some(raw) => raw
                .parse()
                .map_err(|_| invalid("AUTH_TYPE", raw, "internal, jwt or ldap"))?,
        };

        let jibri = layers.flag("ENABLE_JIBRI", false)?;
        let features = Features {
            lobby: layers.flag("ENABLE_LOBBY", true)?,
            prejoin_page: layers.flag("ENABLE_PREJOIN_PAGE", true)?,
            welcome_page: layers.flag("ENABLE_WELCOME_PAGE", true)?,
            p2p: layers.flag("ENABLE_P2P", true)?,
            jibri,
            // The recording agent turns these on unless set explicitly.
            recording: layers.flag("ENABLE_RECORDING", jibri)?,
            livestreaming: layers.flag("ENABLE_LIVESTREAMING", jibri)?,
            recording_set: layers.value("ENABLE_RECORDING").is_some(),
            livestreaming_set: layers.value("ENABLE_LIVESTREAMING").is_some(),
        };

        let resolution = ResolutionBounds {
            height: layers.number("RESOLUTION", 720)?,
            height_min: layers.number("RESOLUTION_MIN", 180)?,
            width: layers.number("RESOLUTION_WIDTH", 1280)?,
            width_min: layers.number("RESOLUTION_WIDTH_MIN", 320)?,
        };
        if resolution.height_min > resolution.height {
            return Err(ConfigError::InvalidRange {
                min_key: "RESOLUTION_MIN",
                min: resolution.height_min,
                max_key: "RESOLUTION",
                max: resolution.height,
            });
        }
        if resolution.width_min > resolution.width {
            return Err(ConfigError::InvalidRange {
                min_key: "RESOLUTION_WIDTH_MIN",
                min: resolution.width_min,
                max_key: "RESOLUTION_WIDTH",
                max: resolution.width,
            });
        }

        let default_config = install_dir.join("config");
        Ok(Self {
            config_dir: layers
                .value("CONFIG")
                .map(PathBuf::from)
                .unwrap_or(default_config),
            public_url,
            http_port: layers.port("HTTP_PORT", 8000)?,
            https_port,
            jvb_port: layers.port("JVB_PORT", 10000)?,
            timezone: layers.string("TZ", &host.timezone),
            image_version: layers.string("JITSI_IMAGE_VERSION", "stable"),
            auth: AuthSettings {
                enable_auth: layers.flag("ENABLE_AUTH", false)?,
                enable_guests: layers.flag("ENABLE_GUESTS", true)?,
                auth_type,
                admin_user: layers.string("ADMIN_USER", "admin"),
            },
            xmpp: XmppDomains {
                domain: layers.string("XMPP_DOMAIN", "meet.jitsi"),
                server: layers.string("XMPP_SERVER", "xmpp.meet.jitsi"),
                auth_domain: layers.string("XMPP_AUTH_DOMAIN", "auth.meet.jitsi"),
                guest_domain: layers.string("XMPP_GUEST_DOMAIN", "guest.meet.jitsi"),
                muc_domain: layers.string("XMPP_MUC_DOMAIN", "muc.meet.jitsi"),
                internal_muc_domain: layers
                    .string("XMPP_INTERNAL_MUC_DOMAIN", "internal-muc.meet.jitsi"),
                recorder_domain: layers.string("XMPP_RECORDER_DOMAIN", "recorder.meet.jitsi"),
            },
            branding: Branding {
                app_name: layers.string("APP_NAME", "Jitsi Meet"),
                provider_name: layers.string("PROVIDER_NAME", "Jitsi"),
                default_language: layers.string("DEFAULT_LANGUAGE", "en"),
            },
            features,
            resolution,
            secrets: ComponentSecrets {
                jicofo_auth_password: layers.string("JICOFO_AUTH_PASSWORD", ""),
                jvb_auth_password: layers.string("JVB_AUTH_PASSWORD", ""),
                jibri_recorder_user: layers.string("JIBRI_RECORDER_USER", "recorder"),
                jibri_recorder_password: layers.string("JIBRI_RECORDER_PASSWORD", ""),
                jibri_xmpp_user: layers.string("JIBRI_XMPP_USER", "jibri"),
                jibri_xmpp_password: layers.string("JIBRI_XMPP_PASSWORD", ""),
            },
        })
    }

    /// XMPP domain the administrator account lives on. With authentication
    /// on, that is the login-required main domain; otherwise the guest one.
    pub fn signup_domain(&self) -> &str {
        if self.auth.enable_auth {
            &self.xmpp.domain
        } else {
            &self.xmpp.guest_domain
        }
    }

    /// Secret keys that must be non-empty for this configuration.
    pub fn required_secret_keys(&self) -> Vec<&'static str> {
        let mut keys = CORE_SECRET_KEYS.to_vec();
        if self.features.jibri {
            keys.extend_from_slice(JIBRI_SECRET_KEYS);
        }
        keys
    }

    /// Settings grouped for a freshly written .env file.
    pub fn sections(&self) -> Vec<Section> {
        vec![
            Section {
                title: "Installation",
                entries: vec![
                    ("CONFIG", self.config_dir.display().to_string()),
                    ("JITSI_IMAGE_VERSION", self.image_version.clone()),
                    ("TZ", self.timezone.clone()),
                ],
            },
            Section {
                title: "Web access",
                entries: vec![
                    ("PUBLIC_URL", self.public_url.clone()),
                    ("HTTP_PORT", self.http_port.to_string()),
                    ("HTTPS_PORT", self.https_port.to_string()),
                    ("JVB_PORT", self.jvb_port.to_string()),
                ],
            },
            Section {
                title: "Authentication",
                entries: vec![
                    ("ENABLE_AUTH", flag_str(self.auth.enable_auth)),
                    ("ENABLE_GUESTS", flag_str(self.auth.enable_guests)),
                    ("AUTH_TYPE", self.auth.auth_type.to_string()),
                    ("ADMIN_USER", self.auth.admin_user.clone()),
                ],
            },
            Section {
                title: "XMPP domains",
                entries: vec![
                    ("XMPP_DOMAIN", self.xmpp.domain.clone()),
                    ("XMPP_SERVER", self.xmpp.server.clone()),
                    ("XMPP_AUTH_DOMAIN", self.xmpp.auth_domain.clone()),
                    ("XMPP_GUEST_DOMAIN", self.xmpp.guest_domain.clone()),
                    ("XMPP_MUC_DOMAIN", self.xmpp.muc_domain.clone()),
                    ("XMPP_INTERNAL_MUC_DOMAIN", self.xmpp.internal_muc_domain.clone()),
                    ("XMPP_RECORDER_DOMAIN", self.xmpp.recorder_domain.clone()),
                ],
            },
            Section {
                title: "Branding",
                entries: vec![
                    ("APP_NAME", self.branding.app_name.clone()),
                    ("PROVIDER_NAME", self.branding.provider_name.clone()),
                    ("DEFAULT_LANGUAGE", self.branding.default_language.clone()),
                ],
            },
            Section {
                title: "Features",
                entries: vec![
                    ("ENABLE_LOBBY", flag_str(self.features.lobby)),
                    ("ENABLE_PREJOIN_PAGE", flag_str(self.features.prejoin_page)),
                    ("ENABLE_WELCOME_PAGE", flag_str(self.features.welcome_page)),
                    ("ENABLE_P2P", flag_str(self.features.p2p)),
                    ("ENABLE_JIBRI", flag_str(self.features.jibri)),
                    // Left empty when derived, so a later ENABLE_JIBRI change
                    // still flips them.
                    (
                        "ENABLE_RECORDING",
                        pinned_flag_str(self.features.recording, self.features.recording_set),
                    ),
                    (
                        "ENABLE_LIVESTREAMING",
                        pinned_flag_str(self.features.livestreaming, self.features.livestreaming_set),
                    ),
                ],
            },
            Section {
                title: "Video resolution",
                entries: vec![
                    ("RESOLUTION", self.resolution.height.to_string()),
                    ("RESOLUTION_MIN", self.resolution.height_min.to_string()),
                    ("RESOLUTION_WIDTH", self.resolution.width.to_string()),
                    ("RESOLUTION_WIDTH_MIN", self.resolution.width_min.to_string()),
                ],
            },
            Section {
                title: "Component credentials (empty values are generated)",
                entries: vec![
                    ("JICOFO_AUTH_PASSWORD", self.secrets.jicofo_auth_password.clone()),
                    ("JVB_AUTH_PASSWORD", self.secrets.jvb_auth_password.clone()),
                    ("JIBRI_RECORDER_USER", self.secrets.jibri_recorder_user.clone()),
                    ("JIBRI_RECORDER_PASSWORD", self.secrets.jibri_recorder_password.clone()),
                    ("JIBRI_XMPP_USER", self.secrets.jibri_xmpp_user.clone()),
                    ("JIBRI_XMPP_PASSWORD", self.secrets.jibri_xmpp_password.clone()),
                ],
            },
        ]
    }

    /// All persisted settings in schema order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        self.sections()
            .into_iter()
            .flat_map(|section| section.entries)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> HostFacts {
        HostFacts {
            hostname: "meet.local".to_string(),
            timezone: "Europe/Berlin".to_string(),
        }
    }

    fn resolve(overrides: &[(&str, &str)], persisted: Option<&str>) -> Result<Settings, ConfigError> {
        let overrides = Overrides::from_pairs(overrides.iter().copied());
        let persisted = persisted.map(EnvFile::parse);
        let layers = SettingLayers::new(&overrides, persisted.as_ref());
        Settings::resolve(&layers, &host(), Path::new("/opt/jitsi-meet"))
    }

    #[test]
    fn defaults_without_any_layers() {
        let s = resolve(&[], None).unwrap();
        assert_eq!(s.public_url, "https://meet.local:8443");
        assert_eq!(s.timezone, "Europe/Berlin");
        assert_eq!(s.config_dir, PathBuf::from("/opt/jitsi-meet/config"));
        assert_eq!(s.http_port, 8000);
        assert!(!s.auth.enable_auth);
        assert_eq!(s.auth.auth_type, AuthType::Internal);
        assert!(!s.features.jibri);
        assert!(!s.features.recording);
        assert_eq!(s.secrets.jvb_auth_password, "");
    }

    #[test]
    fn public_url_omits_standard_https_port() {
        let s = resolve(&[("HTTPS_PORT", "443")], None).unwrap();
        assert_eq!(s.public_url, "https://meet.local");
    }

    #[test]
    fn override_beats_persisted_beats_default() {
        let persisted = "HTTP_PORT=9000\nAPP_NAME=\"Persisted Name\"\n";
        let s = resolve(&[("HTTP_PORT", "7000")], Some(persisted)).unwrap();
        assert_eq!(s.http_port, 7000);
        assert_eq!(s.branding.app_name, "Persisted Name");
        assert_eq!(s.branding.provider_name, "Jitsi");
    }

    #[test]
    fn empty_override_falls_through_to_persisted() {
        let s = resolve(&[("TZ", "")], Some("TZ=Asia/Tokyo\n")).unwrap();
        assert_eq!(s.timezone, "Asia/Tokyo");
    }

    #[test]
    fn malformed_flag_is_a_typed_error() {
        let err = resolve(&[("ENABLE_AUTH", "maybe")], None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "ENABLE_AUTH"));
    }

    #[test]
    fn malformed_port_is_a_typed_error() {
        assert!(resolve(&[("HTTP_PORT", "70000")], None).is_err());
        assert!(resolve(&[("JVB_PORT", "0")], None).is_err());
    }

    #[test]
    fn flag_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("yes"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("2"), None);
    }

    #[test]
    fn resolution_bounds_are_validated() {
        let err = resolve(&[("RESOLUTION", "360"), ("RESOLUTION_MIN", "480")], None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { min_key: "RESOLUTION_MIN", .. }));
        let err = resolve(&[("RESOLUTION_WIDTH_MIN", "2000")], None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { max_key: "RESOLUTION_WIDTH", .. }));
    }

    #[test]
    fn public_url_must_be_http() {
        assert!(resolve(&[("PUBLIC_URL", "meet.example.com")], None).is_err());
    }

    #[test]
    fn jibri_flips_recording_defaults() {
        let s = resolve(&[("ENABLE_JIBRI", "1")], None).unwrap();
        assert!(s.features.recording);
        assert!(s.features.livestreaming);
        assert_eq!(
            s.required_secret_keys(),
            vec![
                "JICOFO_AUTH_PASSWORD",
                "JVB_AUTH_PASSWORD",
                "JIBRI_RECORDER_PASSWORD",
                "JIBRI_XMPP_PASSWORD"
            ]
        );
    }

    #[test]
    fn explicit_recording_setting_survives_jibri() {
        let s = resolve(&[("ENABLE_JIBRI", "true"), ("ENABLE_LIVESTREAMING", "0")], None).unwrap();
        assert!(s.features.recording);
        assert!(!s.features.livestreaming);
    }

    #[test]
    fn derived_recording_flags_persist_empty() {
        let s = resolve(&[("ENABLE_JIBRI", "1")], None).unwrap();
        let entries = s.entries();
        let get = |key: &str| entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str());
        assert_eq!(get("ENABLE_RECORDING"), Some(""));
        assert_eq!(get("ENABLE_LIVESTREAMING"), Some(""));

        let pinned = resolve(&[("ENABLE_LIVESTREAMING", "0")], None).unwrap();
        assert!(pinned.features.livestreaming_set);
        assert!(!pinned.features.recording_set);
        let entries = pinned.entries();
        assert!(entries.contains(&("ENABLE_LIVESTREAMING", "0".to_string())));
    }

    #[test]
    fn empty_persisted_recording_follows_later_jibri_override() {
        let persisted = "ENABLE_JIBRI=0\nENABLE_RECORDING=\nENABLE_LIVESTREAMING=\n";
        let off = resolve(&[], Some(persisted)).unwrap();
        assert!(!off.features.recording);

        let on = resolve(&[("ENABLE_JIBRI", "1")], Some(persisted)).unwrap();
        assert!(on.features.recording);
        assert!(on.features.livestreaming);
    }

    #[test]
    fn signup_domain_follows_auth_mode() {
        let open = resolve(&[("ENABLE_AUTH", "0")], None).unwrap();
        assert_eq!(open.signup_domain(), "guest.meet.jitsi");
        let closed = resolve(&[("ENABLE_AUTH", "1")], None).unwrap();
        assert_eq!(closed.signup_domain(), "meet.jitsi");
    }

    #[test]
    fn entries_cover_every_known_key_once() {
        let s = resolve(&[], None).unwrap();
        let keys: Vec<&str> = s.entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys.len(), KNOWN_KEYS.len());
        for key in KNOWN_KEYS {
            assert_eq!(keys.iter().filter(|k| *k == key).count(), 1, "{}", key);
        }
        assert!(!keys.contains(&ADMIN_PASS));
    }

    #[test]
    fn booleans_are_written_as_digits() {
        let s = resolve(&[("ENABLE_AUTH", "true")], None).unwrap();
        let entries = s.entries();
        let auth = entries.iter().find(|(k, _)| *k == "ENABLE_AUTH").unwrap();
        assert_eq!(auth.1, "1");
    }
}
