// compose.rs — The stack definition (docker-compose.yml).
//
// The file is regenerated in full on every run. Environment values, ports
// and volume roots are `${KEY}` placeholders that compose resolves from the
// .env file next to it when the stack starts. The set of services and the
// recording flags derived from ENABLE_JIBRI depend on the settings at render
// time.

use std::collections::BTreeMap;

use jmp_config::Settings;
use serde::Serialize;

use crate::error::StackError;

/// Name of the bridge network every service joins.
pub const NETWORK: &str = "meet.jitsi";

/// Service name of the XMPP server.
pub const XMPP_SERVICE: &str = "prosody";

/// Service name of the optional recording agent.
pub const RECORDER_SERVICE: &str = "jibri";

const HEADER: &str = "\
# Jitsi Meet stack definition.
#
# Generated by jitsi-meet-provision and rewritten on every run; the previous
# version is kept next to this file with a timestamp suffix. Change settings
# in .env instead of editing this file.
";

const PROSODY_ENV: &[&str] = &[
    "AUTH_TYPE",
    "ENABLE_AUTH",
    "ENABLE_GUESTS",
    "ENABLE_LOBBY",
    "JIBRI_RECORDER_PASSWORD",
    "JIBRI_RECORDER_USER",
    "JIBRI_XMPP_PASSWORD",
    "JIBRI_XMPP_USER",
    "JICOFO_AUTH_PASSWORD",
    "JVB_AUTH_PASSWORD",
    "PUBLIC_URL",
    "TZ",
    "XMPP_AUTH_DOMAIN",
    "XMPP_DOMAIN",
    "XMPP_GUEST_DOMAIN",
    "XMPP_INTERNAL_MUC_DOMAIN",
    "XMPP_MUC_DOMAIN",
    "XMPP_RECORDER_DOMAIN",
];

const JICOFO_ENV: &[&str] = &[
    "AUTH_TYPE",
    "ENABLE_AUTH",
    "JICOFO_AUTH_PASSWORD",
    "TZ",
    "XMPP_AUTH_DOMAIN",
    "XMPP_DOMAIN",
    "XMPP_INTERNAL_MUC_DOMAIN",
    "XMPP_MUC_DOMAIN",
    "XMPP_RECORDER_DOMAIN",
    "XMPP_SERVER",
];

const JVB_ENV: &[&str] = &[
    "JVB_AUTH_PASSWORD",
    "JVB_PORT",
    "PUBLIC_URL",
    "TZ",
    "XMPP_AUTH_DOMAIN",
    "XMPP_INTERNAL_MUC_DOMAIN",
    "XMPP_SERVER",
];

const WEB_ENV: &[&str] = &[
    "APP_NAME",
    "DEFAULT_LANGUAGE",
    "ENABLE_AUTH",
    "ENABLE_GUESTS",
    "ENABLE_LOBBY",
    "ENABLE_P2P",
    "ENABLE_PREJOIN_PAGE",
    "ENABLE_WELCOME_PAGE",
    "PROVIDER_NAME",
    "PUBLIC_URL",
    "RESOLUTION",
    "RESOLUTION_MIN",
    "RESOLUTION_WIDTH",
    "RESOLUTION_WIDTH_MIN",
    "TZ",
    "XMPP_AUTH_DOMAIN",
    "XMPP_DOMAIN",
    "XMPP_GUEST_DOMAIN",
    "XMPP_MUC_DOMAIN",
    "XMPP_RECORDER_DOMAIN",
];

const JIBRI_ENV: &[&str] = &[
    "JIBRI_RECORDER_PASSWORD",
    "JIBRI_RECORDER_USER",
    "JIBRI_XMPP_PASSWORD",
    "JIBRI_XMPP_USER",
    "PUBLIC_URL",
    "TZ",
    "XMPP_AUTH_DOMAIN",
    "XMPP_DOMAIN",
    "XMPP_INTERNAL_MUC_DOMAIN",
    "XMPP_RECORDER_DOMAIN",
    "XMPP_SERVER",
];

/// A whole compose document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposeFile {
    pub services: BTreeMap<String, ServiceSpec>,
    pub networks: BTreeMap<String, NetworkSpec>,
}

/// One service entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSpec {
    pub image: String,
    pub restart: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    pub environment: BTreeMap<String, String>,
    pub networks: BTreeMap<String, NetworkAttachment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub privileged: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cap_add: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shm_size: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkAttachment {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkSpec {}

impl ServiceSpec {
    fn new(name: &str, env_keys: &[&str]) -> Self {
        let environment = env_keys
            .iter()
            .map(|key| (key.to_string(), format!("${{{}}}", key)))
            .collect();
        let networks = [(NETWORK.to_string(), NetworkAttachment::default())]
            .into_iter()
            .collect();
        Self {
            image: format!("jitsi/{}:${{JITSI_IMAGE_VERSION:-stable}}", name),
            restart: "unless-stopped".to_string(),
            ports: Vec::new(),
            volumes: Vec::new(),
            environment,
            networks,
            depends_on: Vec::new(),
            privileged: false,
            cap_add: Vec::new(),
            devices: Vec::new(),
            shm_size: None,
        }
    }

    fn volumes(mut self, volumes: &[&str]) -> Self {
        self.volumes = volumes.iter().map(|v| v.to_string()).collect();
        self
    }

    fn ports(mut self, ports: &[&str]) -> Self {
        self.ports = ports.iter().map(|p| p.to_string()).collect();
        self
    }

    fn depends_on(mut self, services: &[&str]) -> Self {
        self.depends_on = services.iter().map(|s| s.to_string()).collect();
        self
    }

    fn alias(mut self, alias: &str) -> Self {
        if let Some(attachment) = self.networks.get_mut(NETWORK) {
            attachment.aliases.push(alias.to_string());
        }
        self
    }

    fn static_env(mut self, key: &str, value: &str) -> Self {
        self.environment.insert(key.to_string(), value.to_string());
        self
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

impl ComposeFile {
    /// Build the stack definition for these settings.
    pub fn for_settings(settings: &Settings) -> Self {
        let mut services = BTreeMap::new();
        let recording = flag(settings.features.recording);
        let livestreaming = flag(settings.features.livestreaming);

        services.insert(
            XMPP_SERVICE.to_string(),
            ServiceSpec::new("prosody", PROSODY_ENV)
                .volumes(&[
                    "${CONFIG}/prosody/config:/config:Z",
                    "${CONFIG}/prosody/prosody-plugins-custom:/prosody-plugins-custom:Z",
                ])
                .static_env("ENABLE_RECORDING", recording)
                .alias("xmpp.meet.jitsi"),
        );
        services.insert(
            "jicofo".to_string(),
            ServiceSpec::new("jicofo", JICOFO_ENV)
                .volumes(&["${CONFIG}/jicofo:/config:Z"])
                .static_env("ENABLE_RECORDING", recording)
                .static_env("ENABLE_LIVESTREAMING", livestreaming)
                .depends_on(&[XMPP_SERVICE]),
        );
        services.insert(
            "jvb".to_string(),
            ServiceSpec::new("jvb", JVB_ENV)
                .volumes(&["${CONFIG}/jvb:/config:Z"])
                .ports(&["${JVB_PORT}:${JVB_PORT}/udp"])
                .depends_on(&[XMPP_SERVICE]),
        );
        services.insert(
            "web".to_string(),
            ServiceSpec::new("web", WEB_ENV)
                .volumes(&[
                    "${CONFIG}/web:/config:Z",
                    "${CONFIG}/transcripts:/usr/share/jitsi-meet/transcripts:Z",
                ])
                .ports(&["${HTTP_PORT}:80", "${HTTPS_PORT}:443"])
                .static_env("XMPP_BOSH_URL_BASE", "http://xmpp.meet.jitsi:5280")
                .static_env("ENABLE_RECORDING", recording)
                .static_env("ENABLE_LIVESTREAMING", livestreaming)
                .alias("meet.jitsi"),
        );

        if settings.features.jibri {
            let mut jibri = ServiceSpec::new("jibri", JIBRI_ENV)
                .volumes(&["${CONFIG}/jibri:/config:Z", "/dev/shm:/dev/shm"])
                .depends_on(&["jicofo"])
                .static_env("DISPLAY", ":0")
                .static_env("JIBRI_RECORDING_DIR", "/config/recordings");
            jibri.privileged = true;
            jibri.cap_add = vec!["SYS_ADMIN".to_string()];
            jibri.devices = vec!["/dev/snd:/dev/snd".to_string()];
            jibri.shm_size = Some("2gb".to_string());
            services.insert(RECORDER_SERVICE.to_string(), jibri);
        }

        let networks = [(NETWORK.to_string(), NetworkSpec::default())]
            .into_iter()
            .collect();
        Self { services, networks }
    }

    /// Every `${KEY}` placeholder referenced by the document, deduplicated.
    pub fn placeholders(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for service in self.services.values() {
            let texts = service
                .environment
                .values()
                .chain(service.ports.iter())
                .chain(service.volumes.iter());
            for text in texts {
                for key in placeholder_keys(text) {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
        }
        keys.sort();
        keys
    }

    /// Render as YAML with the generated-file header.
    pub fn to_yaml(&self) -> Result<String, StackError> {
        let body = serde_yaml::to_string(self)?;
        Ok(format!("{}\n{}", HEADER, body))
    }
}

fn placeholder_keys(text: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else { break };
        let inner = &after[..end];
        let key = inner.split(":-").next().unwrap_or(inner);
        keys.push(key.to_string());
        rest = &after[end + 1..];
    }
    keys
}
