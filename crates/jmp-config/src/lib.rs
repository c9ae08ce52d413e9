//! # jmp-config
//!
//! Deployment settings and the persisted `.env` file for a Jitsi Meet
//! docker installation.
//!
//! A run starts from three sources: environment overrides, the `.env` file
//! written by a previous run, and built-in defaults (some of them derived
//! from the host). [`Settings::resolve`] layers them in that order and
//! validates the result once, so later steps work with typed values.
//!
//! ## Key components
//!
//! - [`Settings`] — the typed Desired Configuration snapshot
//! - [`EnvFile`] — ordered `KEY=VALUE` lines, comments preserved
//! - [`materialize`] — write a fresh `.env` or keep the existing one
//! - [`append_missing_keys`] — idempotent schema upgrade by appending
//! - [`fill_empty_secrets`] — generate component passwords left empty
//! - [`HostFacts`] — hostname and timezone inspection

pub mod envfile;
pub mod error;
pub mod host;
pub mod materialize;
pub mod overrides;
pub mod reconcile;
pub mod secret;
pub mod settings;

pub use envfile::EnvFile;
pub use error::ConfigError;
pub use host::HostFacts;
pub use materialize::{materialize, Materialized};
pub use overrides::Overrides;
pub use reconcile::{append_missing_keys, fill_empty_secrets, KeyReconcile, SecretFill};
pub use secret::{generate_secret, is_valid_secret, SECRET_LENGTH};
pub use settings::{AuthType, Settings, SettingLayers};
