//! # jmp-reconcile
//!
//! Converges a host onto a running Jitsi Meet stack.
//!
//! [`run_install`] takes the desired settings (environment overrides plus
//! host facts) and whatever a previous run left on disk, and brings the
//! `.env` file, the compose file, the running containers and the admin
//! account in line, without discarding values that were already persisted.
//! [`run_remove`] tears the installation down completely.
//!
//! External systems are reached only through the traits of `jmp-stack` and
//! `jmp-identity`, so both pipelines run unchanged against fakes in tests.

pub mod config;
pub mod error;
pub mod install;
pub mod layout;
pub mod lock;
pub mod remove;

pub use config::ProvisionConfig;
pub use error::ReconcileError;
pub use install::{run_install, AdminReport, Collaborators, InstallReport};
pub use layout::InstallLayout;
pub use lock::RunLock;
pub use remove::{run_remove, RemoveReport};
