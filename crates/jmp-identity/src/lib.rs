//! # jmp-identity
//!
//! The administrator account of a Jitsi Meet installation.
//!
//! The XMPP server keeps its own user directory, administered with
//! `prosodyctl` inside the prosody container. [`IdentityStore`] is the narrow
//! capability set the reconciler needs from it; [`ProsodyIdentity`] is the
//! real implementation and [`FakeIdentityStore`] the test double.
//!
//! The admin password is chosen by [`resolve_admin_password`] (override,
//! then the saved [`AdminCredentials`] record, then a fresh secret) and
//! pushed with [`provision_admin`], which falls back from a password change
//! to a registration.

pub mod credentials;
pub mod error;
pub mod fake;
pub mod prosody;
pub mod provision;
pub mod store;

pub use credentials::{resolve_admin_password, AdminCredentials, PasswordSource};
pub use error::IdentityError;
pub use fake::FakeIdentityStore;
pub use prosody::ProsodyIdentity;
pub use provision::{provision_admin, AdminOutcome};
pub use store::{Account, IdentityStore};
