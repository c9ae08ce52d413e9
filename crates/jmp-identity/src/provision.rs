// provision.rs — Push the admin account into the identity store.

use crate::store::{Account, IdentityStore};

/// How [`provision_admin`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminOutcome {
    /// The user existed and its password was set.
    PasswordUpdated,
    /// The user did not exist and was registered.
    Registered,
    /// Both operations failed; the message names both causes.
    Failed(String),
}

impl AdminOutcome {
    pub fn succeeded(&self) -> bool {
        !matches!(self, AdminOutcome::Failed(_))
    }
}

/// Set the password of `account`, registering it if that fails.
///
/// Never returns an error: a store that refuses both operations yields
/// [`AdminOutcome::Failed`] and a warning.
pub fn provision_admin(store: &dyn IdentityStore, account: &Account) -> AdminOutcome {
    let set_err = match store.set_password(account) {
        Ok(()) => {
            tracing::info!(jid = %account.jid(), "admin password updated");
            return AdminOutcome::PasswordUpdated;
        }
        Err(e) => e,
    };
    tracing::debug!(jid = %account.jid(), error = %set_err, "set-password failed, registering instead");

    match store.register(account) {
        Ok(()) => {
            tracing::info!(jid = %account.jid(), "admin user registered");
            AdminOutcome::Registered
        }
        Err(register_err) => {
            let message = format!("{}; {}", set_err, register_err);
            tracing::warn!(jid = %account.jid(), error = %message, "could not provision admin user");
            AdminOutcome::Failed(message)
        }
    }
}
