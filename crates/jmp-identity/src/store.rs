//! Core IdentityStore trait and account type.

use std::fmt;

use crate::error::IdentityError;

/// An XMPP account: `username@domain` with its password.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub domain: String,
    pub password: String,
}

impl Account {
    pub fn new(username: impl Into<String>, domain: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            domain: domain.into(),
            password: password.into(),
        }
    }

    pub fn jid(&self) -> String {
        format!("{}@{}", self.username, self.domain)
    }
}

// Keep passwords out of debug logs.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// User directory operations of the XMPP server.
///
/// Each call is a single blocking attempt; callers decide how to fall back.
pub trait IdentityStore {
    /// Change the password of an existing user. Fails if the user is unknown.
    fn set_password(&self, account: &Account) -> Result<(), IdentityError>;

    /// Create a new user.
    fn register(&self, account: &Account) -> Result<(), IdentityError>;

    /// Remove `username@domain`.
    fn delete_user(&self, username: &str, domain: &str) -> Result<(), IdentityError>;

    /// Usernames registered on `domain`.
    fn list_users(&self, domain: &str) -> Result<Vec<String>, IdentityError>;
}

impl<T: IdentityStore + ?Sized> IdentityStore for &T {
    fn set_password(&self, account: &Account) -> Result<(), IdentityError> {
        (**self).set_password(account)
    }

    fn register(&self, account: &Account) -> Result<(), IdentityError> {
        (**self).register(account)
    }

    fn delete_user(&self, username: &str, domain: &str) -> Result<(), IdentityError> {
        (**self).delete_user(username, domain)
    }

    fn list_users(&self, domain: &str) -> Result<Vec<String>, IdentityError> {
        (**self).list_users(domain)
    }
}
