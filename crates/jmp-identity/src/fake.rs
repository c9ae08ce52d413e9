//! In-memory [`IdentityStore`] for tests.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::IdentityError;
use crate::store::{Account, IdentityStore};

/// Users keyed by `(domain, username)`. Failures can be forced per operation.
#[derive(Default)]
pub struct FakeIdentityStore {
    users: RefCell<BTreeMap<(String, String), String>>,
    calls: RefCell<Vec<String>>,
    fail_set_password: bool,
    fail_register: bool,
}

impl FakeIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, username: &str, domain: &str, password: &str) -> Self {
        self.users
            .borrow_mut()
            .insert((domain.to_string(), username.to_string()), password.to_string());
        self
    }

    /// Make every operation that writes fail, as if the store were down.
    pub fn unavailable(mut self) -> Self {
        self.fail_set_password = true;
        self.fail_register = true;
        self
    }

    pub fn password_of(&self, username: &str, domain: &str) -> Option<String> {
        self.users
            .borrow()
            .get(&(domain.to_string(), username.to_string()))
            .cloned()
    }

    /// Operation log, e.g. `["set-password admin@meet.jitsi"]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn log(&self, operation: &str, jid: &str) {
        self.calls.borrow_mut().push(format!("{} {}", operation, jid));
    }

    fn rejected(operation: &'static str, account: &Account, message: &str) -> IdentityError {
        IdentityError::Rejected {
            operation,
            account: account.jid(),
            message: message.to_string(),
        }
    }
}

impl IdentityStore for FakeIdentityStore {
    fn set_password(&self, account: &Account) -> Result<(), IdentityError> {
        self.log("set-password", &account.jid());
        if self.fail_set_password {
            return Err(Self::rejected("set-password", account, "store unavailable"));
        }
        let key = (account.domain.clone(), account.username.clone());
        match self.users.borrow_mut().get_mut(&key) {
            Some(password) => {
                *password = account.password.clone();
                Ok(())
            }
            None => Err(Self::rejected("set-password", account, "user does not exist")),
        }
    }

    fn register(&self, account: &Account) -> Result<(), IdentityError> {
        self.log("register", &account.jid());
        if self.fail_register {
            return Err(Self::rejected("register", account, "store unavailable"));
        }
        self.users.borrow_mut().insert(
            (account.domain.clone(), account.username.clone()),
            account.password.clone(),
        );
        Ok(())
    }

    fn delete_user(&self, username: &str, domain: &str) -> Result<(), IdentityError> {
        self.log("delete-user", &format!("{}@{}", username, domain));
        self.users
            .borrow_mut()
            .remove(&(domain.to_string(), username.to_string()));
        Ok(())
    }

    fn list_users(&self, domain: &str) -> Result<Vec<String>, IdentityError> {
        Ok(self
            .users
            .borrow()
            .keys()
            .filter(|(d, _)| d == domain)
            .map(|(_, u)| u.clone())
            .collect())
    }
}
