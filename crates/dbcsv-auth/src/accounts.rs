//! Accounts loaded from a JSON file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AuthError, Result};
use crate::password::{hash_password, verify_password};

/// A login account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    #[serde(default)]
    pub disabled: bool,
}

impl Account {
    /// Creates an enabled account, hashing the password.
    pub fn create(username: impl Into<String>, password: &str) -> Result<Self> {
        Ok(Self {
            username: username.into(),
            password_hash: hash_password(password)?,
            disabled: false,
        })
    }

    /// Checks a password against the stored hash.
    #[must_use]
    pub fn check_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash)
    }
}

/// Accounts indexed by username.
#[derive(Debug, Clone, Default)]
pub struct AccountStore {
    accounts: HashMap<String, Account>,
}

impl AccountStore {
    /// Builds a store from a list of accounts. Later duplicates win.
    #[must_use]
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|a| (a.username.clone(), a))
                .collect(),
        }
    }

    /// Reads a JSON array of accounts.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| AuthError::AccountsIo {
            path: path.to_path_buf(),
            source,
        })?;
        let accounts: Vec<Account> =
            serde_json::from_str(&raw).map_err(|source| AuthError::AccountsFormat {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), accounts = accounts.len(), "Accounts loaded");
        Ok(Self::from_accounts(accounts))
    }

    /// Returns the number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if there are no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Authenticates a user by username and password.
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<&Account> {
        let Some(account) = self.accounts.get(username) else {
            debug!(%username, "Unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if account.disabled {
            return Err(AuthError::UserInactive);
        }

        if !account.check_password(password) {
            debug!(%username, "Wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticate() {
        let store = AccountStore::from_accounts([Account::create("johndoe", "secret123").unwrap()]);

        assert_eq!(
            store.authenticate("johndoe", "secret123").unwrap().username,
            "johndoe"
        );
        assert!(matches!(
            store.authenticate("johndoe", "nope"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            store.authenticate("nobody", "secret123"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_disabled_account() {
        let mut account = Account::create("alice", "secret123").unwrap();
        account.disabled = true;
        let store = AccountStore::from_accounts([account]);
        assert!(matches!(
            store.authenticate("alice", "secret123"),
            Err(AuthError::UserInactive)
        ));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        let account = Account::create("johndoe", "secret123").unwrap();
        fs::write(&path, serde_json::to_string(&[&account]).unwrap()).unwrap();

        let store = AccountStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.authenticate("johndoe", "secret123").is_ok());
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            AccountStore::load(&missing),
            Err(AuthError::AccountsIo { .. })
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{").unwrap();
        assert!(matches!(
            AccountStore::load(&broken),
            Err(AuthError::AccountsFormat { .. })
        ));
    }
}
