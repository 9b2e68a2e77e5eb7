//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Holds the bearer token the API client attaches to requests. Persisted
//! through a [`StorageAdapter`] so a later session picks it up.

use super::storage::{StorageAdapter, StorageError};

pub const TOKEN_KEY: &str = "dronemap_auth_token";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub token: Option<String>,
}

impl AuthSession {
    /// Read the persisted token. Read failures are treated as logged out.
    #[must_use]
    pub fn load(storage: &dyn StorageAdapter) -> Self {
        let token = storage
            .get(TOKEN_KEY)
            .ok()
            .flatten()
            .filter(|t| !t.trim().is_empty());
        Self { token }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the token cannot be persisted.
    pub fn login(&mut self, storage: &dyn StorageAdapter, token: &str) -> Result<(), StorageError> {
        let token = token.trim();
        storage.set(TOKEN_KEY, token)?;
        self.token = Some(token.to_owned());
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the token cannot be removed.
    pub fn logout(&mut self, storage: &dyn StorageAdapter) -> Result<(), StorageError> {
        storage.remove(TOKEN_KEY)?;
        self.token = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;
