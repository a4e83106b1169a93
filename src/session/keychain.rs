//! Keychain-backed session store.
//!
//! Uses the `keyring` crate so the token survives between CLI invocations
//! without being written to disk in plain text.

use keyring::Entry;

use super::{SessionError, SessionStore};

/// Default keychain service name.
pub const SERVICE_NAME: &str = "portal-client";

impl From<keyring::Error> for SessionError {
    fn from(err: keyring::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

/// Session store that keeps each key as a keychain entry under one service.
#[derive(Debug, Clone)]
pub struct KeychainSessionStore {
    service: String,
}

impl Default for KeychainSessionStore {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl KeychainSessionStore {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, SessionError> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl SessionStore for KeychainSessionStore {
    /// Returns `None` if no entry exists (never stored or already removed).
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(SessionError::from(e)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    /// Idempotent: ignores `NoEntry` (already removed or never stored).
    fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SessionError::from(e)),
        }
    }
}
