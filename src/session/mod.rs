//! Session-scoped storage for the API bearer token.
//!
//! The token is stored JSON-encoded under [`AUTH_TOKEN_KEY`]. Stores are
//! plain string key/value maps so other session values can live beside it.

#[cfg(feature = "keychain")]
pub mod keychain;
pub mod memory;

#[cfg(feature = "keychain")]
pub use keychain::KeychainSessionStore;
pub use memory::MemorySessionStore;

use thiserror::Error;

/// Storage key holding the JSON-encoded auth token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage operation failed: {0}")]
    Storage(String),
    #[error("Failed to encode session value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key/value storage scoped to the current session.
pub trait SessionStore: Send + Sync {
    /// Read the raw value under `key`. `Ok(None)` when the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Write the raw value under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Remove `key`. Idempotent.
    fn remove_item(&self, key: &str) -> Result<(), SessionError>;
}

/// Read the auth token.
///
/// Returns `None` when the key is absent, holds JSON `null`, holds an empty
/// string, or holds something that is not a JSON string.
pub fn read_token(store: &dyn SessionStore) -> Result<Option<String>, SessionError> {
    let Some(raw) = store.get_item(AUTH_TOKEN_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str::<Option<String>>(&raw) {
        Ok(Some(token)) if !token.is_empty() => Ok(Some(token)),
        Ok(_) => Ok(None),
        Err(e) => {
            log::warn!("Ignoring malformed session token: {}", e);
            Ok(None)
        }
    }
}

/// Store the auth token JSON-encoded. Used by the login flow.
pub fn write_token(store: &dyn SessionStore, token: &str) -> Result<(), SessionError> {
    let encoded = serde_json::to_string(token)?;
    store.set_item(AUTH_TOKEN_KEY, &encoded)
}

/// Remove the auth token (logout).
pub fn clear_token(store: &dyn SessionStore) -> Result<(), SessionError> {
    store.remove_item(AUTH_TOKEN_KEY)
}
