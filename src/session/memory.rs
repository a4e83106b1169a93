//! In-memory session store. Values live as long as the process.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{SessionError, SessionStore};

/// Session store backed by a map in process memory.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        let items = self
            .items
            .read()
            .map_err(|_| SessionError::Storage("session lock poisoned".to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| SessionError::Storage("session lock poisoned".to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| SessionError::Storage("session lock poisoned".to_string()))?;
        items.remove(key);
        Ok(())
    }
}
