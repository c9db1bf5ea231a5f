//! Token Persistence
//!
//! The session manager is the only reader and writer of the persisted token.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::TOKEN_KEY;

/// Durable key/value storage for the credential token
pub trait TokenStore {
    fn read(&self) -> Option<String>;

    fn write(&self, token: &str) -> Result<(), String>;

    /// Wipe the whole storage area, not only the token key
    fn clear(&self);
}

/// Browser `localStorage`
#[derive(Debug, Clone, Copy)]
pub struct BrowserTokenStore {
    key: &'static str,
}

impl BrowserTokenStore {
    pub fn new() -> Self {
        Self { key: TOKEN_KEY }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl Default for BrowserTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for BrowserTokenStore {
    fn read(&self) -> Option<String> {
        Self::storage()?.get_item(self.key).ok().flatten()
    }

    fn write(&self, token: &str) -> Result<(), String> {
        let storage = Self::storage().ok_or_else(|| "localStorage is unavailable".to_string())?;
        storage
            .set_item(self.key, token)
            .map_err(|e| format!("{:?}", e))
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            if let Err(e) = storage.clear() {
                tracing::error!("failed to clear localStorage: {:?}", e);
            }
        }
    }
}

/// In-memory store; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        store.entries.borrow_mut().insert(TOKEN_KEY.to_string(), token.to_string());
        store
    }

    /// Put an unrelated entry next to the token
    pub fn insert(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Option<String> {
        self.entries.borrow().get(TOKEN_KEY).cloned()
    }

    fn write(&self, token: &str) -> Result<(), String> {
        self.entries.borrow_mut().insert(TOKEN_KEY.to_string(), token.to_string());
        Ok(())
    }

    fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
