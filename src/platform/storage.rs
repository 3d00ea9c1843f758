//! Persistence backends
//!
//! Saves are stored as JSON text, the same shape LocalStorage holds.

use std::collections::HashMap;

use super::PersistenceSink;
use crate::persistence::SaveState;

/// In-process store (native runs and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored text, as a browser devtools view would show it
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn set_raw(&mut self, key: &str, json: &str) {
        self.items.insert(key.to_string(), json.to_string());
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl PersistenceSink for MemoryStorage {
    fn store(&mut self, key: &str, state: &SaveState) {
        match state.to_json() {
            Ok(json) => {
                self.items.insert(key.to_string(), json);
            }
            Err(e) => log::warn!("Could not encode save for {}: {}", key, e),
        }
    }

    fn fetch(&self, key: &str) -> Option<SaveState> {
        let json = self.items.get(key)?;
        match SaveState::from_json(json) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("Discarding unreadable save {}: {}", key, e);
                None
            }
        }
    }

    fn clear(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(target_arch = "wasm32")]
impl PersistenceSink for LocalStorage {
    fn store(&mut self, key: &str, state: &SaveState) {
        let Some(storage) = Self::storage() else {
            return;
        };
        if let Ok(json) = state.to_json() {
            let _ = storage.set_item(key, &json);
            log::info!("Game saved ({})", key);
        }
    }

    fn fetch(&self, key: &str) -> Option<SaveState> {
        let json = Self::storage()?.get_item(key).ok()??;
        SaveState::from_json(&json).ok()
    }

    fn clear(&mut self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
            log::info!("Saved game cleared ({})", key);
        }
    }
}
