//! LocalStorage as a [`KeyValueStore`].
//!
//! Values are stored raw. gloo's typed `get`/`set` would JSON-encode the
//! already-serialized records a second time.

use gloo_storage::{LocalStorage, Storage};
use jsonlint_editor_core::{KeyValueStore, PlatformError};

pub struct LocalStore {
    storage: web_sys::Storage,
}

impl LocalStore {
    pub fn new() -> Self {
        Self {
            storage: LocalStorage::raw(),
        }
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PlatformError> {
        self.storage.set_item(key, value).map_err(|e| {
            tracing::warn!(target: "jsonlint::storage", key, "set_item failed: {:?}", e);
            PlatformError(format!("could not write {key}"))
        })
    }

    fn remove(&mut self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            tracing::warn!(target: "jsonlint::storage", key, "remove_item failed: {:?}", e);
        }
    }

    fn keys(&self) -> Vec<String> {
        let len = self.storage.length().unwrap_or(0);
        (0..len)
            .filter_map(|i| self.storage.key(i).ok().flatten())
            .collect()
    }
}
