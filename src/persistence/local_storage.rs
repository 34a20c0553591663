//! Browser LocalStorage backend

use web_sys::Storage;

use super::{ITEMS_KEY, ItemStore, StoreError};

/// Item list kept under a LocalStorage key
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new(ITEMS_KEY)
    }
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)
    }
}

impl ItemStore for LocalStorageStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Self::storage()?
            .get_item(&self.key)
            .map_err(|err| StoreError::Read(format!("{err:?}")))
    }

    fn write(&self, json: &str) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(&self.key, json)
            .map_err(|err| StoreError::Write(format!("{err:?}")))
    }
}
