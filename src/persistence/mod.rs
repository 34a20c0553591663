//! Item persistence
//!
//! Only authoritative fields are stored. Storage is best-effort:
//! - Loading never fails: missing, unreadable or corrupt data yields the
//!   default seed set
//! - Saving never fails: errors are logged and dropped
//!
//! The simulation keeps running in memory regardless.

#[cfg(target_arch = "wasm32")]
pub mod local_storage;
pub mod memory;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;
pub use memory::MemoryStore;

use thiserror::Error;

use crate::Millis;
use crate::consts::MS_PER_DAY;
use crate::item::{Item, ItemId};

/// Storage key for the item list
pub const ITEMS_KEY: &str = "balls-data";

/// Why a load or save did not go through
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("failed to read stored items: {0}")]
    Read(String),
    #[error("failed to write items: {0}")]
    Write(String),
    #[error("stored items are corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Raw string storage backend (LocalStorage on web)
pub trait ItemStore {
    /// Stored JSON, `Ok(None)` when nothing was saved yet
    fn read(&self) -> Result<Option<String>, StoreError>;

    fn write(&self, json: &str) -> Result<(), StoreError>;

    /// Stored items, or the default seed set on any failure
    fn load_items(&self, now: Millis) -> Vec<Item> {
        match self.try_load() {
            Ok(Some(items)) => {
                log::info!("Loaded {} items", items.len());
                items
            }
            Ok(None) => {
                log::info!("No stored items, starting with examples");
                default_items(now)
            }
            Err(err) => {
                log::error!("Failed to load items: {err}");
                default_items(now)
            }
        }
    }

    /// Persist the authoritative fields; failures are logged, never raised
    fn save_items(&self, items: &[Item]) {
        match self.try_save(items) {
            Ok(()) => log::debug!("Saved {} items", items.len()),
            Err(err) => log::error!("Failed to save items: {err}"),
        }
    }

    fn try_load(&self) -> Result<Option<Vec<Item>>, StoreError> {
        let Some(json) = self.read()? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn try_save(&self, items: &[Item]) -> Result<(), StoreError> {
        let json = serde_json::to_string(items)?;
        self.write(&json)
    }
}

/// Example tasks shown on first launch, at staggered ages
pub fn default_items(now: Millis) -> Vec<Item> {
    vec![
        Item::new(ItemId(1), now - 15.0 * MS_PER_DAY)
            .with_name("Clean coffee grinder")
            .with_growth_rate(2.0),
        Item::new(ItemId(2), now - 5.0 * MS_PER_DAY)
            .with_name("Water plants")
            .with_growth_rate(5.0),
        Item::new(ItemId(3), now - 20.0 * MS_PER_DAY)
            .with_name("Review finances")
            .with_growth_rate(1.5),
    ]
}
