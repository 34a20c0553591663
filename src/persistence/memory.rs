//! In-memory store for native runs and tests

use std::cell::{Cell, RefCell};

use super::{ItemStore, StoreError};

/// Keeps the serialized item list in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RefCell<Option<String>>,
    /// Simulates a full or missing storage backend
    fail_writes: Cell<bool>,
    saves: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with raw JSON
    pub fn with_json(json: impl Into<String>) -> Self {
        let store = Self::new();
        *store.data.borrow_mut() = Some(json.into());
        store
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    pub fn json(&self) -> Option<String> {
        self.data.borrow().clone()
    }
}

impl ItemStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.data.borrow().clone())
    }

    fn write(&self, json: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Write("quota exceeded".into()));
        }
        *self.data.borrow_mut() = Some(json.to_string());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
