//! The task board: authoritative item list, selection and edits
//!
//! Every mutation is validated first and saved afterwards. The simulation
//! is told about the new list by the caller via `Simulation::update_items`.

use crate::Millis;
use crate::item::{Item, ItemError, ItemId, ItemUpdate};
use crate::persistence::ItemStore;

/// Item list owner
pub struct Board<S: ItemStore> {
    items: Vec<Item>,
    selected: Option<ItemId>,
    /// Set when the selected item was just created (editor focuses the name)
    newly_created: bool,
    /// Highest id ever seen, so ids are never reused
    last_id: u64,
    store: S,
}

impl<S: ItemStore> Board<S> {
    /// Load from the store, dropping duplicate ids and repairing bad records
    pub fn load(store: S, now: Millis) -> Self {
        let loaded = store.load_items(now);
        let mut items: Vec<Item> = Vec::with_capacity(loaded.len());
        for mut item in loaded {
            if items.iter().any(|existing| existing.id == item.id) {
                log::warn!("Dropping duplicate item id {}", item.id);
                continue;
            }
            if !item.growth_rate.is_finite() || item.growth_rate <= 0.0 {
                log::warn!(
                    "Item {} had growth rate {}, using default",
                    item.id,
                    item.growth_rate
                );
                item.growth_rate = crate::consts::DEFAULT_GROWTH_RATE;
            }
            if !item.last_bumped.is_finite() {
                item.last_bumped = now;
            }
            items.push(item);
        }

        let last_id = items.iter().map(|item| item.id.0).max().unwrap_or(0);
        Self {
            items,
            selected: None,
            newly_created: false,
            last_id,
            store,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.selected.and_then(|id| self.item(id))
    }

    pub fn is_newly_created(&self) -> bool {
        self.newly_created
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Item click toggles its selection; `None` (background) deselects
    pub fn click(&mut self, id: Option<ItemId>) {
        self.selected = match id {
            Some(id) if self.selected != Some(id) && self.item(id).is_some() => Some(id),
            _ => None,
        };
        self.newly_created = false;
    }

    /// Create a default item at `now` and select it
    pub fn add(&mut self, now: Millis) -> ItemId {
        let id = self.next_id(now);
        self.items.push(Item::new(id, now));
        self.selected = Some(id);
        self.newly_created = true;
        self.save();
        log::info!("Added item {id}");
        id
    }

    /// Reset the selected item's growth clock
    pub fn bump(&mut self, now: Millis) -> Result<ItemId, ItemError> {
        let item = self.selected_mut()?;
        item.bump(now);
        let id = item.id;
        self.save();
        log::info!("Bumped item {id}");
        Ok(id)
    }

    /// Validate and merge a partial edit into the selected item
    ///
    /// An empty edit changes nothing and is not saved.
    pub fn apply_update(&mut self, update: &ItemUpdate) -> Result<ItemId, ItemError> {
        update.validate()?;
        let item = self.selected_mut()?;
        if update.is_empty() {
            return Ok(item.id);
        }
        item.apply(update);
        let id = item.id;
        self.save();
        Ok(id)
    }

    /// Remove the selected item and clear the selection
    pub fn delete(&mut self) -> Result<ItemId, ItemError> {
        let id = self.selected.ok_or(ItemError::NoSelection)?;
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return Err(ItemError::UnknownItem(id));
        }
        self.selected = None;
        self.newly_created = false;
        self.save();
        log::info!("Deleted item {id}");
        Ok(id)
    }

    fn selected_mut(&mut self) -> Result<&mut Item, ItemError> {
        let id = self.selected.ok_or(ItemError::NoSelection)?;
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(ItemError::UnknownItem(id))
    }

    /// Timestamp-derived id, strictly above every id seen so far
    fn next_id(&mut self, now: Millis) -> ItemId {
        let from_clock = if now.is_finite() && now > 0.0 { now as u64 } else { 0 };
        self.last_id = from_clock.max(self.last_id + 1);
        ItemId(self.last_id)
    }

    fn save(&self) {
        self.store.save_items(&self.items);
    }
}
