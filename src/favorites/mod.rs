//! Favorites persistence
//!
//! The favorite set lives in one named slot of a `KeyValueStore` as a JSON
//! array of ids. The in-memory `FavoriteSet` is owned by the caller; this
//! module only reads, toggles and writes it through.

pub mod store;

use pokedex_types::{EntityId, FavoriteSet};

use crate::error::{CatalogError, Result};

pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

/// Slot name used when none is given
pub const FAVORITES_SLOT: &str = "favorites";

pub struct FavoritesStore<S> {
    store: S,
    slot: String,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_slot(store, FAVORITES_SLOT)
    }

    pub fn with_slot(store: S, slot: impl Into<String>) -> Self {
        Self {
            store,
            slot: slot.into(),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Read the persisted set, reporting malformed contents as an error
    pub fn load_checked(&self) -> Result<FavoriteSet> {
        let Some(raw) = self.store.get(&self.slot)? else {
            return Ok(FavoriteSet::new());
        };
        FavoriteSet::from_json_str(&raw).map_err(|e| CatalogError::MalformedStore {
            slot: self.slot.clone(),
            reason: e.to_string(),
        })
    }

    /// Read the persisted set; absent or unreadable data yields an empty set
    pub fn load(&self) -> FavoriteSet {
        match self.load_checked() {
            Ok(set) => set,
            Err(e @ CatalogError::MalformedStore { .. }) => {
                tracing::warn!(slot = %self.slot, error = %e, "Discarding malformed favorites");
                FavoriteSet::new()
            }
            Err(e) => {
                tracing::warn!(slot = %self.slot, error = %e, "Favorites unavailable, starting empty");
                FavoriteSet::new()
            }
        }
    }

    /// `current` with `id` flipped; nothing is written
    pub fn toggle(id: EntityId, current: &FavoriteSet) -> FavoriteSet {
        current.toggled(id)
    }

    pub fn save(&self, favorites: &FavoriteSet) -> Result<()> {
        let raw = favorites.to_json_string().map_err(|e| CatalogError::MalformedStore {
            slot: self.slot.clone(),
            reason: e.to_string(),
        })?;
        self.store.set(&self.slot, &raw)
    }

    /// Flip `id`, write the result through, then update `favorites`.
    ///
    /// On a failed write `favorites` is left untouched. Returns whether `id`
    /// is a favorite afterwards.
    pub fn toggle_and_persist(&self, id: EntityId, favorites: &mut FavoriteSet) -> Result<bool> {
        let next = Self::toggle(id, favorites);
        self.save(&next)?;
        let now_favorite = next.contains(id);
        *favorites = next;
        tracing::debug!(id, favorite = now_favorite, "Toggled favorite");
        Ok(now_favorite)
    }
}
