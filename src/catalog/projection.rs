//! Display projection
//!
//! Computes what the list view shows from the view state and the favorite
//! set. Never mutates the view state.

use futures::future::join_all;
use pokedex_types::{EntityDetail, EntityId, EntityRef, FavoriteSet};
use serde::Serialize;

use super::state::ViewState;
use crate::api::PokeApi;

/// One row of the list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisibleEntry {
    Ref(EntityRef),
    Detail(EntityDetail),
}

impl VisibleEntry {
    pub fn id(&self) -> Option<EntityId> {
        match self {
            Self::Ref(r) => r.id(),
            Self::Detail(d) => Some(d.id),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Ref(r) => &r.name,
            Self::Detail(d) => &d.name,
        }
    }
}

/// Rows to display.
///
/// Without the favorites-only toggle this is the loaded list verbatim. With
/// it, one detail request per favorite id runs concurrently; ids whose fetch
/// fails are left out. Rows come back in ascending id order.
pub async fn visible_list<A: PokeApi + ?Sized>(
    api: &A,
    state: &ViewState,
    favorites: &FavoriteSet,
) -> Vec<VisibleEntry> {
    if !state.favorites_only() {
        return state
            .loaded_entities()
            .iter()
            .cloned()
            .map(VisibleEntry::Ref)
            .collect();
    }

    let lookups = favorites.iter().map(|id| async move { (id, api.entity_detail(id).await) });

    join_all(lookups)
        .await
        .into_iter()
        .filter_map(|(id, result)| match result {
            Ok(detail) if detail.id == id => Some(VisibleEntry::Detail(detail)),
            Ok(detail) => {
                tracing::debug!(requested = id, returned = detail.id, "Dropping mismatched favorite");
                None
            }
            Err(e) => {
                tracing::debug!(id, error = %e, "Dropping favorite that failed to load");
                None
            }
        })
        .collect()
}
