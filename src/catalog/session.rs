//! Catalog session
//!
//! The view-state container: owns the `ViewState` and the in-memory favorite
//! set, with the API and the durable store injected. Fetches run to
//! completion before the next event is accepted.

use pokedex_types::{EntityId, FavoriteSet};

use super::fetcher::CatalogFetcher;
use super::projection::{visible_list, VisibleEntry};
use super::state::{Completion, FetchTicket, Transition, ViewEvent, ViewState};
use crate::api::PokeApi;
use crate::error::Result;
use crate::favorites::{FavoritesStore, KeyValueStore};

/// What handling one event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Ignored(&'static str),
    Updated,
    Fetched(Completion),
}

pub struct CatalogSession<A, S> {
    api: A,
    favorites_store: FavoritesStore<S>,
    favorites: FavoriteSet,
    view: ViewState,
}

impl<A: PokeApi, S: KeyValueStore> CatalogSession<A, S> {
    /// Session with favorites loaded but nothing fetched yet
    pub fn new(api: A, store: S, page_size: usize) -> Self {
        let favorites_store = FavoritesStore::new(store);
        let favorites = favorites_store.load();
        tracing::info!(favorites = favorites.len(), page_size, "Catalog session created");

        Self {
            api,
            favorites_store,
            favorites,
            view: ViewState::new(page_size),
        }
    }

    /// Create the session and run the implicit first-page fetch
    pub async fn start(api: A, store: S, page_size: usize) -> Self {
        let mut session = Self::new(api, store, page_size);
        let ticket = session.view.begin_initial();
        session.run(ticket).await;
        session
    }

    pub async fn dispatch(&mut self, event: ViewEvent) -> DispatchOutcome {
        match self.view.begin(event) {
            Transition::Fetch(ticket) => DispatchOutcome::Fetched(self.run(ticket).await),
            Transition::Updated => DispatchOutcome::Updated,
            Transition::Ignored(reason) => {
                tracing::debug!(?event, reason, "Event ignored");
                DispatchOutcome::Ignored(reason)
            }
        }
    }

    async fn run(&mut self, ticket: FetchTicket) -> Completion {
        let result = CatalogFetcher::new(&self.api)
            .fetch_page(ticket.cursor, ticket.page_size, ticket.category)
            .await;
        self.view.complete(ticket, result)
    }

    /// Flip a favorite, writing through to the store before memory changes
    pub fn toggle_favorite(&mut self, id: EntityId) -> Result<bool> {
        self.favorites_store.toggle_and_persist(id, &mut self.favorites)
    }

    pub fn is_favorite(&self, id: EntityId) -> bool {
        self.favorites.contains(id)
    }

    pub async fn visible(&self) -> Vec<VisibleEntry> {
        visible_list(&self.api, &self.view, &self.favorites).await
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}
