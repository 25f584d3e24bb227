//! Pokedex - catalog client for the PokeAPI
//!
//! Browses the creature catalog page by page, filters by category, keeps a
//! locally persisted favorites set, and opens a detail page with the
//! entity's evolution levels.
//!
//! ## Layout
//!
//! - [`api`]: the `PokeApi` seam, HTTP client and in-process fixture
//! - [`catalog`]: page fetching, the list view state machine, display projection
//! - [`favorites`]: favorites persisted in a key-value slot
//! - [`relationships`]: evolution chain flattening
//! - [`detail`]: single-entity detail page
//! - [`config`], [`error`]: runtime configuration and the error type

pub mod api;
pub mod catalog;
pub mod config;
pub mod detail;
pub mod error;
pub mod favorites;
pub mod relationships;

pub use api::{FixtureApi, FixtureCatalog, HttpPokeApi, PokeApi};
pub use catalog::{CatalogFetcher, CatalogSession, DispatchOutcome, ViewEvent, ViewState, VisibleEntry};
pub use config::PokedexConfig;
pub use detail::{DetailPage, DetailView};
pub use error::{CatalogError, Result};
pub use favorites::{FavoritesStore, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use relationships::RelationshipTreeBuilder;

pub use pokedex_types::{
    Category, EntityDetail, EntityId, EntityRef, FavoriteSet, RelationshipLevel, RelationshipNode,
};
