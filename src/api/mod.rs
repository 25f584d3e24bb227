//! Catalog API boundary
//!
//! `PokeApi` is the only way the rest of the crate reaches the remote
//! catalog. Two implementations:
//! - `HttpPokeApi` talks to PokeAPI over HTTP
//! - `FixtureApi` serves a catalog held in memory (tests, `--offline`)

pub mod client;
pub mod fixture;
pub mod types;

use async_trait::async_trait;
use pokedex_types::{Category, EntityDetail, EntityId, EntityRef};

use crate::error::Result;

pub use client::HttpPokeApi;
pub use fixture::{FixtureApi, FixtureCatalog};
pub use types::{ChainLink, NamedResource, SpeciesRecord};

#[async_trait]
pub trait PokeApi: Send + Sync {
    /// Slice `[offset, offset + limit)` of the global id-ordered list
    async fn list_entities(&self, offset: usize, limit: usize) -> Result<Vec<EntityRef>>;

    /// Every member of a category, unpaginated
    async fn category_members(&self, category: Category) -> Result<Vec<EntityRef>>;

    /// Full record for one id; `CatalogError::NotFound` for unknown ids
    async fn entity_detail(&self, id: EntityId) -> Result<EntityDetail>;

    /// Species record for an entity name
    async fn species(&self, name: &str) -> Result<SpeciesRecord>;

    /// Root of the branch graph at `url` (taken from a species record)
    async fn evolution_chain(&self, url: &str) -> Result<ChainLink>;

    /// Base URL of the image host, used for relationship sprites
    fn sprite_base(&self) -> &str;
}

/// Lets callers pick the implementation at runtime (`Box<dyn PokeApi>`)
#[async_trait]
impl<T: PokeApi + ?Sized> PokeApi for Box<T> {
    async fn list_entities(&self, offset: usize, limit: usize) -> Result<Vec<EntityRef>> {
        (**self).list_entities(offset, limit).await
    }

    async fn category_members(&self, category: Category) -> Result<Vec<EntityRef>> {
        (**self).category_members(category).await
    }

    async fn entity_detail(&self, id: EntityId) -> Result<EntityDetail> {
        (**self).entity_detail(id).await
    }

    async fn species(&self, name: &str) -> Result<SpeciesRecord> {
        (**self).species(name).await
    }

    async fn evolution_chain(&self, url: &str) -> Result<ChainLink> {
        (**self).evolution_chain(url).await
    }

    fn sprite_base(&self) -> &str {
        (**self).sprite_base()
    }
}
