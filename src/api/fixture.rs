//! In-process catalog
//!
//! Serves a catalog held in memory through the same `PokeApi` trait as the
//! HTTP client. Used by the test suites and by the CLI's `--offline` mode,
//! which loads a `FixtureCatalog` from a JSON file.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use pokedex_types::{Category, EntityDetail, EntityId, EntityRef};
use serde::{Deserialize, Serialize};

use super::types::{ChainLink, SpeciesRecord};
use super::PokeApi;
use crate::config::{DEFAULT_API_BASE, DEFAULT_SPRITE_BASE};
use crate::error::{CatalogError, Result};

/// Catalog contents served by `FixtureApi`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCatalog {
    /// Prefix for the entity URLs handed out in list results
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_sprite_base")]
    pub sprite_base: String,
    /// Global list; served in ascending id order
    #[serde(default)]
    pub entities: Vec<EntityDetail>,
    /// Category → member ids, in membership order
    #[serde(default)]
    pub categories: BTreeMap<Category, Vec<EntityId>>,
    /// Entity name → species record
    #[serde(default)]
    pub species: BTreeMap<String, SpeciesRecord>,
    /// Evolution chain URL → root of the branch graph
    #[serde(default)]
    pub chains: BTreeMap<String, ChainLink>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_sprite_base() -> String {
    DEFAULT_SPRITE_BASE.to_string()
}

impl Default for FixtureCatalog {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            sprite_base: default_sprite_base(),
            entities: vec![],
            categories: BTreeMap::new(),
            species: BTreeMap::new(),
            chains: BTreeMap::new(),
        }
    }
}

impl FixtureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| CatalogError::Decode {
            url: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Add an entity with the given id, name and types
    pub fn with_entity(mut self, id: EntityId, name: &str, types: &[&str]) -> Self {
        let image_url = pokedex_types::sprite_url(&self.sprite_base, id);
        self.entities.push(EntityDetail {
            id,
            name: name.to_string(),
            height: 10,
            weight: 100,
            types: types.iter().map(|t| t.to_string()).collect(),
            image_url,
        });
        self
    }

    pub fn with_category(mut self, category: Category, members: &[EntityId]) -> Self {
        self.categories.insert(category, members.to_vec());
        self
    }

    /// Link an entity name to a species whose chain lives at `chain_url`
    pub fn with_species(mut self, entity_name: &str, chain_url: Option<&str>) -> Self {
        let record = SpeciesRecord {
            name: entity_name.to_string(),
            evolution_chain: chain_url.map(|url| super::types::ApiResourceLink {
                url: url.to_string(),
            }),
        };
        self.species.insert(entity_name.to_string(), record);
        self
    }

    pub fn with_chain(mut self, chain_url: &str, root: ChainLink) -> Self {
        self.chains.insert(chain_url.to_string(), root);
        self
    }

    /// URL the API would hand out for an entity id
    pub fn entity_url(&self, id: EntityId) -> String {
        format!("{}/pokemon/{}/", self.api_base.trim_end_matches('/'), id)
    }

    /// URL the API would hand out for a species id
    pub fn species_url(&self, id: EntityId) -> String {
        format!("{}/pokemon-species/{}/", self.api_base.trim_end_matches('/'), id)
    }

    fn entity_ref(&self, entity: &EntityDetail) -> EntityRef {
        EntityRef::new(entity.name.clone(), self.entity_url(entity.id))
    }
}

/// `PokeApi` over a `FixtureCatalog`, with failure injection and call counters
pub struct FixtureApi {
    catalog: FixtureCatalog,
    fail_lists: AtomicBool,
    failing_details: HashSet<EntityId>,
    list_calls: AtomicUsize,
    category_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl FixtureApi {
    pub fn new(mut catalog: FixtureCatalog) -> Self {
        catalog.entities.sort_by_key(|e| e.id);
        catalog.entities.dedup_by_key(|e| e.id);
        Self {
            catalog,
            fail_lists: AtomicBool::new(false),
            failing_details: HashSet::new(),
            list_calls: AtomicUsize::new(0),
            category_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(FixtureCatalog::from_json_file(path)?))
    }

    /// Detail lookups for `id` fail with a fetch error
    pub fn failing_detail(mut self, id: EntityId) -> Self {
        self.failing_details.insert(id);
        self
    }

    /// Make list and category calls fail (or succeed again)
    pub fn set_list_failure(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn catalog(&self) -> &FixtureCatalog {
        &self.catalog
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn category_calls(&self) -> usize {
        self.category_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    fn check_list_failure(&self, what: &str) -> Result<()> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(CatalogError::fetch(what, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl PokeApi for FixtureApi {
    async fn list_entities(&self, offset: usize, limit: usize) -> Result<Vec<EntityRef>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_list_failure("fixture:/pokemon")?;

        Ok(self
            .catalog
            .entities
            .iter()
            .skip(offset)
            .take(limit)
            .map(|e| self.catalog.entity_ref(e))
            .collect())
    }

    async fn category_members(&self, category: Category) -> Result<Vec<EntityRef>> {
        self.category_calls.fetch_add(1, Ordering::SeqCst);
        self.check_list_failure(&format!("fixture:/type/{}", category))?;

        let members = self
            .catalog
            .categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default();

        Ok(members
            .iter()
            .filter_map(|id| self.catalog.entities.iter().find(|e| e.id == *id))
            .map(|e| self.catalog.entity_ref(e))
            .collect())
    }

    async fn entity_detail(&self, id: EntityId) -> Result<EntityDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_details.contains(&id) {
            return Err(CatalogError::fetch(
                format!("fixture:/pokemon/{}", id),
                "injected failure",
            ));
        }

        self.catalog
            .entities
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(format!("/pokemon/{}", id)))
    }

    async fn species(&self, name: &str) -> Result<SpeciesRecord> {
        self.catalog
            .species
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(format!("/pokemon-species/{}", name)))
    }

    async fn evolution_chain(&self, url: &str) -> Result<ChainLink> {
        self.catalog
            .chains
            .get(url)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(url.to_string()))
    }

    fn sprite_base(&self) -> &str {
        &self.catalog.sprite_base
    }
}
