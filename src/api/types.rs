//! PokeAPI v2 response types
//! Only the fields the catalog reads are mapped; everything else is ignored.
//!
//! Reference: https://pokeapi.co/docs/v2

use pokedex_types::{EntityDetail, EntityRef};
use serde::{Deserialize, Serialize};

/// `{ name, url }` pointer used throughout the API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

impl From<NamedResource> for EntityRef {
    fn from(resource: NamedResource) -> Self {
        EntityRef::new(resource.name, resource.url)
    }
}

/// `GET /pokemon?limit&offset`
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<NamedResource>,
}

/// `GET /type/{name}`
#[derive(Debug, Clone, Deserialize)]
pub struct TypeResponse {
    pub name: String,
    pub pokemon: Vec<TypeMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeMember {
    #[serde(default)]
    pub slot: Option<u32>,
    pub pokemon: NamedResource,
}

/// `GET /pokemon/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonResponse {
    pub id: u32,
    pub name: String,
    pub height: u32,
    pub weight: u32,
    pub types: Vec<PokemonTypeSlot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PokemonTypeSlot {
    pub slot: u32,
    #[serde(rename = "type")]
    pub type_ref: NamedResource,
}

impl PokemonResponse {
    /// Convert into the catalog's detail record; sprite URL comes from the image host
    pub fn into_detail(mut self, sprite_base: &str) -> EntityDetail {
        self.types.sort_by_key(|t| t.slot);
        EntityDetail {
            id: self.id,
            image_url: pokedex_types::sprite_url(sprite_base, self.id),
            name: self.name,
            height: self.height,
            weight: self.weight,
            types: self.types.into_iter().map(|t| t.type_ref.name).collect(),
        }
    }
}

/// `GET /pokemon-species/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SpeciesRecord {
    pub name: String,
    /// Absent for a handful of species the API never linked to a chain
    #[serde(default)]
    pub evolution_chain: Option<ApiResourceLink>,
}

impl SpeciesRecord {
    pub fn evolution_chain_url(&self) -> Option<&str> {
        self.evolution_chain.as_ref().map(|link| link.url.as_str())
    }
}

/// Unnamed pointer (`{ url }`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiResourceLink {
    pub url: String,
}

/// `GET {evolution_chain.url}`
#[derive(Debug, Clone, Deserialize)]
pub struct EvolutionChainResponse {
    #[serde(default)]
    pub id: Option<u32>,
    pub chain: ChainLink,
}

/// One node of the branch graph: a species plus the forms it evolves into
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChainLink {
    pub species: NamedResource,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

impl ChainLink {
    pub fn leaf(species: NamedResource) -> Self {
        Self {
            species,
            evolves_to: vec![],
        }
    }

    pub fn with_children(species: NamedResource, evolves_to: Vec<ChainLink>) -> Self {
        Self {
            species,
            evolves_to,
        }
    }
}
