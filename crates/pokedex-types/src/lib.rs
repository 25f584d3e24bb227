//! Pokedex Types - Foundation Catalog Types
//!
//! Pure data structures shared by the catalog client, the view state machine
//! and the terminal front end. Nothing in here talks to the network or the
//! filesystem.
//!
//! ## Contents
//!
//! - Entity references and details as the catalog API describes them
//! - The fixed category (type) enumeration
//! - The favorites set persisted by the client
//! - Relationship (evolution) levels produced by the tree builder
//!
//! ## Rules
//!
//! 1. **NO I/O** - the HTTP client and stores live in the `pokedex` crate
//! 2. **SERIALIZABLE** - every type supports serde
//! 3. **NO WORKSPACE DEPENDENCIES**

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Numeric catalog identifier (the trailing path segment of an entity URL)
pub type EntityId = u32;

// ============================================================================
// ENTITIES
// ============================================================================

/// Lightweight entity reference as returned by list endpoints
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub name: String,
    pub url: String,
}

impl EntityRef {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Numeric id parsed from the trailing `/<id>/` segment of `url`
    pub fn id(&self) -> Option<EntityId> {
        extract_id_from_url(&self.url)
    }
}

/// Fully fetched entity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDetail {
    pub id: EntityId,
    pub name: String,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    /// Type names in slot order
    pub types: Vec<String>,
    pub image_url: String,
}

impl EntityDetail {
    pub fn height_m(&self) -> f64 {
        f64::from(self.height) / 10.0
    }

    pub fn weight_kg(&self) -> f64 {
        f64::from(self.weight) / 10.0
    }
}

/// Extract the numeric id from a resource URL like
/// "https://pokeapi.co/api/v2/pokemon/25/".
///
/// Returns `None` unless the last non-empty segment is a positive integer.
pub fn extract_id_from_url(url: &str) -> Option<EntityId> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<EntityId>().ok())
        .filter(|id| *id > 0)
}

/// Sprite location for an id on the image host: `{base}/{id}.png`
pub fn sprite_url(base: &str, id: EntityId) -> String {
    format!("{}/{}.png", base.trim_end_matches('/'), id)
}

// ============================================================================
// CATEGORIES
// ============================================================================

/// Category (elemental type) used to filter the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Psychic,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl Category {
    /// Every selectable category, in display order
    pub const ALL: [Category; 16] = [
        Category::Normal,
        Category::Fire,
        Category::Water,
        Category::Grass,
        Category::Electric,
        Category::Ice,
        Category::Fighting,
        Category::Poison,
        Category::Ground,
        Category::Psychic,
        Category::Rock,
        Category::Ghost,
        Category::Dragon,
        Category::Dark,
        Category::Steel,
        Category::Fairy,
    ];

    /// Name used by the remote API (`/type/{name}`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Grass => "grass",
            Self::Electric => "electric",
            Self::Ice => "ice",
            Self::Fighting => "fighting",
            Self::Poison => "poison",
            Self::Ground => "ground",
            Self::Psychic => "psychic",
            Self::Rock => "rock",
            Self::Ghost => "ghost",
            Self::Dragon => "dragon",
            Self::Dark => "dark",
            Self::Steel => "steel",
            Self::Fairy => "fairy",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct CategoryParseError(pub String);

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

// ============================================================================
// FAVORITES
// ============================================================================

/// Set of favorite entity ids.
///
/// Serializes as a JSON array of integers. Duplicates in stored data collapse
/// on load; iteration is in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet(BTreeSet<EntityId>);

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.0.contains(&id)
    }

    /// Copy of this set with `id` removed if present, otherwise added
    pub fn toggled(&self, id: EntityId) -> Self {
        let mut next = self.0.clone();
        if !next.remove(&id) {
            next.insert(id);
        }
        Self(next)
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl FromIterator<EntityId> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// RELATIONSHIP TREE
// ============================================================================

/// One species at some depth of an evolution chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipNode {
    pub species_name: String,
    pub image_url: String,
}

/// All species found at one depth of the chain, in pre-order encounter order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipLevel {
    /// 0 = root of the chain
    pub depth: usize,
    pub members: Vec<RelationshipNode>,
}

impl RelationshipLevel {
    pub fn names(&self) -> Vec<&str> {
        self.members
            .iter()
            .map(|m| m.species_name.as_str())
            .collect()
    }
}
