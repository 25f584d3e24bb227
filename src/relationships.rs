//! Relationship (evolution) tree extraction
//!
//! Entity name → species record → evolution chain URL → branch graph. The
//! graph is flattened into levels by depth: level `d` holds every species at
//! depth `d` across all branches, in pre-order encounter order.

use pokedex_types::{extract_id_from_url, sprite_url, RelationshipLevel, RelationshipNode};

use crate::api::{ChainLink, PokeApi};
use crate::error::{CatalogError, Result};

pub struct RelationshipTreeBuilder<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: PokeApi + ?Sized> RelationshipTreeBuilder<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Levels for `entity_name`; empty when species or chain lookup fails
    pub async fn build_tree(&self, entity_name: &str) -> Vec<RelationshipLevel> {
        match self.try_build_tree(entity_name).await {
            Ok(levels) => levels,
            Err(e) => {
                tracing::warn!(
                    entity = entity_name,
                    error = %e,
                    "No relationship data; showing empty chain"
                );
                vec![]
            }
        }
    }

    pub async fn try_build_tree(&self, entity_name: &str) -> Result<Vec<RelationshipLevel>> {
        let species = self.api.species(entity_name).await?;
        let chain_url = species
            .evolution_chain_url()
            .ok_or_else(|| CatalogError::not_found(format!("evolution chain for {}", species.name)))?;
        let root = self.api.evolution_chain(chain_url).await?;
        Ok(flatten_chain(&root, self.api.sprite_base()))
    }
}

/// Group a branch graph by depth using an explicit worklist.
///
/// Children are pushed in reverse so the stack pops them in their original
/// order, which keeps the traversal pre-order.
pub fn flatten_chain(root: &ChainLink, sprite_base: &str) -> Vec<RelationshipLevel> {
    let mut levels: Vec<RelationshipLevel> = Vec::new();
    let mut worklist: Vec<(&ChainLink, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = worklist.pop() {
        if levels.len() <= depth {
            levels.push(RelationshipLevel {
                depth,
                members: vec![],
            });
        }
        levels[depth].members.push(node_for(node, sprite_base));

        for child in node.evolves_to.iter().rev() {
            worklist.push((child, depth + 1));
        }
    }

    levels
}

fn node_for(link: &ChainLink, sprite_base: &str) -> RelationshipNode {
    let image_url = match extract_id_from_url(&link.species.url) {
        Some(id) => sprite_url(sprite_base, id),
        None => {
            tracing::debug!(species = %link.species.name, "Species URL has no id; no sprite");
            String::new()
        }
    };
    RelationshipNode {
        species_name: link.species.name.clone(),
        image_url,
    }
}
