//! Detail view
//!
//! One entity plus its relationship levels. Unknown ids are `NotFound`; a
//! missing evolution chain is just an empty tree.

use pokedex_types::{EntityDetail, EntityId, RelationshipLevel};
use serde::Serialize;

use crate::api::PokeApi;
use crate::error::{CatalogError, Result};
use crate::relationships::RelationshipTreeBuilder;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailPage {
    pub detail: EntityDetail,
    pub levels: Vec<RelationshipLevel>,
}

impl DetailPage {
    pub fn has_relationships(&self) -> bool {
        !self.levels.is_empty()
    }
}

pub struct DetailView<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: PokeApi + ?Sized> DetailView<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    pub async fn get_detail(&self, id: EntityId) -> Result<EntityDetail> {
        if id == 0 {
            return Err(CatalogError::not_found("/pokemon/0"));
        }
        self.api.entity_detail(id).await
    }

    /// Detail plus whatever relationship levels can be built
    pub async fn open(&self, id: EntityId) -> Result<DetailPage> {
        let detail = self.get_detail(id).await?;
        let levels = RelationshipTreeBuilder::new(self.api)
            .build_tree(&detail.name)
            .await;
        Ok(DetailPage { detail, levels })
    }

    /// `open` for a raw route segment such as `"25"`
    pub async fn open_route(&self, raw: &str) -> Result<DetailPage> {
        let id = parse_route_id(raw)?;
        self.open(id).await
    }
}

/// Route segments that are not a positive integer name no entity
pub fn parse_route_id(raw: &str) -> Result<EntityId> {
    raw.trim()
        .parse::<EntityId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CatalogError::not_found(format!("/pokemon/{}", raw)))
}
