//! Catalog page fetching
//!
//! Global listing is paged by `(cursor, page_size)`. A category listing is
//! always the full member list in one call; the upstream API does not page
//! it, and the cursor is ignored.

use pokedex_types::{Category, EntityRef};

use crate::api::PokeApi;
use crate::error::{CatalogError, Result};

pub struct CatalogFetcher<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: PokeApi + ?Sized> CatalogFetcher<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    pub async fn fetch_page(
        &self,
        cursor: usize,
        page_size: usize,
        category: Option<Category>,
    ) -> Result<Vec<EntityRef>> {
        if page_size == 0 {
            return Err(CatalogError::Config(
                "page size must be greater than zero".to_string(),
            ));
        }

        let refs = match category {
            None => self.api.list_entities(cursor, page_size).await?,
            Some(category) => {
                let members = self.api.category_members(category).await?;
                tracing::debug!(
                    category = %category,
                    members = members.len(),
                    "Fetched full category listing"
                );
                members
            }
        };

        Ok(drop_unaddressable(refs))
    }
}

/// Refs whose URL carries no usable id cannot be linked or starred
fn drop_unaddressable(refs: Vec<EntityRef>) -> Vec<EntityRef> {
    let before = refs.len();
    let kept: Vec<EntityRef> = refs.into_iter().filter(|r| r.id().is_some()).collect();
    if kept.len() != before {
        tracing::warn!(
            dropped = before - kept.len(),
            "Dropped entity refs without a numeric id"
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FixtureApi, FixtureCatalog};

    fn api_with(n: u32) -> FixtureApi {
        let mut catalog = FixtureCatalog::new();
        for id in 1..=n {
            catalog = catalog.with_entity(id, &format!("entity-{}", id), &["normal"]);
        }
        FixtureApi::new(catalog.with_category(Category::Fire, &[4, 5, 6, 37, 38]))
    }

    #[tokio::test]
    async fn test_global_page_is_requested_slice() {
        let api = api_with(50);
        let page = CatalogFetcher::new(&api).fetch_page(20, 20, None).await.unwrap();
        let ids: Vec<_> = page.iter().filter_map(EntityRef::id).collect();
        assert_eq!(ids, (21..=40).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_last_page_is_short() {
        let api = api_with(45);
        let page = CatalogFetcher::new(&api).fetch_page(40, 20, None).await.unwrap();
        assert_eq!(page.len(), 5);
    }

    #[tokio::test]
    async fn test_category_ignores_cursor_and_page_size() {
        let api = api_with(50);
        let fetcher = CatalogFetcher::new(&api);
        let from_start = fetcher.fetch_page(0, 2, Some(Category::Fire)).await.unwrap();
        let from_far = fetcher.fetch_page(400, 1, Some(Category::Fire)).await.unwrap();
        assert_eq!(from_start.len(), 5);
        assert_eq!(from_start, from_far);
        assert_eq!(api.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_zero_page_size_rejected_without_request() {
        let api = api_with(5);
        let err = CatalogFetcher::new(&api).fetch_page(0, 0, None).await.unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
        assert_eq!(api.list_calls(), 0);
    }

    #[test]
    fn test_unaddressable_refs_dropped() {
        let refs = vec![
            EntityRef::new("ok", "https://pokeapi.co/api/v2/pokemon/1/"),
            EntityRef::new("broken", "https://pokeapi.co/api/v2/pokemon/"),
        ];
        assert_eq!(drop_unaddressable(refs).len(), 1);
    }
}
