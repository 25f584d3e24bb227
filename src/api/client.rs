//! PokeAPI HTTP client
//!
//! Plain JSON GETs against the public API. A 404 on a single resource maps
//! to `NotFound`; a 404 on a listing, any other non-success status or a
//! transport failure maps to `Fetch`. No retries.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use pokedex_types::{Category, EntityDetail, EntityId, EntityRef};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::sleep;
use url::Url;

use super::types::{
    ChainLink, EvolutionChainResponse, PageResponse, PokemonResponse, SpeciesRecord, TypeResponse,
};
use super::PokeApi;
use crate::config::PokedexConfig;
use crate::error::{CatalogError, Result};

const USER_AGENT: &str = concat!("pokedex/", env!("CARGO_PKG_VERSION"));
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

pub struct HttpPokeApi {
    client: Client,
    base: Url,
    sprite_base: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl HttpPokeApi {
    pub fn new(config: &PokedexConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: config.api_base.clone(),
            sprite_base: config.sprite_base.clone(),
            min_interval: config.min_request_interval,
            last_request: Mutex::new(None),
        })
    }

    /// Space requests by at least `min_interval` (no-op when zero)
    async fn rate_limit(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// `{base}/{segments...}`
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::Config(format!("API base is not a base URL: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.rate_limit().await;
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CatalogError::fetch(url.as_str(), e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::not_found(url.path()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::fetch(
                url.as_str(),
                format!("{}: {}", status, preview(&body)),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| CatalogError::fetch(url.as_str(), e))?;

        serde_json::from_str(&text).map_err(|e| CatalogError::Decode {
            url: url.to_string(),
            reason: format!("{}. Body starts: {}", e, preview(&text)),
        })
    }

    /// `get_json` for list endpoints: a missing listing is a fetch failure,
    /// not a missing entity
    async fn get_listing<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let url_text = url.to_string();
        self.get_json(url).await.map_err(|e| match e {
            CatalogError::NotFound { .. } => CatalogError::fetch(url_text, StatusCode::NOT_FOUND),
            other => other,
        })
    }
}

#[async_trait]
impl PokeApi for HttpPokeApi {
    async fn list_entities(&self, offset: usize, limit: usize) -> Result<Vec<EntityRef>> {
        if limit == 0 {
            return Ok(vec![]);
        }

        let mut url = self.endpoint(&["pokemon"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        let page: PageResponse = self.get_listing(url).await?;
        tracing::debug!(
            offset,
            limit,
            returned = page.results.len(),
            total = ?page.count,
            "Fetched entity page"
        );

        Ok(page.results.into_iter().map(EntityRef::from).collect())
    }

    async fn category_members(&self, category: Category) -> Result<Vec<EntityRef>> {
        let url = self.endpoint(&["type", category.as_str()])?;
        let listing: TypeResponse = self.get_listing(url).await?;

        Ok(listing
            .pokemon
            .into_iter()
            .map(|member| EntityRef::from(member.pokemon))
            .collect())
    }

    async fn entity_detail(&self, id: EntityId) -> Result<EntityDetail> {
        let url = self.endpoint(&["pokemon", &id.to_string()])?;
        let record: PokemonResponse = self.get_json(url).await?;
        Ok(record.into_detail(&self.sprite_base))
    }

    async fn species(&self, name: &str) -> Result<SpeciesRecord> {
        let url = self.endpoint(&["pokemon-species", &name.to_ascii_lowercase()])?;
        self.get_json(url).await
    }

    async fn evolution_chain(&self, url: &str) -> Result<ChainLink> {
        let parsed =
            Url::parse(url).map_err(|e| CatalogError::fetch(url, format!("invalid URL: {}", e)))?;
        let response: EvolutionChainResponse = self.get_json(parsed).await?;
        Ok(response.chain)
    }

    fn sprite_base(&self) -> &str {
        &self.sprite_base
    }
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect()
}
