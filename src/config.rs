//! Runtime configuration
//!
//! Values come from `POKEDEX_*` environment variables (a `.env` file is
//! loaded by the binary first). CLI flags override individual fields.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{CatalogError, Result};

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_SPRITE_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_STORE_PATH: &str = ".pokedex/store.json";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct PokedexConfig {
    pub api_base: Url,
    pub sprite_base: String,
    pub page_size: usize,
    pub store_path: PathBuf,
    pub http_timeout: Duration,
    /// Minimum spacing between outgoing requests; zero disables rate limiting
    pub min_request_interval: Duration,
}

impl Default for PokedexConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            sprite_base: DEFAULT_SPRITE_BASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            min_request_interval: Duration::ZERO,
        }
    }
}

impl PokedexConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (unset keys use defaults)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("POKEDEX_API_BASE") {
            config.api_base = parse_base_url("POKEDEX_API_BASE", &raw)?;
        }
        if let Some(raw) = lookup("POKEDEX_SPRITE_BASE") {
            parse_base_url("POKEDEX_SPRITE_BASE", &raw)?;
            config.sprite_base = raw.trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup("POKEDEX_PAGE_SIZE") {
            config.page_size = parse_number("POKEDEX_PAGE_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("POKEDEX_STORE_PATH") {
            config.store_path = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("POKEDEX_HTTP_TIMEOUT_SECS") {
            config.http_timeout =
                Duration::from_secs(parse_number("POKEDEX_HTTP_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = lookup("POKEDEX_MIN_REQUEST_INTERVAL_MS") {
            config.min_request_interval =
                Duration::from_millis(parse_number("POKEDEX_MIN_REQUEST_INTERVAL_MS", &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(CatalogError::Config(
                "POKEDEX_PAGE_SIZE must be greater than zero".to_string(),
            ));
        }
        if self.http_timeout.is_zero() {
            return Err(CatalogError::Config(
                "POKEDEX_HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_base_url(key: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| CatalogError::Config(format!("{} is not a valid URL: {}", key, e)))?;
    if url.cannot_be_a_base() {
        return Err(CatalogError::Config(format!(
            "{} cannot be used as a base URL: {}",
            key, raw
        )));
    }
    Ok(url)
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| CatalogError::Config(format!("{} must be a non-negative integer, got '{}'", key, raw)))
}
