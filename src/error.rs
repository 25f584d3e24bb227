//! Error types for the catalog client
//!
//! Every failure is handled once, locally, with a safe default where one
//! exists. These variants let callers tell the cases apart.

use thiserror::Error;

/// Main error type for the catalog client
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Network failure or non-success status on a list or detail call
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Upstream returned 404 for the requested resource
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Response body could not be decoded into the expected shape
    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The persisted favorites slot holds something other than an id array
    #[error("Store slot '{slot}' is malformed: {reason}")]
    MalformedStore { slot: String, reason: String },

    #[error("Store I/O error: {0}")]
    Store(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CatalogError {
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
