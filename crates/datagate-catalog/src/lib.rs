//! Datagate Catalog Library
//!
//! Resolution of opaque dataset identifiers (DIDs) to physical data
//! locations. The external metadata catalog is consumed as an opaque query
//! service: this crate issues exact-match queries and reads exactly one
//! configured location attribute out of the returned record. Records are
//! fetched per request and never cached.

pub mod client;
pub mod locator;

use thiserror::Error;

/// Catalog operation errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Zero or more-than-one matching records. Both cases indicate a
    /// misconfigured catalog, so they share one coarse error class.
    #[error("expected exactly one record for did {did}, found {found}")]
    AmbiguousOrMissingRecord { did: String, found: usize },

    #[error("no location attribute found among candidates: {0}")]
    LocationAttributeMissing(String),

    #[error("location attribute {attribute} is not a string")]
    AttributeNotText { attribute: String },

    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog returned status {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub use client::{CatalogClient, MetadataRecord, MetadataSource};
pub use locator::Locator;
