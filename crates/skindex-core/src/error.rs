use std::fmt;

use thiserror::Error;

/// Any failure reading or writing a collection.
///
/// Missing files, malformed JSON and disk errors all land here; callers only
/// get the collection name and a description of the cause.
#[derive(Debug, Error)]
#[error("collection {collection}: {cause}")]
pub struct StoreError {
    pub collection: String,
    pub cause: String,
}

impl StoreError {
    pub fn new(collection: &str, cause: impl fmt::Display) -> Self {
        Self {
            collection: collection.to_string(),
            cause: cause.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures talking to the catalog API. "Not found" is not an error.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("catalog API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse catalog response: {0}")]
    Parse(String),

    #[error("catalog client not configured: {0}")]
    NotConfigured(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
