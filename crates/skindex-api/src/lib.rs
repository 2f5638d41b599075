pub mod client;
pub mod response;

pub use client::{ApiConfig, CatalogClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
