//! Blocking client for the fortniteapi.io item endpoints.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use skindex_core::{filter_by_name, Catalog, CatalogError, CatalogResult, Item};

use crate::response::{parse_details, ListResponse};

pub const DEFAULT_BASE_URL: &str = "https://fortniteapi.io/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Catalog client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Sent verbatim in the `Authorization` header.
    pub api_key: String,
    pub base_url: String,
    /// Optional `lang` query parameter.
    pub lang: Option<String>,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub struct CatalogClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    lang: Option<String>,
}

/// Outcome of one GET: a decoded body, or the server saying 404.
enum Fetched<T> {
    Found(T),
    NotFound,
}

impl CatalogClient {
    pub fn new(config: ApiConfig) -> CatalogResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(CatalogError::NotConfigured(
                "API key is required (set [api].api_key or SKINDEX_API_KEY)".to_string(),
            ));
        }

        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();

        Ok(Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            lang: config.lang,
        })
    }

    fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> CatalogResult<Fetched<T>> {
        let url = format!("{}/{endpoint}", self.base_url);

        let mut request = self
            .agent
            .get(&url)
            .set("Authorization", &self.api_key)
            .set("Accept", "application/json");
        for (key, value) in params {
            request = request.query(key, value);
        }
        if let Some(lang) = &self.lang {
            request = request.query("lang", lang);
        }

        match request.call() {
            Ok(response) => {
                let body = response
                    .into_json::<T>()
                    .map_err(|e| CatalogError::Parse(format!("{endpoint}: {e}")))?;
                Ok(Fetched::Found(body))
            }
            Err(ureq::Error::Status(404, _)) => {
                debug!("{endpoint}: 404 not found");
                Ok(Fetched::NotFound)
            }
            Err(ureq::Error::Status(status, response)) => Err(CatalogError::Api {
                status,
                message: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(t)) => Err(CatalogError::Transport(t.to_string())),
        }
    }
}

impl Catalog for CatalogClient {
    fn search_by_keyword(&self, keyword: &str) -> CatalogResult<Vec<Item>> {
        debug!("catalog search: keyword='{keyword}'");

        let response: ListResponse = match self.get("items/list", &[("search", keyword)])? {
            Fetched::Found(r) => r,
            Fetched::NotFound => return Ok(Vec::new()),
        };

        // The server-side filter is loose, so narrow the results again here.
        let items = filter_by_name(response.into_items(), keyword);
        debug!("catalog search: {} items after filtering", items.len());
        Ok(items)
    }

    fn get_details_by_id(&self, id: &str) -> CatalogResult<Item> {
        debug!("catalog get: id={id}");

        let body: serde_json::Value = match self.get("items/get", &[("id", id)])? {
            Fetched::Found(b) => b,
            Fetched::NotFound => return Ok(Item::default()),
        };

        parse_details(body).map_err(|e| CatalogError::Parse(format!("items/get: {e}")))
    }
}
