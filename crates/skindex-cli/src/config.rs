//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$SKINDEX_CONFIG` environment variable
//! 2. `~/.config/skindex/config.toml`
//! 3. Built-in defaults (everything is optional)
//!
//! `$SKINDEX_API_KEY` overrides `[api].api_key`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use skindex_api::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub api: ApiSection,
}

/// Local history storage.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the collection files. Default: platform data dir.
    pub path: Option<String>,
}

/// Catalog API access.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Language code passed as `lang`.
    pub lang: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: None,
            lang: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiSection {
    pub fn to_api_config(&self) -> ApiConfig {
        ApiConfig {
            api_key: self.api_key.clone().unwrap_or_default(),
            base_url: self.base_url.clone(),
            lang: self.lang.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    let mut config = match config_path() {
        Some(p) if p.exists() => {
            let content =
                std::fs::read_to_string(&p).with_context(|| format!("reading {}", p.display()))?;
            toml::from_str(&content).with_context(|| format!("parsing {}", p.display()))?
        }
        _ => Config::default(),
    };

    if let Ok(key) = std::env::var("SKINDEX_API_KEY") {
        if !key.trim().is_empty() {
            config.api.api_key = Some(key);
        }
    }

    Ok(config)
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("SKINDEX_CONFIG") {
        return Some(PathBuf::from(p));
    }

    dirs_home().map(|home| home.join(".config").join("skindex").join("config.toml"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Show the active config path (for `skindex config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}

/// Keep the first four characters of a key, hide the rest.
pub fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    if key.chars().count() <= 4 {
        "****".into()
    } else {
        format!("{visible}****")
    }
}
