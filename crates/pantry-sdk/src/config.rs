use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use pantry_storage::DEFAULT_STORAGE_KEY;
use pantry_store::StoreConfig;
use pantry_taxonomy::{DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_TAXONOMY_URL};

use crate::error::{SdkError, SdkResult};

/// Catalog settings, usually read from a `pantry.toml`. Missing fields take
/// their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory holding the durable recipe record.
    pub data_dir: PathBuf,
    /// Name of the durable record inside `data_dir`.
    pub storage_key: String,
    pub taxonomy_url: String,
    pub fetch_timeout_ms: u64,
    /// Set to `false` to always use the bundled category list.
    pub fetch_remote_taxonomy: bool,
    pub reset_on_launch: bool,
    pub seed_when_empty: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".pantry"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            taxonomy_url: DEFAULT_TAXONOMY_URL.to_string(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            fetch_remote_taxonomy: true,
            reset_on_launch: false,
            seed_when_empty: true,
        }
    }
}

impl CatalogConfig {
    pub fn from_toml_str(input: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(input).map_err(|e| SdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// The subset of settings the recipe store consumes.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            reset_on_launch: self.reset_on_launch,
            seed_when_empty: self.seed_when_empty,
        }
    }

    fn validate(&self) -> SdkResult<()> {
        if self.storage_key.trim().is_empty() {
            return Err(SdkError::Config("storage_key must not be empty".into()));
        }
        if self.fetch_remote_taxonomy && self.taxonomy_url.trim().is_empty() {
            return Err(SdkError::Config(
                "taxonomy_url must be set when fetch_remote_taxonomy is enabled".into(),
            ));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(SdkError::Config("fetch_timeout_ms must be positive".into()));
        }
        Ok(())
    }
}
