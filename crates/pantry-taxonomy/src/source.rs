use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use pantry_types::Category;

use crate::document::parse_category_document;
use crate::error::{TaxonomyError, TaxonomyResult};

/// Location of the published taxonomy document.
pub const DEFAULT_TAXONOMY_URL: &str =
    "https://raw.githubusercontent.com/anson-liew/fourtitude-mobile-test/refs/heads/main/src/assets/data/recipetypes.remote.json";

/// Request timeout for the taxonomy fetch.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;

/// Somewhere a category list can be fetched from.
#[async_trait]
pub trait CategorySource: Send + Sync {
    /// Fetch the category list once.
    ///
    /// Fails with [`TaxonomyError::Network`] on transport failure or a
    /// non-success status. A response that does not hold a usable list is
    /// `Ok` with an empty vector.
    async fn fetch_remote(&self) -> TaxonomyResult<Vec<Category>>;
}

#[async_trait]
impl<T: CategorySource + ?Sized> CategorySource for Arc<T> {
    async fn fetch_remote(&self) -> TaxonomyResult<Vec<Category>> {
        (**self).fetch_remote().await
    }
}

/// [`CategorySource`] that issues a single HTTP GET to a fixed URL.
#[derive(Clone, Debug)]
pub struct HttpCategorySource {
    url: String,
    http: reqwest::Client,
}

impl HttpCategorySource {
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> TaxonomyResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms.max(1)))
            .build()
            .map_err(|e| TaxonomyError::Client(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }

    /// Source for [`DEFAULT_TAXONOMY_URL`] with the default timeout.
    pub fn published() -> TaxonomyResult<Self> {
        Self::new(DEFAULT_TAXONOMY_URL, DEFAULT_FETCH_TIMEOUT_MS)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CategorySource for HttpCategorySource {
    async fn fetch_remote(&self) -> TaxonomyResult<Vec<Category>> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TaxonomyError::Network {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaxonomyError::Network {
                status: Some(status.as_u16()),
                message: format!("failed to fetch recipe categories: {status}"),
            });
        }

        let body = response.bytes().await.map_err(|e| TaxonomyError::Network {
            status: Some(status.as_u16()),
            message: e.to_string(),
        })?;

        let categories = parse_category_document(&body);
        debug!(url = %self.url, count = categories.len(), "taxonomy document fetched");
        Ok(categories)
    }
}
