use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tracing::{debug, info, warn};

use pantry_types::{fallback_categories, Category};

use crate::source::CategorySource;

/// Display label used when no category filter is active.
pub const ALL_CATEGORIES_LABEL: &str = "All";

/// Where the current working set came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaxonomyOrigin {
    Fallback,
    Remote,
}

/// Handle for one refresh attempt; only the most recent one may apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshToken(u64);

struct WorkingSet {
    categories: Vec<Category>,
    origin: TaxonomyOrigin,
}

/// The category list consumers read from.
///
/// Starts out as the bundled fallback list so the first render never waits
/// on the network. A refresh replaces the list entirely with a non-empty
/// remote result; failures and empty results keep whatever is current.
pub struct Taxonomy {
    state: RwLock<WorkingSet>,
    generation: AtomicU64,
}

impl Taxonomy {
    pub fn new(fallback: Vec<Category>) -> Self {
        Self {
            state: RwLock::new(WorkingSet {
                categories: fallback,
                origin: TaxonomyOrigin::Fallback,
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Working set seeded with the bundled categories.
    pub fn bundled() -> Self {
        Self::new(fallback_categories())
    }

    pub fn categories(&self) -> Vec<Category> {
        self.state.read().expect("taxonomy lock poisoned").categories.clone()
    }

    pub fn origin(&self) -> TaxonomyOrigin {
        self.state.read().expect("taxonomy lock poisoned").origin
    }

    /// Display label for a category key.
    ///
    /// The empty key means "no filter" and renders as
    /// [`ALL_CATEGORIES_LABEL`]. Keys missing from the working set render as
    /// the raw key.
    pub fn label_for(&self, key: &str) -> String {
        if key.is_empty() {
            return ALL_CATEGORIES_LABEL.to_string();
        }
        let state = self.state.read().expect("taxonomy lock poisoned");
        state
            .categories
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.label.clone())
            .unwrap_or_else(|| key.to_string())
    }

    /// Start a refresh; any token handed out earlier becomes stale.
    pub fn begin_refresh(&self) -> RefreshToken {
        RefreshToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Install a remote list fetched under `token`.
    ///
    /// Returns `false` (and changes nothing) if the token is stale or the
    /// list is empty.
    pub fn apply_remote(&self, token: RefreshToken, categories: Vec<Category>) -> bool {
        if categories.is_empty() {
            return false;
        }
        let mut state = self.state.write().expect("taxonomy lock poisoned");
        if self.generation.load(Ordering::SeqCst) != token.0 {
            debug!(token = token.0, "discarding stale taxonomy result");
            return false;
        }
        state.categories = categories;
        state.origin = TaxonomyOrigin::Remote;
        true
    }

    /// Fetch from `source` once and install the result if it is usable.
    ///
    /// Network failures are logged and absorbed; the caller only learns
    /// which list is now in effect.
    pub async fn refresh<S>(&self, source: &S) -> TaxonomyOrigin
    where
        S: CategorySource + ?Sized,
    {
        let token = self.begin_refresh();
        match source.fetch_remote().await {
            Ok(categories) if categories.is_empty() => {
                info!("remote taxonomy had no usable entries; keeping current list");
            }
            Ok(categories) => {
                let count = categories.len();
                if self.apply_remote(token, categories) {
                    info!(count, "remote taxonomy installed");
                }
            }
            Err(e) => {
                warn!(error = %e, "remote taxonomy unavailable; keeping current list");
            }
        }
        self.origin()
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::bundled()
    }
}

impl std::fmt::Debug for Taxonomy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().expect("taxonomy lock poisoned");
        f.debug_struct("Taxonomy")
            .field("count", &state.categories.len())
            .field("origin", &state.origin)
            .finish()
    }
}

/// The category list a consumer should use after consulting `source` once:
/// the remote list when usable, otherwise `fallback`. Never merges.
pub async fn resolve_categories<S>(source: &S, fallback: Vec<Category>) -> Vec<Category>
where
    S: CategorySource + ?Sized,
{
    let taxonomy = Taxonomy::new(fallback);
    taxonomy.refresh(source).await;
    taxonomy.categories()
}
