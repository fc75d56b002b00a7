use std::collections::HashSet;

use tracing::{debug, warn};

use pantry_types::Recipe;

use crate::codec::{decode_collection, encode_collection};
use crate::error::StorageResult;
use crate::traits::BlobStore;

/// Key under which the collection record is stored by default.
pub const DEFAULT_STORAGE_KEY: &str = "RECIPES_V1";

/// Persistence adapter for the whole recipe collection.
///
/// The adapter is a passive transport: it encodes and decodes the record but
/// never decides what the collection should contain.
#[derive(Debug)]
pub struct RecipeStorage<B> {
    backend: B,
    key: String,
}

impl<B: BlobStore> RecipeStorage<B> {
    /// Adapter over `backend` using [`DEFAULT_STORAGE_KEY`].
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load the previously saved collection.
    ///
    /// Returns `None` when nothing was saved or the record cannot be read or
    /// decoded. Failures are logged only. Duplicate ids in a decoded record
    /// keep their first occurrence.
    pub async fn load(&self) -> Option<Vec<Recipe>> {
        let bytes = match self.backend.get(&self.key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key = %self.key, "no stored recipe record");
                return None;
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read recipe record");
                return None;
            }
        };

        match decode_collection(&bytes) {
            Ok(recipes) => Some(dedup_by_id(recipes, &self.key)),
            Err(e) => {
                warn!(key = %self.key, error = %e, "stored recipe record is unreadable; treating as absent");
                None
            }
        }
    }

    /// Serialize and write the whole collection as a single unit.
    pub async fn save(&self, recipes: &[Recipe]) -> StorageResult<()> {
        let bytes = encode_collection(recipes)?;
        self.backend.put(&self.key, &bytes).await?;
        debug!(key = %self.key, count = recipes.len(), "recipe record saved");
        Ok(())
    }

    /// Remove the durable record. Best-effort: failures are logged.
    pub async fn clear(&self) {
        match self.backend.remove(&self.key).await {
            Ok(existed) => debug!(key = %self.key, existed, "recipe record cleared"),
            Err(e) => warn!(key = %self.key, error = %e, "failed to clear recipe record"),
        }
    }
}

fn dedup_by_id(recipes: Vec<Recipe>, key: &str) -> Vec<Recipe> {
    let total = recipes.len();
    let mut seen = HashSet::with_capacity(total);
    let unique: Vec<Recipe> = recipes
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect();
    if unique.len() != total {
        warn!(key = %key, dropped = total - unique.len(), "dropped recipes with duplicate ids");
    }
    unique
}
