use thiserror::Error;

use pantry_storage::StorageError;

use crate::snapshot::StorePhase;

/// Errors returned by recipe store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A mutation was attempted before the store finished loading.
    #[error("recipe store is not ready (phase: {phase})")]
    NotReady { phase: StorePhase },

    /// The mutation was applied in memory but could not be saved.
    #[error("failed to persist recipes: {0}")]
    Persist(#[from] StorageError),

    /// The id generator kept producing ids that are already taken.
    #[error("could not mint a fresh recipe id after {attempts} attempts")]
    IdCollision { attempts: usize },
}

impl StoreError {
    /// Returns `true` if repeating the user action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persist(_) | Self::NotReady { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
