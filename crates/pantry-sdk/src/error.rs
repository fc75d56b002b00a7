use thiserror::Error;

use crate::draft::DraftError;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(#[from] DraftError),

    #[error("store error: {0}")]
    Store(#[from] pantry_store::StoreError),

    #[error("recipe not found: {0}")]
    RecipeNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

impl SdkError {
    /// Whether trying the same call again could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retryable(),
            Self::Io(_) => true,
            _ => false,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
