use thiserror::Error;

/// Errors from fetching the remote taxonomy document.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    /// Transport failure or a non-success HTTP status.
    #[error("network error: {message}")]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Client(String),
}

impl TaxonomyError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            Self::Client(_) => None,
        }
    }
}

pub type TaxonomyResult<T> = Result<T, TaxonomyError>;
