/// Errors from blob backends and the recipe record codec.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The collection could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),

    /// The stored record could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The stored record was written by a newer schema than this build knows.
    #[error("unsupported schema version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u64, supported: u32 },

    /// The key cannot be mapped onto the backend.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Storage backend is read-only or otherwise unavailable.
    #[error("store is read-only")]
    ReadOnly,
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
