use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StorageResult;

/// Async key-value storage of opaque blobs.
///
/// Implementations must be thread-safe (`Send + Sync`). `put` replaces the
/// whole value for a key as a single unit; readers never observe a partial
/// write.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Create or replace the blob stored under `key`.
    async fn put(&self, key: &str, bytes: &[u8]) -> StorageResult<()>;

    /// Remove the blob stored under `key`.
    ///
    /// Returns `Ok(true)` if a blob existed and was removed, `Ok(false)` if
    /// there was nothing to remove.
    async fn remove(&self, key: &str) -> StorageResult<bool>;

    /// Returns `true` if a blob is stored under `key`.
    async fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        (**self).put(key, bytes).await
    }

    async fn remove(&self, key: &str) -> StorageResult<bool> {
        (**self).remove(key).await
    }
}
