//! Blob store trait for pluggable byte storage backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for blob storage backends.
///
/// The tree mutation engines treat blob storage as a flat key-value byte
/// store: every file row references exactly one blob path. Each call is
/// assumed atomic; `delete` is idempotent-safe and can be re-checked via
/// `exists`. The [`BlobStore`] trait is defined here in `drivespace-core`
/// and implemented in `drivespace-blob`.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether a blob exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Write bytes to the given path, overwriting any existing blob.
    async fn put(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Read a blob into memory as a complete byte vector.
    async fn read(&self, path: &str) -> AppResult<Bytes>;

    /// Duplicate a blob from one path to another within this provider.
    async fn copy(&self, from: &str, to: &str) -> AppResult<()>;

    /// Delete the blob at the given path.
    ///
    /// Returns `true` when a blob was removed, `false` when no blob
    /// existed at the path. Either outcome means the path is now free.
    async fn delete(&self, path: &str) -> AppResult<bool>;

    /// Build the public download URL for a blob path.
    fn url(&self, path: &str) -> String;
}
