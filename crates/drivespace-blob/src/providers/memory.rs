//! In-memory blob provider.
//!
//! Backs the engine test-suites; also usable for ephemeral single-process
//! deployments.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use drivespace_core::error::AppError;
use drivespace_core::result::AppResult;
use drivespace_core::traits::blob::BlobStore;

/// Map-backed blob store.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Bytes>,
    public_url_base: String,
}

impl MemoryBlobStore {
    /// Create an empty store with the given URL base.
    pub fn new(public_url_base: &str) -> Self {
        Self {
            blobs: DashMap::new(),
            public_url_base: public_url_base.trim_end_matches('/').to_string(),
        }
    }

    /// Number of blobs currently held.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.blobs.contains_key(path))
    }

    async fn put(&self, path: &str, data: Bytes) -> AppResult<()> {
        self.blobs.insert(path.to_string(), data);
        Ok(())
    }

    async fn read(&self, path: &str) -> AppResult<Bytes> {
        self.blobs
            .get(path)
            .map(|b| b.clone())
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {path}")))
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        let data = self.read(from).await?;
        self.blobs.insert(to.to_string(), data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        Ok(self.blobs.remove(path).is_some())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.public_url_base, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let store = MemoryBlobStore::new("/blobs");
        store.put("a/b.txt", Bytes::from("data")).await.unwrap();

        assert!(store.exists("a/b.txt").await.unwrap());
        assert_eq!(store.read("a/b.txt").await.unwrap(), Bytes::from("data"));
        assert!(store.delete("a/b.txt").await.unwrap());
        assert!(!store.delete("a/b.txt").await.unwrap());
    }
}
