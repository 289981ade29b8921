//! Generate-check-retry blob transfer helpers.
//!
//! Both helpers pick a fresh random path, verify it is free, and retry
//! path generation on collision. Retries are unbounded: the path space
//! is large and a collision means only that the dice are rolled again.

use bytes::Bytes;

use drivespace_core::result::AppResult;
use drivespace_core::traits::blob::BlobStore;

use crate::path::random_blob_path;

/// Store a new blob under a generated path and return that path.
pub async fn store_bytes(
    store: &dyn BlobStore,
    dir: &str,
    extension: Option<&str>,
    data: Bytes,
) -> AppResult<String> {
    loop {
        let path = random_blob_path(dir, extension);
        if store.exists(&path).await? {
            continue;
        }
        store.put(&path, data.clone()).await?;
        return Ok(path);
    }
}

/// Duplicate an existing blob under a generated path and return that path.
pub async fn duplicate(
    store: &dyn BlobStore,
    src_path: &str,
    dir: &str,
    extension: Option<&str>,
) -> AppResult<String> {
    loop {
        let path = random_blob_path(dir, extension);
        if store.exists(&path).await? {
            continue;
        }
        store.copy(src_path, &path).await?;
        return Ok(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::memory::MemoryBlobStore;

    #[tokio::test]
    async fn test_store_then_duplicate() {
        let store = MemoryBlobStore::new("/blobs");
        let data = Bytes::from("hello");

        let path = store_bytes(&store, "uploads", Some("txt"), data.clone())
            .await
            .unwrap();
        assert!(store.exists(&path).await.unwrap());

        let copy_path = duplicate(&store, &path, "uploads", Some("txt")).await.unwrap();
        assert_ne!(path, copy_path);
        assert_eq!(store.read(&copy_path).await.unwrap(), data);
        assert_eq!(store.read(&path).await.unwrap(), data);
    }
}
