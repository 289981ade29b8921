//! Local filesystem blob provider.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use drivespace_core::config::blob::BlobConfig;
use drivespace_core::error::{AppError, ErrorKind};
use drivespace_core::result::AppResult;
use drivespace_core::traits::blob::BlobStore;

/// Local filesystem blob store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all stored blobs.
    root: PathBuf,
    /// Base prefixed onto blob paths when building URLs.
    public_url_base: String,
}

impl LocalBlobStore {
    /// Create a new local blob store from configuration.
    pub async fn new(config: &BlobConfig) -> AppResult<Self> {
        Self::with_root(&config.root_path, &config.public_url_base).await
    }

    /// Create a new local blob store rooted at the given path.
    pub async fn with_root(root_path: &str, public_url_base: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Blob,
                format!("Failed to create blob root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_url_base: public_url_base.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a blob path to an absolute path within the root.
    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Blob,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.resolve(path).exists())
    }

    async fn put(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path);
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Blob, format!("Failed to write blob: {path}"), e)
        })?;

        debug!(path, bytes = data.len(), "Wrote blob");
        Ok(())
    }

    async fn read(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path);
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {path}"))
            } else {
                AppError::with_source(ErrorKind::Blob, format!("Failed to read blob: {path}"), e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        let from_path = self.resolve(from);
        let to_path = self.resolve(to);
        self.ensure_parent(&to_path).await?;

        fs::copy(&from_path, &to_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Blob, format!("Failed to copy {from} -> {to}"), e)
        })?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path);
        if !full_path.exists() {
            return Ok(false);
        }
        fs::remove_file(&full_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Blob, format!("Failed to delete blob: {path}"), e)
        })?;
        debug!(path, "Deleted blob");
        Ok(true)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.public_url_base, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn provider(dir: &tempfile::TempDir) -> LocalBlobStore {
        LocalBlobStore::with_root(dir.path().to_str().unwrap(), "/blobs")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = provider(&dir).await;

        let data = Bytes::from("hello world");
        store.put("uploads/file.txt", data.clone()).await.unwrap();

        assert!(store.exists("uploads/file.txt").await.unwrap());
        assert_eq!(store.read("uploads/file.txt").await.unwrap(), data);

        assert!(store.delete("uploads/file.txt").await.unwrap());
        assert!(!store.exists("uploads/file.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = provider(&dir).await;

        assert!(!store.delete("uploads/never-existed.bin").await.unwrap());
    }

    #[tokio::test]
    async fn test_copy_leaves_source_intact() {
        let dir = tempfile::tempdir().unwrap();
        let store = provider(&dir).await;

        store.put("orig.txt", Bytes::from("content")).await.unwrap();
        store.copy("orig.txt", "copy.txt").await.unwrap();

        assert!(store.exists("orig.txt").await.unwrap());
        assert_eq!(store.read("copy.txt").await.unwrap(), Bytes::from("content"));
    }

    #[tokio::test]
    async fn test_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = provider(&dir).await;
        assert_eq!(store.url("uploads/a.png"), "/blobs/uploads/a.png");
    }
}
