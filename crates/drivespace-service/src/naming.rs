//! Sibling name collision resolution.
//!
//! Names are resolved best-effort: the check-then-create window is an
//! accepted race, and the store's unique constraints are the true guard.
//! The counter rule is the only place in the core with an automatic
//! retry, and it retries exactly once.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use drivespace_core::error::AppError;
use drivespace_core::result::AppResult;
use drivespace_database::{FileRepo, FolderRepo};

/// Resolves collision-free names within a sibling scope.
#[derive(Clone)]
pub struct NameResolver {
    folders: Arc<dyn FolderRepo>,
    files: Arc<dyn FileRepo>,
}

impl NameResolver {
    /// Creates a new name resolver.
    pub fn new(folders: Arc<dyn FolderRepo>, files: Arc<dyn FileRepo>) -> Self {
        Self { folders, files }
    }

    /// Resolve the name for the top-level folder of a copy.
    ///
    /// The candidate is kept when free; on collision the literal
    /// `" (Copy)"` suffix is appended once. Should the suffixed name
    /// collide as well, the counter rule takes over.
    pub async fn folder_copy_name(&self, parent_id: Uuid, name: &str) -> AppResult<String> {
        if !self.folders.name_exists(parent_id, name).await? {
            return Ok(name.to_string());
        }

        let suffixed = format!("{name} (Copy)");
        if !self.folders.name_exists(parent_id, &suffixed).await? {
            debug!(%parent_id, name, "Folder name taken, using copy suffix");
            return Ok(suffixed);
        }

        self.next_folder_candidate(parent_id, name).await
    }

    /// Resolve a folder name within a sibling scope, applying the counter
    /// rule only on actual collision.
    pub async fn folder_name(&self, parent_id: Uuid, name: &str) -> AppResult<String> {
        if !self.folders.name_exists(parent_id, name).await? {
            return Ok(name.to_string());
        }
        self.next_folder_candidate(parent_id, name).await
    }

    /// Resolve a file name within a folder, applying the counter rule
    /// only on actual collision.
    pub async fn file_name(&self, folder_id: Uuid, name: &str) -> AppResult<String> {
        if !self.files.name_exists(folder_id, name).await? {
            return Ok(name.to_string());
        }
        self.next_file_candidate(folder_id, name).await
    }

    async fn next_folder_candidate(&self, parent_id: Uuid, base: &str) -> AppResult<String> {
        let mut next = self
            .folders
            .max_name_suffix(parent_id, base)
            .await?
            .unwrap_or(0)
            + 1;

        // One retry for a lost creation race, then give up.
        for _ in 0..2 {
            let candidate = format!("{base} ({next})");
            if !self.folders.name_exists(parent_id, &candidate).await? {
                return Ok(candidate);
            }
            next += 1;
        }

        Err(AppError::name_resolution(format!(
            "Could not resolve a free folder name for '{base}'"
        )))
    }

    async fn next_file_candidate(&self, folder_id: Uuid, base: &str) -> AppResult<String> {
        let mut next = self
            .files
            .max_name_suffix(folder_id, base)
            .await?
            .unwrap_or(0)
            + 1;

        for _ in 0..2 {
            let candidate = format!("{base} ({next})");
            if !self.files.name_exists(folder_id, &candidate).await? {
                return Ok(candidate);
            }
            next += 1;
        }

        Err(AppError::name_resolution(format!(
            "Could not resolve a free file name for '{base}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use drivespace_database::memory::{MemoryFileRepository, MemoryFolderRepository};
    use drivespace_entity::folder::CreateFolder;

    async fn scope() -> (NameResolver, Arc<MemoryFolderRepository>, Uuid, Uuid) {
        let folders = Arc::new(MemoryFolderRepository::new());
        let files = Arc::new(MemoryFileRepository::new(folders.clone()));
        let resolver = NameResolver::new(folders.clone(), files.clone());

        let storage_id = Uuid::new_v4();
        let root = folders
            .create(&CreateFolder {
                storage_id,
                parent_id: None,
                name: "root".to_string(),
                size: 0.0,
            })
            .await
            .unwrap();
        (resolver, folders, storage_id, root.id)
    }

    #[tokio::test]
    async fn test_free_name_is_unchanged() {
        let (resolver, _, _, root) = scope().await;
        assert_eq!(resolver.folder_name(root, "docs").await.unwrap(), "docs");
        assert_eq!(
            resolver.folder_copy_name(root, "docs").await.unwrap(),
            "docs"
        );
    }

    #[tokio::test]
    async fn test_copy_suffix_applied_once() {
        let (resolver, folders, storage_id, root) = scope().await;
        folders
            .create(&CreateFolder::empty(storage_id, root, "docs"))
            .await
            .unwrap();

        assert_eq!(
            resolver.folder_copy_name(root, "docs").await.unwrap(),
            "docs (Copy)"
        );
    }

    #[tokio::test]
    async fn test_copy_falls_back_to_counter() {
        let (resolver, folders, storage_id, root) = scope().await;
        for name in ["docs", "docs (Copy)"] {
            folders
                .create(&CreateFolder::empty(storage_id, root, name))
                .await
                .unwrap();
        }

        assert_eq!(
            resolver.folder_copy_name(root, "docs").await.unwrap(),
            "docs (1)"
        );
    }

    #[tokio::test]
    async fn test_counter_continues_from_latest() {
        let (resolver, folders, storage_id, root) = scope().await;
        for name in ["docs", "docs (1)", "docs (4)"] {
            folders
                .create(&CreateFolder::empty(storage_id, root, name))
                .await
                .unwrap();
        }

        assert_eq!(
            resolver.folder_name(root, "docs").await.unwrap(),
            "docs (5)"
        );
    }
}
