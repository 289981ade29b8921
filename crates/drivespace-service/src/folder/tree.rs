//! Subtree enumeration for bulk operations.

use std::sync::Arc;

use uuid::Uuid;

use drivespace_core::error::AppError;
use drivespace_core::result::AppResult;
use drivespace_database::{FileRepo, FolderRepo};
use drivespace_entity::file::File;
use drivespace_entity::folder::Folder;

/// A folder's full descendant set.
#[derive(Debug, Default)]
pub struct Subtree {
    /// Every descendant folder (the start node excluded).
    pub folders: Vec<Folder>,
    /// Every file in the subtree, the start node's own files included.
    pub files: Vec<File>,
}

/// The node ids touched by a soft-delete or restore of a folder.
#[derive(Debug, Default)]
pub struct TrashScope {
    /// Descendant folder ids whose `parent_trashed` flag is toggled.
    pub folder_ids: Vec<Uuid>,
    /// File ids whose `folder_trashed` flag is toggled.
    pub file_ids: Vec<Uuid>,
}

/// Enumerates subtrees through explicit keyed lookups.
///
/// Parent assignment is validated at move time, so the walked structure
/// is guaranteed acyclic; the walk carries its accumulators explicitly
/// and is reentrant.
#[derive(Clone)]
pub struct TreeWalker {
    folders: Arc<dyn FolderRepo>,
    files: Arc<dyn FileRepo>,
}

impl TreeWalker {
    /// Creates a new tree walker.
    pub fn new(folders: Arc<dyn FolderRepo>, files: Arc<dyn FileRepo>) -> Self {
        Self { folders, files }
    }

    /// Collect the full recursive closure under a folder, trashed rows
    /// included. Traversal is depth-first; sibling order is not
    /// meaningful to any caller.
    pub async fn descendants(&self, folder_id: Uuid) -> AppResult<Subtree> {
        let mut subtree = Subtree::default();
        let mut stack = vec![folder_id];

        while let Some(id) = stack.pop() {
            subtree
                .files
                .extend(self.files.find_by_folder_all(id).await?);

            for child in self.folders.find_children_all(id).await? {
                stack.push(child.id);
                subtree.folders.push(child);
            }
        }

        Ok(subtree)
    }

    /// Collect the ids a soft-delete or restore of `root` must re-flag.
    ///
    /// Every visited descendant folder is recorded; files are collected
    /// and the walk descends only through folders that are not
    /// independently soft-deleted. A descendant that is its own trash
    /// root gets its flag toggled but keeps its subtree's trash
    /// semantics intact. The operation root is always descended into.
    pub async fn trash_scope(&self, root: &Folder) -> AppResult<TrashScope> {
        let mut scope = TrashScope::default();
        let mut stack = vec![root.id];

        while let Some(id) = stack.pop() {
            for file in self.files.find_by_folder_all(id).await? {
                scope.file_ids.push(file.id);
            }

            for child in self.folders.find_children_all(id).await? {
                scope.folder_ids.push(child.id);
                if !child.is_trashed() {
                    stack.push(child.id);
                }
            }
        }

        Ok(scope)
    }

    /// Load the ancestor chain of a folder, nearest parent first, root
    /// last. The folder itself is not included.
    pub async fn ancestors(&self, folder_id: Uuid) -> AppResult<Vec<Folder>> {
        let start = self
            .folders
            .find_by_id(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;

        let mut chain = Vec::new();
        let mut current = start.parent_id;

        while let Some(id) = current {
            let folder = self.folders.find_by_id(id).await?.ok_or_else(|| {
                AppError::consistency(format!("Folder {id} missing from ancestor chain"))
            })?;
            current = folder.parent_id;
            chain.push(folder);
        }

        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use drivespace_database::memory::{MemoryFileRepository, MemoryFolderRepository};
    use drivespace_entity::file::CreateFile;
    use drivespace_entity::folder::CreateFolder;

    struct Fixture {
        folders: Arc<MemoryFolderRepository>,
        files: Arc<MemoryFileRepository>,
        walker: TreeWalker,
        storage_id: Uuid,
        root: Folder,
    }

    async fn fixture() -> Fixture {
        let folders = Arc::new(MemoryFolderRepository::new());
        let files = Arc::new(MemoryFileRepository::new(folders.clone()));
        let walker = TreeWalker::new(folders.clone(), files.clone());
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
        Fixture {
            folders,
            files,
            walker,
            storage_id,
            root,
        }
    }

    impl Fixture {
        async fn folder(&self, parent: Uuid, name: &str) -> Folder {
            self.folders
                .create(&CreateFolder::empty(self.storage_id, parent, name))
                .await
                .unwrap()
        }

        async fn file(&self, folder: Uuid, name: &str) -> File {
            self.files
                .create(&CreateFile {
                    folder_id: folder,
                    name: name.to_string(),
                    blob_path: format!("uploads/{name}.bin"),
                    extension: Some("bin".to_string()),
                    mime_type: None,
                    size: 10.0,
                    is_public: false,
                })
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_descendants_excludes_start_and_siblings() {
        let fx = fixture().await;
        let a = fx.folder(fx.root.id, "a").await;
        let _sibling = fx.folder(fx.root.id, "b").await;
        let a1 = fx.folder(a.id, "a1").await;
        fx.file(a.id, "in-a").await;
        fx.file(a1.id, "in-a1").await;
        fx.file(fx.root.id, "in-root").await;

        let subtree = fx.walker.descendants(a.id).await.unwrap();
        let folder_ids: Vec<Uuid> = subtree.folders.iter().map(|f| f.id).collect();

        assert_eq!(folder_ids, vec![a1.id]);
        assert_eq!(subtree.files.len(), 2);
        assert!(subtree.files.iter().all(|f| f.name.starts_with("in-a")));
    }

    #[tokio::test]
    async fn test_trash_scope_stops_at_independent_trash_roots() {
        let fx = fixture().await;
        let a = fx.folder(fx.root.id, "a").await;
        let b = fx.folder(a.id, "b").await;
        let deep = fx.folder(b.id, "deep").await;
        fx.file(a.id, "top").await;
        let buried = fx.file(b.id, "buried").await;

        // `b` goes to trash on its own first.
        fx.folders.soft_delete(b.id).await.unwrap();

        let a = fx.folders.find_by_id(a.id).await.unwrap().unwrap();
        let scope = fx.walker.trash_scope(&a).await.unwrap();

        // `b` is re-flagged but its subtree is left alone.
        assert!(scope.folder_ids.contains(&b.id));
        assert!(!scope.folder_ids.contains(&deep.id));
        assert!(!scope.file_ids.contains(&buried.id));
        assert_eq!(scope.file_ids.len(), 1);
    }

    #[tokio::test]
    async fn test_ancestors_ordered_to_root() {
        let fx = fixture().await;
        let a = fx.folder(fx.root.id, "a").await;
        let b = fx.folder(a.id, "b").await;

        let chain = fx.walker.ancestors(b.id).await.unwrap();
        let ids: Vec<Uuid> = chain.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![a.id, fx.root.id]);
    }
}
