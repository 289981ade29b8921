//! Map-backed repositories implementing the repository traits.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use drivespace_core::error::AppError;
use drivespace_core::result::AppResult;
use drivespace_entity::file::{CreateFile, File};
use drivespace_entity::folder::{CreateFolder, Folder};
use drivespace_entity::storage::{CreateStorage, Storage};

use crate::repositories::pattern::parse_suffix;
use crate::repositories::{FileRepo, FolderRepo, StorageRepo};

/// In-memory implementation of [`StorageRepo`].
#[derive(Debug, Default)]
pub struct MemoryStorageRepository {
    rows: DashMap<Uuid, Storage>,
}

impl MemoryStorageRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageRepo for MemoryStorageRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Storage>> {
        Ok(self.rows.get(&id).map(|r| r.clone()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Storage>> {
        Ok(self
            .rows
            .iter()
            .find(|r| r.user_id == user_id)
            .map(|r| r.clone()))
    }

    async fn create(&self, data: &CreateStorage) -> AppResult<Storage> {
        if self.rows.iter().any(|r| r.user_id == data.user_id) {
            return Err(AppError::conflict(format!(
                "Storage for user {} already exists",
                data.user_id
            )));
        }
        let now = Utc::now();
        let storage = Storage {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            space: data.space,
            used_space: 0.0,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(storage.id, storage.clone());
        Ok(storage)
    }

    async fn adjust_used_space(&self, id: Uuid, delta: f64) -> AppResult<()> {
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Storage {id} not found")))?;
        row.used_space += delta;
        row.updated_at = Utc::now();
        Ok(())
    }
}

/// In-memory implementation of [`FolderRepo`].
#[derive(Debug, Default)]
pub struct MemoryFolderRepository {
    rows: DashMap<Uuid, Folder>,
}

impl MemoryFolderRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up which storage a folder belongs to.
    pub fn storage_of(&self, folder_id: Uuid) -> Option<Uuid> {
        self.rows.get(&folder_id).map(|f| f.storage_id)
    }

    fn collect(&self, mut pred: impl FnMut(&Folder) -> bool) -> Vec<Folder> {
        let mut out: Vec<Folder> = self
            .rows
            .iter()
            .filter(|r| pred(r.value()))
            .map(|r| r.clone())
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    fn update<T>(&self, id: Uuid, apply: impl FnOnce(&mut Folder) -> T) -> AppResult<Folder> {
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
        apply(&mut row);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

#[async_trait]
impl FolderRepo for MemoryFolderRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self.rows.get(&id).map(|r| r.clone()))
    }

    async fn find_root(&self, storage_id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self
            .rows
            .iter()
            .find(|r| r.storage_id == storage_id && r.parent_id.is_none())
            .map(|r| r.clone()))
    }

    async fn find_children(&self, parent_id: Uuid) -> AppResult<Vec<Folder>> {
        Ok(self.collect(|f| f.parent_id == Some(parent_id) && f.deleted_at.is_none()))
    }

    async fn find_children_all(&self, parent_id: Uuid) -> AppResult<Vec<Folder>> {
        Ok(self.collect(|f| f.parent_id == Some(parent_id)))
    }

    async fn name_exists(&self, parent_id: Uuid, name: &str) -> AppResult<bool> {
        Ok(self.rows.iter().any(|f| {
            f.parent_id == Some(parent_id) && f.deleted_at.is_none() && f.name == name
        }))
    }

    async fn max_name_suffix(&self, parent_id: Uuid, base: &str) -> AppResult<Option<i64>> {
        Ok(self
            .rows
            .iter()
            .filter(|f| f.parent_id == Some(parent_id) && f.deleted_at.is_none())
            .filter_map(|f| parse_suffix(&f.name, base))
            .max())
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        if let Some(parent_id) = data.parent_id {
            let duplicate = self.rows.iter().any(|f| {
                f.parent_id == Some(parent_id) && f.deleted_at.is_none() && f.name == data.name
            });
            if duplicate {
                return Err(AppError::conflict(format!(
                    "Folder name '{}' already exists",
                    data.name
                )));
            }
        }
        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            storage_id: data.storage_id,
            parent_id: data.parent_id,
            name: data.name.clone(),
            size: data.size,
            parent_trashed: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Folder> {
        self.update(id, |f| f.name = name.to_string())
    }

    async fn reparent(&self, id: Uuid, new_parent_id: Uuid, name: &str) -> AppResult<Folder> {
        self.update(id, |f| {
            f.parent_id = Some(new_parent_id);
            f.name = name.to_string();
        })
    }

    async fn adjust_sizes(&self, ids: &[Uuid], delta: f64) -> AppResult<u64> {
        let mut touched = 0;
        for id in ids {
            if let Some(mut row) = self.rows.get_mut(id) {
                row.size += delta;
                row.updated_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn set_parent_trashed(&self, ids: &[Uuid], flag: bool) -> AppResult<u64> {
        let mut touched = 0;
        for id in ids {
            if let Some(mut row) = self.rows.get_mut(id) {
                row.parent_trashed = flag;
                row.updated_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<Folder> {
        self.update(id, |f| f.deleted_at = Some(Utc::now()))
    }

    async fn restore(&self, id: Uuid) -> AppResult<Folder> {
        self.update(id, |f| f.deleted_at = None)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        let mut removed = 0;
        for id in ids {
            if self.rows.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn find_trash_roots(&self, storage_id: Uuid) -> AppResult<Vec<Folder>> {
        let mut out = self.collect(|f| {
            f.storage_id == storage_id && f.deleted_at.is_some() && !f.parent_trashed
        });
        out.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        Ok(out)
    }
}

/// In-memory implementation of [`FileRepo`].
///
/// File trash roots are tenant-scoped through the folder store, so this
/// repository holds a reference to it (the in-memory stand-in for the
/// SQL join the Postgres repository issues).
#[derive(Debug)]
pub struct MemoryFileRepository {
    rows: DashMap<Uuid, File>,
    folders: Arc<MemoryFolderRepository>,
}

impl MemoryFileRepository {
    /// Create an empty store scoped through the given folder store.
    pub fn new(folders: Arc<MemoryFolderRepository>) -> Self {
        Self {
            rows: DashMap::new(),
            folders,
        }
    }

    fn collect(&self, mut pred: impl FnMut(&File) -> bool) -> Vec<File> {
        let mut out: Vec<File> = self
            .rows
            .iter()
            .filter(|r| pred(r.value()))
            .map(|r| r.clone())
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    fn update<T>(&self, id: Uuid, apply: impl FnOnce(&mut File) -> T) -> AppResult<File> {
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;
        apply(&mut row);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

#[async_trait]
impl FileRepo for MemoryFileRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        Ok(self.rows.get(&id).map(|r| r.clone()))
    }

    async fn find_by_folder(&self, folder_id: Uuid) -> AppResult<Vec<File>> {
        Ok(self.collect(|f| f.folder_id == folder_id && f.deleted_at.is_none()))
    }

    async fn find_by_folder_all(&self, folder_id: Uuid) -> AppResult<Vec<File>> {
        Ok(self.collect(|f| f.folder_id == folder_id))
    }

    async fn name_exists(&self, folder_id: Uuid, name: &str) -> AppResult<bool> {
        Ok(self
            .rows
            .iter()
            .any(|f| f.folder_id == folder_id && f.deleted_at.is_none() && f.name == name))
    }

    async fn max_name_suffix(&self, folder_id: Uuid, base: &str) -> AppResult<Option<i64>> {
        Ok(self
            .rows
            .iter()
            .filter(|f| f.folder_id == folder_id && f.deleted_at.is_none())
            .filter_map(|f| parse_suffix(&f.name, base))
            .max())
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        let duplicate = self.rows.iter().any(|f| {
            f.folder_id == data.folder_id && f.deleted_at.is_none() && f.name == data.name
        });
        if duplicate {
            return Err(AppError::conflict(format!(
                "File name '{}' already exists",
                data.name
            )));
        }
        let now = Utc::now();
        let file = File {
            id: Uuid::new_v4(),
            folder_id: data.folder_id,
            name: data.name.clone(),
            blob_path: data.blob_path.clone(),
            extension: data.extension.clone(),
            mime_type: data.mime_type.clone(),
            size: data.size,
            is_public: data.is_public,
            folder_trashed: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(file.id, file.clone());
        Ok(file)
    }

    async fn rename(&self, id: Uuid, name: &str) -> AppResult<File> {
        self.update(id, |f| f.name = name.to_string())
    }

    async fn reparent(&self, id: Uuid, folder_id: Uuid, name: &str) -> AppResult<File> {
        self.update(id, |f| {
            f.folder_id = folder_id;
            f.name = name.to_string();
        })
    }

    async fn set_folder_trashed(&self, ids: &[Uuid], flag: bool) -> AppResult<u64> {
        let mut touched = 0;
        for id in ids {
            if let Some(mut row) = self.rows.get_mut(id) {
                row.folder_trashed = flag;
                row.updated_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<File> {
        self.update(id, |f| f.deleted_at = Some(Utc::now()))
    }

    async fn restore(&self, id: Uuid) -> AppResult<File> {
        self.update(id, |f| f.deleted_at = None)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        let mut removed = 0;
        for id in ids {
            if self.rows.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn find_trash_roots(&self, storage_id: Uuid) -> AppResult<Vec<File>> {
        let mut out = self.collect(|f| {
            f.deleted_at.is_some()
                && !f.folder_trashed
                && self.folders.storage_of(f.folder_id) == Some(storage_id)
        });
        out.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_folder_suffix_scan() {
        let repo = MemoryFolderRepository::new();
        let storage_id = Uuid::new_v4();
        let parent = repo
            .create(&CreateFolder {
                storage_id,
                parent_id: None,
                name: "root".to_string(),
                size: 0.0,
            })
            .await
            .unwrap();

        for name in ["docs", "docs (1)", "docs (3)", "notes"] {
            repo.create(&CreateFolder::empty(storage_id, parent.id, name))
                .await
                .unwrap();
        }

        assert_eq!(repo.max_name_suffix(parent.id, "docs").await.unwrap(), Some(3));
        assert_eq!(repo.max_name_suffix(parent.id, "absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_soft_deleted_siblings_do_not_block_names() {
        let repo = MemoryFolderRepository::new();
        let storage_id = Uuid::new_v4();
        let parent = repo
            .create(&CreateFolder {
                storage_id,
                parent_id: None,
                name: "root".to_string(),
                size: 0.0,
            })
            .await
            .unwrap();

        let docs = repo
            .create(&CreateFolder::empty(storage_id, parent.id, "docs"))
            .await
            .unwrap();
        repo.soft_delete(docs.id).await.unwrap();

        assert!(!repo.name_exists(parent.id, "docs").await.unwrap());
        assert!(repo.create(&CreateFolder::empty(storage_id, parent.id, "docs")).await.is_ok());
    }

    #[tokio::test]
    async fn test_bulk_size_adjust() {
        let repo = MemoryFolderRepository::new();
        let storage_id = Uuid::new_v4();
        let a = repo
            .create(&CreateFolder {
                storage_id,
                parent_id: None,
                name: "root".to_string(),
                size: 0.0,
            })
            .await
            .unwrap();
        let b = repo
            .create(&CreateFolder::empty(storage_id, a.id, "child"))
            .await
            .unwrap();

        let touched = repo.adjust_sizes(&[a.id, b.id], 250.0).await.unwrap();
        assert_eq!(touched, 2);
        assert_eq!(repo.find_by_id(a.id).await.unwrap().unwrap().size, 250.0);
        assert_eq!(repo.find_by_id(b.id).await.unwrap().unwrap().size, 250.0);
    }
}
