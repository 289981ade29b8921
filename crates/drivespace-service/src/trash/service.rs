//! The trash engine: recursive soft-delete, restore, and hard delete.
//!
//! A node's own `deleted_at` marks it as a trash root; the
//! `parent_trashed`/`folder_trashed` flags mark everything underneath as
//! reachable only through that root. Soft delete and restore toggle the
//! flags over the same walk, so a restore returns the subtree to its
//! exact pre-delete state.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use drivespace_core::error::AppError;
use drivespace_core::result::AppResult;
use drivespace_core::traits::blob::BlobStore;
use drivespace_database::{FileRepo, FolderRepo};
use drivespace_entity::file::File;
use drivespace_entity::folder::Folder;
use drivespace_entity::storage::Storage;

use crate::context::RequestContext;
use crate::folder::service::FolderDetail;
use crate::folder::size::SizePropagator;
use crate::folder::tree::TreeWalker;
use crate::storage::StorageService;

/// The trash roots of a tenant's storage.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TrashIndex {
    /// Folders soft-deleted in their own right.
    pub folders: Vec<Folder>,
    /// Files soft-deleted in their own right.
    pub files: Vec<File>,
}

/// Manages the trash lifecycle of folders and files.
#[derive(Clone)]
pub struct TrashService {
    ledger: Arc<StorageService>,
    folders: Arc<dyn FolderRepo>,
    files: Arc<dyn FileRepo>,
    blob: Arc<dyn BlobStore>,
    walker: TreeWalker,
    propagator: SizePropagator,
}

impl TrashService {
    /// Creates a new trash service.
    pub fn new(
        ledger: Arc<StorageService>,
        folders: Arc<dyn FolderRepo>,
        files: Arc<dyn FileRepo>,
        blob: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            ledger,
            walker: TreeWalker::new(folders.clone(), files.clone()),
            propagator: SizePropagator::new(folders.clone()),
            folders,
            files,
            blob,
        }
    }

    /// List the caller's trash: every folder and file deleted in its own
    /// right (nodes trashed through an ancestor surface inside these).
    pub async fn list_trash(&self, ctx: &RequestContext) -> AppResult<TrashIndex> {
        let storage = self.ledger.storage_of(ctx).await?;
        Ok(TrashIndex {
            folders: self.folders.find_trash_roots(storage.id).await?,
            files: self.files.find_trash_roots(storage.id).await?,
        })
    }

    /// A trashed folder with its (equally trashed) direct children.
    pub async fn trash_folder_detail(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<FolderDetail> {
        let storage = self.ledger.storage_of(ctx).await?;
        let folder = self.owned_folder(&storage, folder_id).await?;
        if !folder.in_trash() {
            return Err(AppError::not_found("Folder is not in the trash"));
        }

        Ok(FolderDetail {
            sub_folders: self.folders.find_children_all(folder.id).await?,
            files: self.files.find_by_folder_all(folder.id).await?,
            folder,
        })
    }

    /// Soft-delete a folder: the folder becomes a trash root, every
    /// descendant is flagged as ancestor-trashed, and the folder's size
    /// is bubbled out of its parent chain.
    ///
    /// Descendants that are already trash roots themselves keep their own
    /// trash semantics: the walk flags them but does not descend.
    pub async fn soft_delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<Folder> {
        let storage = self.ledger.storage_of(ctx).await?;
        let folder = self.owned_folder(&storage, folder_id).await?;
        let parent_id = folder
            .parent_id
            .ok_or_else(|| AppError::precondition("The root folder cannot be deleted"))?;
        if folder.in_trash() {
            return Err(AppError::precondition("Folder is already in the trash"));
        }

        let scope = self.walker.trash_scope(&folder).await?;

        let trashed = self.folders.soft_delete(folder.id).await?;
        self.files.set_folder_trashed(&scope.file_ids, true).await?;
        self.folders
            .set_parent_trashed(&scope.folder_ids, true)
            .await?;

        self.propagator.adjust(parent_id, -folder.size).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %trashed.id,
            descendants = scope.folder_ids.len(),
            files = scope.file_ids.len(),
            "Folder soft-deleted"
        );
        Ok(trashed)
    }

    /// Restore a trash-root folder, clearing the ancestor-trashed flags
    /// over the same scope the soft delete marked and bubbling the size
    /// back into the parent chain.
    pub async fn restore_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<Folder> {
        let storage = self.ledger.storage_of(ctx).await?;
        let folder = self.owned_folder(&storage, folder_id).await?;
        if !folder.is_trashed() {
            return Err(AppError::precondition("Folder is not in the trash"));
        }
        if folder.parent_trashed {
            return Err(AppError::precondition(
                "An ancestor is still in the trash; restore it instead",
            ));
        }
        let parent_id = folder
            .parent_id
            .ok_or_else(|| AppError::consistency("Trashed folder has no parent"))?;

        let scope = self.walker.trash_scope(&folder).await?;

        let restored = self.folders.restore(folder.id).await?;
        self.files
            .set_folder_trashed(&scope.file_ids, false)
            .await?;
        self.folders
            .set_parent_trashed(&scope.folder_ids, false)
            .await?;

        self.propagator.adjust(parent_id, folder.size).await?;

        info!(user_id = %ctx.user_id, folder_id = %restored.id, "Folder restored");
        Ok(restored)
    }

    /// Soft-delete a batch of files. Each file becomes its own trash
    /// root and its size is bubbled out of its folder chain.
    pub async fn soft_delete_files(
        &self,
        ctx: &RequestContext,
        file_ids: &[Uuid],
    ) -> AppResult<Vec<File>> {
        let storage = self.ledger.storage_of(ctx).await?;

        let mut trashed = Vec::with_capacity(file_ids.len());
        for &file_id in file_ids {
            let file = self.owned_file(&storage, file_id).await?;
            if file.in_trash() {
                return Err(AppError::precondition(format!(
                    "File '{}' is already in the trash",
                    file.name
                )));
            }

            let updated = self.files.soft_delete(file.id).await?;
            self.propagator.adjust(file.folder_id, -file.size).await?;
            trashed.push(updated);
        }

        info!(user_id = %ctx.user_id, count = trashed.len(), "Files soft-deleted");
        Ok(trashed)
    }

    /// Restore a trash-root file and bubble its size back in.
    pub async fn restore_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<File> {
        let storage = self.ledger.storage_of(ctx).await?;
        let file = self.owned_file(&storage, file_id).await?;
        if !file.is_trashed() {
            return Err(AppError::precondition("File is not in the trash"));
        }
        if file.folder_trashed {
            return Err(AppError::precondition(
                "The containing folder is still in the trash; restore it instead",
            ));
        }

        let restored = self.files.restore(file.id).await?;
        self.propagator.adjust(file.folder_id, file.size).await?;

        info!(user_id = %ctx.user_id, file_id = %restored.id, "File restored");
        Ok(restored)
    }

    /// Permanently delete a batch of files: blob first, row second.
    ///
    /// Files reachable only through a trashed ancestor are rejected;
    /// the whole subtree must be deleted via that ancestor. Returns the
    /// number of files removed.
    pub async fn hard_delete_files(
        &self,
        ctx: &RequestContext,
        file_ids: &[Uuid],
    ) -> AppResult<u64> {
        let storage = self.ledger.storage_of(ctx).await?;

        let mut targets = Vec::with_capacity(file_ids.len());
        for &file_id in file_ids {
            let file = self.owned_file(&storage, file_id).await?;
            if file.folder_trashed {
                return Err(AppError::precondition(format!(
                    "File '{}' can only be deleted through its trashed folder",
                    file.name
                )));
            }
            targets.push(file);
        }

        let (removed, failures) = self.remove_files(&storage, &targets).await?;
        if failures > 0 {
            return Err(AppError::blob(format!(
                "{failures} blob(s) could not be deleted; their rows were kept"
            )));
        }

        info!(user_id = %ctx.user_id, count = removed, "Files hard-deleted");
        Ok(removed)
    }

    /// Permanently delete a folder and its entire subtree.
    ///
    /// Files go first (blob, then row), folder rows are removed in one
    /// batch afterwards. Folder sizes are never bubbled for the deleted
    /// folders; their aggregate disappears with the rows. If any blob
    /// refuses to die the folder rows are kept and the operation reports
    /// a fatal blob error; the partially-deleted tree is left for
    /// reconciliation.
    pub async fn hard_delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<u64> {
        let storage = self.ledger.storage_of(ctx).await?;
        let folder = self.owned_folder(&storage, folder_id).await?;
        if folder.is_root() {
            return Err(AppError::precondition("The root folder cannot be deleted"));
        }
        if folder.parent_trashed {
            return Err(AppError::precondition(
                "Folder can only be deleted through its trashed ancestor",
            ));
        }

        let subtree = self.walker.descendants(folder.id).await?;
        let (removed_files, failures) = self.remove_files(&storage, &subtree.files).await?;

        if failures > 0 {
            return Err(AppError::blob(format!(
                "{failures} blob(s) could not be deleted; the folder was kept"
            )));
        }

        let mut folder_ids: Vec<Uuid> = subtree.folders.iter().map(|f| f.id).collect();
        folder_ids.push(folder.id);
        let removed_folders = self.folders.delete_many(&folder_ids).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            files = removed_files,
            folders = removed_folders,
            "Folder hard-deleted"
        );
        Ok(removed_files + removed_folders)
    }

    /// Shared hard-delete core: delete blobs, drop the rows whose blob
    /// is gone, release quota, and bubble sizes for files that still
    /// counted toward their ancestor chain.
    ///
    /// Files with any trash state skip the ancestor-size decrement: the
    /// soft-delete that trashed them already bubbled their size out.
    async fn remove_files(
        &self,
        storage: &Storage,
        files: &[File],
    ) -> AppResult<(u64, u64)> {
        let mut freed = 0.0;
        let mut failures = 0u64;
        let mut removed_ids = Vec::with_capacity(files.len());

        for file in files {
            match self.blob.delete(&file.blob_path).await {
                Ok(_) => {
                    freed += file.size;
                    removed_ids.push(file.id);

                    if !file.in_trash() {
                        self.propagator.adjust(file.folder_id, -file.size).await?;
                    }
                }
                Err(err) => {
                    warn!(
                        file_id = %file.id,
                        blob_path = %file.blob_path,
                        error = %err,
                        "Blob deletion failed; keeping the row"
                    );
                    failures += 1;
                }
            }
        }

        let removed = self.files.delete_many(&removed_ids).await?;
        if freed != 0.0 {
            self.ledger.adjust_used_space(storage.id, -freed).await?;
        }

        Ok((removed, failures))
    }

    async fn owned_folder(&self, storage: &Storage, folder_id: Uuid) -> AppResult<Folder> {
        self.folders
            .find_by_id(folder_id)
            .await?
            .filter(|f| f.storage_id == storage.id)
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }

    async fn owned_file(&self, storage: &Storage, file_id: Uuid) -> AppResult<File> {
        let file = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        let folder = self
            .folders
            .find_by_id(file.folder_id)
            .await?
            .ok_or_else(|| {
                AppError::consistency(format!("File {file_id} references a missing folder"))
            })?;

        if folder.storage_id != storage.id {
            return Err(AppError::not_found("File not found"));
        }
        Ok(file)
    }
}
