//! Folder CRUD, move, and copy orchestration.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use drivespace_core::error::AppError;
use drivespace_core::result::AppResult;
use drivespace_core::traits::blob::BlobStore;
use drivespace_database::{FileRepo, FolderRepo};
use drivespace_entity::file::File;
use drivespace_entity::folder::{CreateFolder, Folder};
use drivespace_entity::storage::Storage;

use crate::context::RequestContext;
use crate::folder::copy::CopyEngine;
use crate::folder::size::SizePropagator;
use crate::folder::tree::TreeWalker;
use crate::naming::NameResolver;
use crate::storage::StorageService;

/// A folder together with its direct active children.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FolderDetail {
    /// The folder itself.
    pub folder: Folder,
    /// Active direct sub-folders.
    pub sub_folders: Vec<Folder>,
    /// Active files directly in the folder.
    pub files: Vec<File>,
}

/// Manages folder CRUD, relocation, and deep copies.
#[derive(Clone)]
pub struct FolderService {
    ledger: Arc<StorageService>,
    folders: Arc<dyn FolderRepo>,
    files: Arc<dyn FileRepo>,
    naming: NameResolver,
    walker: TreeWalker,
    propagator: SizePropagator,
    copy_engine: CopyEngine,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        ledger: Arc<StorageService>,
        folders: Arc<dyn FolderRepo>,
        files: Arc<dyn FileRepo>,
        blob: Arc<dyn BlobStore>,
        upload_dir: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            naming: NameResolver::new(folders.clone(), files.clone()),
            walker: TreeWalker::new(folders.clone(), files.clone()),
            propagator: SizePropagator::new(folders.clone()),
            copy_engine: CopyEngine::new(folders.clone(), files.clone(), blob, upload_dir),
            folders,
            files,
        }
    }

    /// The caller's root folder with its direct children.
    pub async fn root_folder(&self, ctx: &RequestContext) -> AppResult<FolderDetail> {
        let storage = self.ledger.storage_of(ctx).await?;
        let root = self
            .folders
            .find_root(storage.id)
            .await?
            .ok_or_else(|| AppError::consistency("Storage has no root folder"))?;
        self.detail(root).await
    }

    /// A folder with its direct children. Trashed folders are not
    /// reachable here; they are served by the trash service.
    pub async fn folder_detail(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<FolderDetail> {
        let storage = self.ledger.storage_of(ctx).await?;
        let folder = self.owned_folder(&storage, folder_id).await?;
        if folder.in_trash() {
            return Err(AppError::not_found("Folder not found"));
        }
        self.detail(folder).await
    }

    /// Create an empty folder under an existing parent.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        parent_id: Uuid,
        name: &str,
    ) -> AppResult<Folder> {
        validate_name(name)?;

        let storage = self.ledger.storage_of(ctx).await?;
        let parent = self
            .folders
            .find_by_id(parent_id)
            .await?
            .filter(|f| f.storage_id == storage.id)
            .ok_or_else(|| AppError::not_found("Parent folder not found"))?;
        if parent.in_trash() {
            return Err(AppError::precondition("Cannot create inside a trashed folder"));
        }

        if self.folders.name_exists(parent.id, name).await? {
            return Err(AppError::conflict(format!("Name '{name}' already exists")));
        }

        let folder = self
            .folders
            .create(&CreateFolder::empty(storage.id, parent.id, name))
            .await?;

        info!(user_id = %ctx.user_id, folder_id = %folder.id, name = %folder.name, "Folder created");
        Ok(folder)
    }

    /// Rename a folder. The new name is taken verbatim; a taken name is
    /// a conflict, not an auto-suffix.
    pub async fn rename_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        new_name: &str,
    ) -> AppResult<Folder> {
        validate_name(new_name)?;

        let storage = self.ledger.storage_of(ctx).await?;
        let folder = self.owned_folder(&storage, folder_id).await?;
        let parent_id = folder
            .parent_id
            .ok_or_else(|| AppError::precondition("The root folder cannot be renamed"))?;

        if folder.name != new_name && self.folders.name_exists(parent_id, new_name).await? {
            return Err(AppError::conflict(format!("Name '{new_name}' already exists")));
        }

        let folder = self.folders.rename(folder.id, new_name).await?;
        info!(user_id = %ctx.user_id, folder_id = %folder.id, name = %folder.name, "Folder renamed");
        Ok(folder)
    }

    /// Move a folder under a new parent.
    ///
    /// Bubbles the folder's aggregate size out of the old ancestor chain
    /// and into the new one as two independent atomic batches.
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        dest_parent_id: Uuid,
    ) -> AppResult<Folder> {
        let storage = self.ledger.storage_of(ctx).await?;
        let folder = self.owned_folder(&storage, folder_id).await?;
        let old_parent_id = folder
            .parent_id
            .ok_or_else(|| AppError::precondition("The root folder cannot be moved"))?;
        if folder.in_trash() {
            return Err(AppError::precondition("Cannot move a trashed folder"));
        }

        let dest = self.destination_folder(&storage, dest_parent_id).await?;
        self.ensure_outside_subtree(folder.id, &dest).await?;

        // Rename only on actual collision; staying under the same parent
        // keeps the name (the folder would otherwise collide with itself).
        let name = if old_parent_id == dest.id {
            folder.name.clone()
        } else {
            self.naming.folder_name(dest.id, &folder.name).await?
        };

        let moved = self.folders.reparent(folder.id, dest.id, &name).await?;

        self.propagator.adjust(old_parent_id, -folder.size).await?;
        self.propagator.adjust(dest.id, folder.size).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %moved.id,
            dest = %dest.id,
            "Folder moved"
        );
        Ok(moved)
    }

    /// Deep-copy a folder subtree into a new parent.
    ///
    /// The copy engine clones rows and blobs; this call site then bubbles
    /// the copied size into the destination chain and charges the quota.
    pub async fn copy_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        dest_parent_id: Uuid,
    ) -> AppResult<Folder> {
        let storage = self.ledger.storage_of(ctx).await?;
        let source = self.owned_folder(&storage, folder_id).await?;
        if source.is_root() {
            return Err(AppError::precondition("The root folder cannot be copied"));
        }
        if source.in_trash() {
            return Err(AppError::precondition("Cannot copy a trashed folder"));
        }

        let dest = self.destination_folder(&storage, dest_parent_id).await?;
        self.ensure_outside_subtree(source.id, &dest).await?;

        self.ledger.check_fits(&storage, source.size)?;

        let clone = self.copy_engine.copy_tree(&source, dest.id).await?;

        self.ledger.adjust_used_space(storage.id, source.size).await?;
        self.propagator.adjust(dest.id, source.size).await?;

        info!(
            user_id = %ctx.user_id,
            source = %source.id,
            clone = %clone.id,
            "Folder copied"
        );
        Ok(clone)
    }

    /// Load a folder and verify tenant ownership.
    async fn owned_folder(&self, storage: &Storage, folder_id: Uuid) -> AppResult<Folder> {
        let folder = self
            .folders
            .find_by_id(folder_id)
            .await?
            .filter(|f| f.storage_id == storage.id)
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        Ok(folder)
    }

    /// Load and vet a move/copy destination.
    async fn destination_folder(&self, storage: &Storage, dest_id: Uuid) -> AppResult<Folder> {
        let dest = self
            .folders
            .find_by_id(dest_id)
            .await?
            .filter(|f| f.storage_id == storage.id)
            .ok_or_else(|| AppError::precondition("Destination folder does not exist"))?;
        if dest.in_trash() {
            return Err(AppError::precondition("Destination folder is in the trash"));
        }
        Ok(dest)
    }

    /// Reject destinations that would make a node its own descendant.
    async fn ensure_outside_subtree(&self, node_id: Uuid, dest: &Folder) -> AppResult<()> {
        if dest.id == node_id {
            return Err(AppError::precondition(
                "A folder cannot be placed into itself",
            ));
        }
        let ancestors = self.walker.ancestors(dest.id).await?;
        if ancestors.iter().any(|f| f.id == node_id) {
            return Err(AppError::precondition(
                "A folder cannot be placed into its own subtree",
            ));
        }
        Ok(())
    }

    async fn detail(&self, folder: Folder) -> AppResult<FolderDetail> {
        let sub_folders = self.folders.find_children(folder.id).await?;
        let files = self.files.find_by_folder(folder.id).await?;
        Ok(FolderDetail {
            folder,
            sub_folders,
            files,
        })
    }
}

/// Display-name validation shared by folder and file operations.
pub(crate) fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if name.len() > 255 {
        return Err(AppError::validation("Name cannot exceed 255 characters"));
    }
    Ok(())
}
