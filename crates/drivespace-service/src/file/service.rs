//! File create/copy/move/rename operations.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use drivespace_blob::transfer;
use drivespace_core::error::AppError;
use drivespace_core::result::AppResult;
use drivespace_core::traits::blob::BlobStore;
use drivespace_database::{FileRepo, FolderRepo};
use drivespace_entity::file::{CreateFile, File};
use drivespace_entity::folder::Folder;
use drivespace_entity::storage::Storage;

use crate::context::RequestContext;
use crate::folder::copy::CopyEngine;
use crate::folder::service::validate_name;
use crate::folder::size::SizePropagator;
use crate::naming::NameResolver;
use crate::storage::StorageService;

/// Payload for creating a file from uploaded bytes.
#[derive(Debug, Clone)]
pub struct UploadFileRequest {
    /// Destination folder.
    pub folder_id: Uuid,
    /// Display name (without extension).
    pub name: String,
    /// File extension (without the dot), if any.
    pub extension: Option<String>,
    /// MIME type reported for the content.
    pub mime_type: Option<String>,
    /// The file content.
    pub data: Bytes,
    /// Whether the file is publicly visible.
    pub is_public: bool,
}

/// Manages file creation, duplication, and relocation.
#[derive(Clone)]
pub struct FileService {
    ledger: Arc<StorageService>,
    folders: Arc<dyn FolderRepo>,
    files: Arc<dyn FileRepo>,
    blob: Arc<dyn BlobStore>,
    naming: NameResolver,
    propagator: SizePropagator,
    copy_engine: CopyEngine,
    upload_dir: String,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        ledger: Arc<StorageService>,
        folders: Arc<dyn FolderRepo>,
        files: Arc<dyn FileRepo>,
        blob: Arc<dyn BlobStore>,
        upload_dir: impl Into<String>,
    ) -> Self {
        let upload_dir = upload_dir.into();
        Self {
            ledger,
            naming: NameResolver::new(folders.clone(), files.clone()),
            propagator: SizePropagator::new(folders.clone()),
            copy_engine: CopyEngine::new(
                folders.clone(),
                files.clone(),
                blob.clone(),
                upload_dir.clone(),
            ),
            folders,
            files,
            blob,
            upload_dir,
        }
    }

    /// Get a file by ID.
    pub async fn get_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<File> {
        let storage = self.ledger.storage_of(ctx).await?;
        let (file, _) = self.owned_file(&storage, file_id).await?;
        Ok(file)
    }

    /// Build the download URL for a file's backing blob.
    pub async fn file_url(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<String> {
        let storage = self.ledger.storage_of(ctx).await?;
        let (file, _) = self.owned_file(&storage, file_id).await?;
        Ok(self.blob.url(&file.blob_path))
    }

    /// Store uploaded bytes as a new file.
    ///
    /// Checks the quota, writes the blob under a generated path, inserts
    /// the row (counter-suffixed on name collision), then charges the
    /// ledger and bubbles the size up the destination chain.
    pub async fn create_file(
        &self,
        ctx: &RequestContext,
        req: UploadFileRequest,
    ) -> AppResult<File> {
        validate_name(&req.name)?;

        let storage = self.ledger.storage_of(ctx).await?;
        let folder = self.active_folder(&storage, req.folder_id).await?;

        let size = req.data.len() as f64;
        self.ledger.check_fits(&storage, size)?;

        let blob_path = transfer::store_bytes(
            self.blob.as_ref(),
            &self.upload_dir,
            req.extension.as_deref(),
            req.data,
        )
        .await?;

        let name = self.naming.file_name(folder.id, &req.name).await?;
        let file = self
            .files
            .create(&CreateFile {
                folder_id: folder.id,
                name,
                blob_path,
                extension: req.extension,
                mime_type: req.mime_type,
                size,
                is_public: req.is_public,
            })
            .await?;

        self.ledger.adjust_used_space(storage.id, size).await?;
        self.propagator.adjust(folder.id, size).await?;

        info!(user_id = %ctx.user_id, file_id = %file.id, size, "File created");
        Ok(file)
    }

    /// Copy a file into another folder, duplicating its blob.
    pub async fn copy_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        dest_folder_id: Uuid,
    ) -> AppResult<File> {
        let storage = self.ledger.storage_of(ctx).await?;
        let (file, _) = self.owned_file(&storage, file_id).await?;
        if file.in_trash() {
            return Err(AppError::precondition("Cannot copy a trashed file"));
        }
        let dest = self
            .folders
            .find_by_id(dest_folder_id)
            .await?
            .filter(|f| f.storage_id == storage.id && !f.in_trash())
            .ok_or_else(|| AppError::precondition("Destination folder does not exist"))?;

        self.ledger.check_fits(&storage, file.size)?;

        let clone = self.copy_engine.copy_file(&file, dest.id).await?;

        self.ledger.adjust_used_space(storage.id, file.size).await?;
        self.propagator.adjust(dest.id, file.size).await?;

        Ok(clone)
    }

    /// Move a file to another folder, re-bubbling its size out of the
    /// old chain and into the new one.
    pub async fn move_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        dest_folder_id: Uuid,
    ) -> AppResult<File> {
        let storage = self.ledger.storage_of(ctx).await?;
        let (file, _) = self.owned_file(&storage, file_id).await?;
        if file.in_trash() {
            return Err(AppError::precondition("Cannot move a trashed file"));
        }
        let dest = self
            .folders
            .find_by_id(dest_folder_id)
            .await?
            .filter(|f| f.storage_id == storage.id && !f.in_trash())
            .ok_or_else(|| AppError::precondition("Destination folder does not exist"))?;

        let old_folder_id = file.folder_id;
        let name = if old_folder_id == dest.id {
            file.name.clone()
        } else {
            self.naming.file_name(dest.id, &file.name).await?
        };

        let moved = self.files.reparent(file.id, dest.id, &name).await?;

        self.propagator.adjust(old_folder_id, -file.size).await?;
        self.propagator.adjust(dest.id, file.size).await?;

        info!(user_id = %ctx.user_id, file_id = %moved.id, dest = %dest.id, "File moved");
        Ok(moved)
    }

    /// Rename a file, counter-suffixing on collision.
    pub async fn rename_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        new_name: &str,
    ) -> AppResult<File> {
        validate_name(new_name)?;

        let storage = self.ledger.storage_of(ctx).await?;
        let (file, _) = self.owned_file(&storage, file_id).await?;
        if file.in_trash() {
            return Err(AppError::precondition("Cannot rename a trashed file"));
        }

        let name = if file.name == new_name {
            file.name.clone()
        } else {
            self.naming.file_name(file.folder_id, new_name).await?
        };

        let renamed = self.files.rename(file.id, &name).await?;
        info!(user_id = %ctx.user_id, file_id = %renamed.id, name = %renamed.name, "File renamed");
        Ok(renamed)
    }

    /// Load a file and its folder, verifying tenant ownership through
    /// the folder's storage.
    async fn owned_file(&self, storage: &Storage, file_id: Uuid) -> AppResult<(File, Folder)> {
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
        Ok((file, folder))
    }

    /// Load an active destination/holder folder owned by the tenant.
    async fn active_folder(&self, storage: &Storage, folder_id: Uuid) -> AppResult<Folder> {
        let folder = self
            .folders
            .find_by_id(folder_id)
            .await?
            .filter(|f| f.storage_id == storage.id)
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        if folder.in_trash() {
            return Err(AppError::precondition("Folder is in the trash"));
        }
        Ok(folder)
    }
}
