//! Deep subtree and single-file cloning.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use drivespace_blob::transfer;
use drivespace_core::result::AppResult;
use drivespace_core::traits::blob::BlobStore;
use drivespace_database::{FileRepo, FolderRepo};
use drivespace_entity::file::{CreateFile, File};
use drivespace_entity::folder::{CreateFolder, Folder};

use crate::naming::NameResolver;

/// Clones folder subtrees and single files into a new parent.
///
/// The engine duplicates rows and blobs only: it adjusts no quota and
/// bubbles no ancestor sizes, so the same call sites compose for
/// folder-level and file-level copies. The caller performs exactly one
/// size propagation and one used-space increment afterwards.
///
/// A failure mid-copy leaves already-created rows and blobs in place;
/// per the error policy there is no automatic rollback and the caller
/// surfaces the operation as fatal.
#[derive(Clone)]
pub struct CopyEngine {
    folders: Arc<dyn FolderRepo>,
    files: Arc<dyn FileRepo>,
    blob: Arc<dyn BlobStore>,
    naming: NameResolver,
    upload_dir: String,
}

impl CopyEngine {
    /// Creates a new copy engine.
    pub fn new(
        folders: Arc<dyn FolderRepo>,
        files: Arc<dyn FileRepo>,
        blob: Arc<dyn BlobStore>,
        upload_dir: impl Into<String>,
    ) -> Self {
        let naming = NameResolver::new(folders.clone(), files.clone());
        Self {
            folders,
            files,
            blob,
            naming,
            upload_dir: upload_dir.into(),
        }
    }

    /// Deep-copy the subtree rooted at `source` into `dest_parent_id`.
    ///
    /// Folder rows copy their aggregate `size` verbatim: content size is
    /// structural and the source is trusted to be consistent already.
    /// Only the top-level folder is renamed with the `(Copy)` rule;
    /// nested folders and files keep their names unless they collide in
    /// their own new parent. Trashed rows are not copied.
    pub async fn copy_tree(&self, source: &Folder, dest_parent_id: Uuid) -> AppResult<Folder> {
        let name = self
            .naming
            .folder_copy_name(dest_parent_id, &source.name)
            .await?;

        let new_root = self
            .folders
            .create(&CreateFolder {
                storage_id: source.storage_id,
                parent_id: Some(dest_parent_id),
                name,
                size: source.size,
            })
            .await?;

        // Pairs of (source folder, its fresh clone) still to be filled in.
        let mut pending = VecDeque::from([(source.id, new_root.id)]);

        while let Some((src_id, dst_id)) = pending.pop_front() {
            for file in self.files.find_by_folder(src_id).await? {
                self.clone_file(&file, dst_id).await?;
            }

            for child in self.folders.find_children(src_id).await? {
                let child_name = self.naming.folder_name(dst_id, &child.name).await?;
                let clone = self
                    .folders
                    .create(&CreateFolder {
                        storage_id: child.storage_id,
                        parent_id: Some(dst_id),
                        name: child_name,
                        size: child.size,
                    })
                    .await?;
                pending.push_back((child.id, clone.id));
            }
        }

        info!(
            source = %source.id,
            clone = %new_root.id,
            dest = %dest_parent_id,
            "Copied folder subtree"
        );
        Ok(new_root)
    }

    /// Copy a single file into `dest_folder_id`, duplicating its blob.
    pub async fn copy_file(&self, file: &File, dest_folder_id: Uuid) -> AppResult<File> {
        let clone = self.clone_file(file, dest_folder_id).await?;
        info!(source = %file.id, clone = %clone.id, dest = %dest_folder_id, "Copied file");
        Ok(clone)
    }

    async fn clone_file(&self, file: &File, dest_folder_id: Uuid) -> AppResult<File> {
        let blob_path = transfer::duplicate(
            self.blob.as_ref(),
            &file.blob_path,
            &self.upload_dir,
            file.extension.as_deref(),
        )
        .await?;

        let name = self.naming.file_name(dest_folder_id, &file.name).await?;
        debug!(source = %file.blob_path, clone = %blob_path, "Duplicated blob");

        self.files
            .create(&CreateFile {
                folder_id: dest_folder_id,
                name,
                blob_path,
                extension: file.extension.clone(),
                mime_type: file.mime_type.clone(),
                size: file.size,
                is_public: file.is_public,
            })
            .await
    }
}
