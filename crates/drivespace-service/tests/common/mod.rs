//! Shared fixture for the engine integration suites: a fully wired
//! service stack over the in-memory stores, with one provisioned tenant.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use drivespace_blob::MemoryBlobStore;
use drivespace_database::memory::{
    MemoryFileRepository, MemoryFolderRepository, MemoryStorageRepository,
};
use drivespace_database::{FileRepo, FolderRepo};
use drivespace_entity::file::File;
use drivespace_entity::folder::Folder;
use drivespace_entity::storage::Storage;
use drivespace_service::file::UploadFileRequest;
use drivespace_service::{
    FileService, FolderService, RequestContext, StorageService, TrashService,
};

pub struct TestEnv {
    pub ctx: RequestContext,
    pub storage: Storage,
    pub root: Folder,
    pub folders: Arc<MemoryFolderRepository>,
    pub files: Arc<MemoryFileRepository>,
    pub blob: Arc<MemoryBlobStore>,
    pub ledger: Arc<StorageService>,
    pub folder_svc: FolderService,
    pub file_svc: FileService,
    pub trash_svc: TrashService,
}

/// A tenant with the default test capacity.
pub async fn env() -> TestEnv {
    env_with_space(1_000_000.0).await
}

/// A tenant with the given capacity in bytes.
pub async fn env_with_space(space: f64) -> TestEnv {
    let storages = Arc::new(MemoryStorageRepository::new());
    let folders = Arc::new(MemoryFolderRepository::new());
    let files = Arc::new(MemoryFileRepository::new(folders.clone()));
    let blob = Arc::new(MemoryBlobStore::new("/blobs"));

    let ledger = Arc::new(StorageService::new(
        storages.clone(),
        folders.clone(),
        space,
    ));
    let folder_svc = FolderService::new(
        ledger.clone(),
        folders.clone(),
        files.clone(),
        blob.clone(),
        "uploads",
    );
    let file_svc = FileService::new(
        ledger.clone(),
        folders.clone(),
        files.clone(),
        blob.clone(),
        "uploads",
    );
    let trash_svc = TrashService::new(ledger.clone(), folders.clone(), files.clone(), blob.clone());

    let ctx = RequestContext::new(Uuid::new_v4());
    let storage = ledger.provision(ctx.user_id).await.unwrap();
    let root = folders
        .find_root(storage.id)
        .await
        .unwrap()
        .expect("provisioning creates the root folder");

    TestEnv {
        ctx,
        storage,
        root,
        folders,
        files,
        blob,
        ledger,
        folder_svc,
        file_svc,
        trash_svc,
    }
}

impl TestEnv {
    /// Create a folder through the boundary service.
    pub async fn mkdir(&self, parent: Uuid, name: &str) -> Folder {
        self.folder_svc
            .create_folder(&self.ctx, parent, name)
            .await
            .unwrap()
    }

    /// Upload a file of `size` zero bytes through the boundary service.
    pub async fn upload(&self, folder_id: Uuid, name: &str, size: usize) -> File {
        self.file_svc
            .create_file(
                &self.ctx,
                UploadFileRequest {
                    folder_id,
                    name: name.to_string(),
                    extension: Some("bin".to_string()),
                    mime_type: Some("application/octet-stream".to_string()),
                    data: Bytes::from(vec![0u8; size]),
                    is_public: false,
                },
            )
            .await
            .unwrap()
    }

    /// Re-read a folder row.
    pub async fn folder(&self, id: Uuid) -> Folder {
        self.folders.find_by_id(id).await.unwrap().unwrap()
    }

    /// Re-read a file row.
    pub async fn file(&self, id: Uuid) -> File {
        self.files.find_by_id(id).await.unwrap().unwrap()
    }

    /// The tenant's current used space.
    pub async fn used_space(&self) -> f64 {
        self.ledger.storage_of(&self.ctx).await.unwrap().used_space
    }

    /// Sum of the sizes of every file row still present under a folder
    /// (i.e. everything not hard-deleted), trashed rows included.
    pub async fn subtree_file_sum(&self, folder_id: Uuid) -> f64 {
        let mut sum = 0.0;
        let mut stack = vec![folder_id];
        while let Some(id) = stack.pop() {
            for file in self.files.find_by_folder_all(id).await.unwrap() {
                sum += file.size;
            }
            for child in self.folders.find_children_all(id).await.unwrap() {
                stack.push(child.id);
            }
        }
        sum
    }
}
