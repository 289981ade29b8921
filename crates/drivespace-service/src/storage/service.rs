//! Tenant provisioning and the quota ledger.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use drivespace_core::error::AppError;
use drivespace_core::result::AppResult;
use drivespace_database::{FolderRepo, StorageRepo};
use drivespace_entity::folder::CreateFolder;
use drivespace_entity::storage::{CreateStorage, QuotaUsage, Storage};

use crate::context::RequestContext;

/// Name given to the distinguished root folder of every storage.
const ROOT_FOLDER_NAME: &str = "root";

/// Manages tenant storages and authorizes size-increasing writes.
///
/// This service is the quota ledger: the copy/move/trash engines ask it
/// whether a delta fits and route every `used_space` mutation through
/// [`StorageService::adjust_used_space`]. Capacity math lives nowhere
/// else.
#[derive(Clone)]
pub struct StorageService {
    storages: Arc<dyn StorageRepo>,
    folders: Arc<dyn FolderRepo>,
    /// Capacity granted to freshly provisioned storages, in bytes.
    default_space: f64,
}

impl StorageService {
    /// Creates a new storage service.
    pub fn new(
        storages: Arc<dyn StorageRepo>,
        folders: Arc<dyn FolderRepo>,
        default_space: f64,
    ) -> Self {
        Self {
            storages,
            folders,
            default_space,
        }
    }

    /// Provision the storage for a new user: one quota-bounded space
    /// and its root folder. A user gets exactly one storage.
    pub async fn provision(&self, user_id: Uuid) -> AppResult<Storage> {
        let storage = self
            .storages
            .create(&CreateStorage {
                user_id,
                space: self.default_space,
            })
            .await?;

        self.folders
            .create(&CreateFolder {
                storage_id: storage.id,
                parent_id: None,
                name: ROOT_FOLDER_NAME.to_string(),
                size: 0.0,
            })
            .await?;

        info!(%user_id, storage_id = %storage.id, space = storage.space, "Provisioned storage");
        Ok(storage)
    }

    /// Load the caller's storage.
    pub async fn storage_of(&self, ctx: &RequestContext) -> AppResult<Storage> {
        self.storages
            .find_by_user(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Storage not found"))
    }

    /// Authorize a size-increasing write of `delta` bytes.
    ///
    /// Checked against the given snapshot before the write; the snapshot
    /// read and the later increment are not serialized, which is the
    /// accepted race of the concurrency model.
    pub fn check_fits(&self, storage: &Storage, delta: f64) -> AppResult<()> {
        if !storage.fits(delta) {
            return Err(AppError::quota_exceeded(format!(
                "Storage has {} bytes free, {delta} required",
                storage.remaining()
            )));
        }
        Ok(())
    }

    /// Atomically adjust a storage's used space.
    pub async fn adjust_used_space(&self, storage_id: Uuid, delta: f64) -> AppResult<()> {
        self.storages.adjust_used_space(storage_id, delta).await
    }

    /// Quota usage report for the caller's storage.
    pub async fn usage(&self, ctx: &RequestContext) -> AppResult<QuotaUsage> {
        let storage = self.storage_of(ctx).await?;
        Ok(QuotaUsage::from_storage(&storage))
    }
}
