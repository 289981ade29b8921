//! Repository traits and their sqlx/Postgres implementations.
//!
//! The tree mutation engines in `drivespace-service` are written against
//! these traits rather than concrete repositories, so the same engine
//! code runs over Postgres in production and over the in-memory stores
//! in tests. Every lookup is an explicit keyed call: ancestor chains
//! and subtrees are walked one `find_by_id`/`find_children` at a time,
//! keeping I/O cost visible at the call site.

pub mod file;
pub mod folder;
pub(crate) mod pattern;
pub mod storage;

use async_trait::async_trait;
use uuid::Uuid;

use drivespace_core::result::AppResult;
use drivespace_entity::file::{CreateFile, File};
use drivespace_entity::folder::{CreateFolder, Folder};
use drivespace_entity::storage::{CreateStorage, Storage};

pub use file::FileRepository;
pub use folder::FolderRepository;
pub use storage::StorageRepository;

/// Repository for tenant storage rows.
///
/// `adjust_used_space` is the only write path for the `used_space`
/// counter; callers never read-modify-write it.
#[async_trait]
pub trait StorageRepo: Send + Sync + 'static {
    /// Find a storage by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Storage>>;

    /// Find the storage owned by a user.
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Storage>>;

    /// Create a new tenant storage.
    async fn create(&self, data: &CreateStorage) -> AppResult<Storage>;

    /// Atomically add `delta` (positive or negative) to `used_space`.
    async fn adjust_used_space(&self, id: Uuid, delta: f64) -> AppResult<()>;
}

/// Repository for folder rows.
///
/// Unless stated otherwise, sibling queries are scoped to *active* rows
/// (no `deleted_at`); the `_all` variants also return trashed rows for
/// the bulk walks that need them.
#[async_trait]
pub trait FolderRepo: Send + Sync + 'static {
    /// Find a folder by ID, regardless of trash state.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>>;

    /// Find the root folder of a storage.
    async fn find_root(&self, storage_id: Uuid) -> AppResult<Option<Folder>>;

    /// List the active direct sub-folders of a folder.
    async fn find_children(&self, parent_id: Uuid) -> AppResult<Vec<Folder>>;

    /// List every direct sub-folder, including trashed rows.
    async fn find_children_all(&self, parent_id: Uuid) -> AppResult<Vec<Folder>>;

    /// Check whether an active sibling with this exact name exists.
    async fn name_exists(&self, parent_id: Uuid, name: &str) -> AppResult<bool>;

    /// Scan active siblings for the counter-suffix pattern.
    ///
    /// Returns the largest `n` among names matching `"{base} (n)"`, with
    /// the bare `base` counting as 0, or `None` when nothing matches.
    async fn max_name_suffix(&self, parent_id: Uuid, base: &str) -> AppResult<Option<i64>>;

    /// Create a new folder.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Rename a folder.
    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Folder>;

    /// Re-parent a folder, applying its (possibly re-resolved) name.
    async fn reparent(&self, id: Uuid, new_parent_id: Uuid, name: &str) -> AppResult<Folder>;

    /// Apply one signed size delta to every listed folder in a single
    /// bulk update. Returns the number of rows touched.
    async fn adjust_sizes(&self, ids: &[Uuid], delta: f64) -> AppResult<u64>;

    /// Bulk-set the `parent_trashed` flag.
    async fn set_parent_trashed(&self, ids: &[Uuid], flag: bool) -> AppResult<u64>;

    /// Mark a folder as a trash root (set its own `deleted_at`).
    async fn soft_delete(&self, id: Uuid) -> AppResult<Folder>;

    /// Clear a folder's own `deleted_at`.
    async fn restore(&self, id: Uuid) -> AppResult<Folder>;

    /// Permanently delete the listed folder rows.
    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64>;

    /// List a storage's trash roots: folders soft-deleted in their own
    /// right, not through an ancestor.
    async fn find_trash_roots(&self, storage_id: Uuid) -> AppResult<Vec<Folder>>;
}

/// Repository for file rows.
#[async_trait]
pub trait FileRepo: Send + Sync + 'static {
    /// Find a file by ID, regardless of trash state.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>>;

    /// List the active files of a folder.
    async fn find_by_folder(&self, folder_id: Uuid) -> AppResult<Vec<File>>;

    /// List every file of a folder, including trashed rows.
    async fn find_by_folder_all(&self, folder_id: Uuid) -> AppResult<Vec<File>>;

    /// Check whether an active sibling with this exact name exists.
    async fn name_exists(&self, folder_id: Uuid, name: &str) -> AppResult<bool>;

    /// Scan active siblings for the counter-suffix pattern (same contract
    /// as [`FolderRepo::max_name_suffix`]).
    async fn max_name_suffix(&self, folder_id: Uuid, base: &str) -> AppResult<Option<i64>>;

    /// Create a new file record.
    async fn create(&self, data: &CreateFile) -> AppResult<File>;

    /// Rename a file.
    async fn rename(&self, id: Uuid, name: &str) -> AppResult<File>;

    /// Move a file to another folder, applying its (possibly re-resolved)
    /// name.
    async fn reparent(&self, id: Uuid, folder_id: Uuid, name: &str) -> AppResult<File>;

    /// Bulk-set the `folder_trashed` flag.
    async fn set_folder_trashed(&self, ids: &[Uuid], flag: bool) -> AppResult<u64>;

    /// Mark a file as a trash root (set its own `deleted_at`).
    async fn soft_delete(&self, id: Uuid) -> AppResult<File>;

    /// Clear a file's own `deleted_at`.
    async fn restore(&self, id: Uuid) -> AppResult<File>;

    /// Permanently delete the listed file rows.
    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64>;

    /// List a storage's file trash roots: files soft-deleted in their
    /// own right, not through a trashed folder.
    async fn find_trash_roots(&self, storage_id: Uuid) -> AppResult<Vec<File>>;
}
