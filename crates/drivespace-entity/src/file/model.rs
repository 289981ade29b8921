//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file stored in DriveSpace.
///
/// The display name carries no extension; `extension` is tracked
/// separately so renames never detach a file from its blob type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// The folder containing this file.
    pub folder_id: Uuid,
    /// Display name, unique among active siblings (without extension).
    pub name: String,
    /// Path of the backing blob in the blob store.
    pub blob_path: String,
    /// File extension (lowercase, without the dot), if any.
    pub extension: Option<String>,
    /// MIME type of the file content.
    pub mime_type: Option<String>,
    /// File size in bytes. Never negative.
    pub size: f64,
    /// Whether the file is publicly visible.
    pub is_public: bool,
    /// Whether the containing folder (or one of its ancestors) is trashed.
    pub folder_trashed: bool,
    /// Soft-delete timestamp (set when the file is itself a trash root).
    pub deleted_at: Option<DateTime<Utc>>,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Check if this file was itself soft-deleted (a trash root).
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Check if this file is unreachable through the active tree.
    pub fn in_trash(&self) -> bool {
        self.is_trashed() || self.folder_trashed
    }

    /// Full display name including the extension, if any.
    pub fn full_name(&self) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", self.name, ext),
            None => self.name.clone(),
        }
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// The folder to place the file in.
    pub folder_id: Uuid,
    /// Display name (without extension).
    pub name: String,
    /// Path of the backing blob.
    pub blob_path: String,
    /// File extension.
    pub extension: Option<String>,
    /// MIME type.
    pub mime_type: Option<String>,
    /// File size in bytes.
    pub size: f64,
    /// Whether the file is publicly visible.
    pub is_public: bool,
}
