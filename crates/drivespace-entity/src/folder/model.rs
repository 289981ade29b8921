//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A folder in a tenant's file tree.
///
/// `size` is the aggregate of all descendant file sizes and is kept
/// consistent by the size propagator. `parent_trashed` marks a folder
/// whose strict ancestor was soft-deleted, as opposed to `deleted_at`
/// which marks the folder as a trash root in its own right.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// The tenant storage this folder belongs to.
    pub storage_id: Uuid,
    /// Parent folder ID (None only for the single root per storage).
    pub parent_id: Option<Uuid>,
    /// Folder name, unique among active siblings.
    pub name: String,
    /// Aggregate size of all descendant files, in bytes.
    pub size: f64,
    /// Whether a strict ancestor of this folder is soft-deleted.
    pub parent_trashed: bool,
    /// Soft-delete timestamp (set when this folder is itself a trash root).
    pub deleted_at: Option<DateTime<Utc>>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is the root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this folder was itself soft-deleted (a trash root).
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Check if this folder is unreachable through the active tree,
    /// either as a trash root or through a trashed ancestor.
    pub fn in_trash(&self) -> bool {
        self.is_trashed() || self.parent_trashed
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The tenant storage.
    pub storage_id: Uuid,
    /// Parent folder (None for the root).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Initial aggregate size (non-zero only when cloning a subtree).
    pub size: f64,
}

impl CreateFolder {
    /// Payload for an empty folder under a parent.
    pub fn empty(storage_id: Uuid, parent_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            storage_id,
            parent_id: Some(parent_id),
            name: name.into(),
            size: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trash_state() {
        let mut folder = Folder {
            id: Uuid::new_v4(),
            storage_id: Uuid::new_v4(),
            parent_id: Some(Uuid::new_v4()),
            name: "docs".to_string(),
            size: 0.0,
            parent_trashed: false,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!folder.in_trash());

        folder.parent_trashed = true;
        assert!(folder.in_trash());
        assert!(!folder.is_trashed());

        folder.parent_trashed = false;
        folder.deleted_at = Some(Utc::now());
        assert!(folder.is_trashed());
        assert!(folder.in_trash());
    }
}
