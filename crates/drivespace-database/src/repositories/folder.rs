//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use drivespace_core::error::{AppError, ErrorKind};
use drivespace_core::result::AppResult;
use drivespace_entity::folder::{CreateFolder, Folder};

use super::FolderRepo;
use super::pattern::suffix_regex;

/// Postgres-backed repository for folder rows.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderRepo for FolderRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn find_root(&self, storage_id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE storage_id = $1 AND parent_id IS NULL",
        )
        .bind(storage_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find root folder", e))
    }

    async fn find_children(&self, parent_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parent_id = $1 AND deleted_at IS NULL ORDER BY name ASC",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    async fn find_children_all(&self, parent_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE parent_id = $1")
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list all children", e)
            })
    }

    async fn name_exists(&self, parent_id: Uuid, name: &str) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM folders \
             WHERE parent_id = $1 AND name = $2 AND deleted_at IS NULL",
        )
        .bind(parent_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check folder name", e)
        })?;
        Ok(count > 0)
    }

    async fn max_name_suffix(&self, parent_id: Uuid, base: &str) -> AppResult<Option<i64>> {
        sqlx::query_scalar(
            "SELECT MAX(CASE WHEN name = $2 THEN 0 \
                        ELSE (substring(name from ' \\(([0-9]+)\\)$'))::bigint END) \
             FROM folders \
             WHERE parent_id = $1 AND deleted_at IS NULL AND (name = $2 OR name ~ $3)",
        )
        .bind(parent_id)
        .bind(base)
        .bind(suffix_regex(base))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to scan folder name suffixes", e)
        })
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (storage_id, parent_id, name, size) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.storage_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(data.size)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("folders_parent_id_name_key") =>
            {
                AppError::conflict(format!("Folder name '{}' already exists", data.name))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create folder", e),
        })
    }

    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rename folder", e))?
        .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    async fn reparent(&self, id: Uuid, new_parent_id: Uuid, name: &str) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parent_id = $2, name = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(new_parent_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to move folder", e))?
        .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    async fn adjust_sizes(&self, ids: &[Uuid], delta: f64) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE folders SET size = size + $2, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to adjust folder sizes", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn set_parent_trashed(&self, ids: &[Uuid], flag: bool) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE folders SET parent_trashed = $2, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(flag)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to flag folders", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to soft-delete folder", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    async fn restore(&self, id: Uuid) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET deleted_at = NULL, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to restore folder", e))?
        .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM folders WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete folders", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn find_trash_roots(&self, storage_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE storage_id = $1 AND deleted_at IS NOT NULL AND parent_trashed = FALSE \
             ORDER BY deleted_at DESC",
        )
        .bind(storage_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list folder trash roots", e)
        })
    }
}
