//! File repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use drivespace_core::error::{AppError, ErrorKind};
use drivespace_core::result::AppResult;
use drivespace_entity::file::{CreateFile, File};

use super::FileRepo;
use super::pattern::suffix_regex;

/// Postgres-backed repository for file rows.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepo for FileRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_by_folder(&self, folder_id: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE folder_id = $1 AND deleted_at IS NULL ORDER BY name ASC",
        )
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn find_by_folder_all(&self, folder_id: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE folder_id = $1")
            .bind(folder_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list all files", e))
    }

    async fn name_exists(&self, folder_id: Uuid, name: &str) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM files \
             WHERE folder_id = $1 AND name = $2 AND deleted_at IS NULL",
        )
        .bind(folder_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check file name", e))?;
        Ok(count > 0)
    }

    async fn max_name_suffix(&self, folder_id: Uuid, base: &str) -> AppResult<Option<i64>> {
        sqlx::query_scalar(
            "SELECT MAX(CASE WHEN name = $2 THEN 0 \
                        ELSE (substring(name from ' \\(([0-9]+)\\)$'))::bigint END) \
             FROM files \
             WHERE folder_id = $1 AND deleted_at IS NULL AND (name = $2 OR name ~ $3)",
        )
        .bind(folder_id)
        .bind(base)
        .bind(suffix_regex(base))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to scan file name suffixes", e)
        })
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (folder_id, name, blob_path, extension, mime_type, size, is_public) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.blob_path)
        .bind(&data.extension)
        .bind(&data.mime_type)
        .bind(data.size)
        .bind(data.is_public)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("files_folder_id_name_key") =>
            {
                AppError::conflict(format!("File name '{}' already exists", data.name))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create file", e),
        })
    }

    async fn rename(&self, id: Uuid, name: &str) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rename file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    async fn reparent(&self, id: Uuid, folder_id: Uuid, name: &str) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET folder_id = $2, name = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(folder_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to move file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    async fn set_folder_trashed(&self, ids: &[Uuid], flag: bool) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE files SET folder_trashed = $2, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(flag)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to flag files", e))?;
        Ok(result.rows_affected())
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to soft-delete file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    async fn restore(&self, id: Uuid) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET deleted_at = NULL, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to restore file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM files WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete files", e))?;
        Ok(result.rows_affected())
    }

    async fn find_trash_roots(&self, storage_id: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT files.* FROM files \
             INNER JOIN folders ON folders.id = files.folder_id \
             WHERE folders.storage_id = $1 \
               AND files.deleted_at IS NOT NULL AND files.folder_trashed = FALSE \
             ORDER BY files.deleted_at DESC",
        )
        .bind(storage_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list file trash roots", e)
        })
    }
}
