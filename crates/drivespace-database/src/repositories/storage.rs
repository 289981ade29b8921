//! Tenant storage repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use drivespace_core::error::{AppError, ErrorKind};
use drivespace_core::result::AppResult;
use drivespace_entity::storage::{CreateStorage, Storage};

use super::StorageRepo;

/// Postgres-backed repository for tenant storage rows.
#[derive(Debug, Clone)]
pub struct StorageRepository {
    pool: PgPool,
}

impl StorageRepository {
    /// Create a new storage repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StorageRepo for StorageRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Storage>> {
        sqlx::query_as::<_, Storage>("SELECT * FROM storages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find storage", e))
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Storage>> {
        sqlx::query_as::<_, Storage>("SELECT * FROM storages WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find storage by user", e)
            })
    }

    async fn create(&self, data: &CreateStorage) -> AppResult<Storage> {
        sqlx::query_as::<_, Storage>(
            "INSERT INTO storages (user_id, space, used_space) \
             VALUES ($1, $2, 0) RETURNING *",
        )
        .bind(data.user_id)
        .bind(data.space)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("storages_user_id_key") =>
            {
                AppError::conflict(format!("Storage for user {} already exists", data.user_id))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create storage", e),
        })
    }

    async fn adjust_used_space(&self, id: Uuid, delta: f64) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE storages SET used_space = used_space + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to adjust used space", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Storage {id} not found")));
        }
        Ok(())
    }
}
