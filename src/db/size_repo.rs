// src/db/size_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::size::CustomSize};

#[derive(Clone)]
pub struct SizeRepository {
    pool: PgPool,
}

impl SizeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<CustomSize>, AppError> {
        let sizes = sqlx::query_as::<_, CustomSize>(
            r#"
            SELECT id, user_id, size_name, created_at
            FROM user_custom_sizes
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sizes)
    }

    pub async fn insert(&self, user_id: Uuid, size_name: &str) -> Result<CustomSize, AppError> {
        let size = sqlx::query_as::<_, CustomSize>(
            r#"
            INSERT INTO user_custom_sizes (user_id, size_name)
            VALUES ($1, $2)
            RETURNING id, user_id, size_name, created_at
            "#,
        )
        .bind(user_id)
        .bind(size_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(size)
    }

    // Só apaga se o tamanho for do próprio usuário
    pub async fn delete(&self, user_id: Uuid, size_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM user_custom_sizes WHERE id = $1 AND user_id = $2")
            .bind(size_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
