// src/db/storefront_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::storefront::StorefrontSettings};

#[derive(Clone)]
pub struct StorefrontRepository {
    pool: PgPool,
}

impl StorefrontRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<StorefrontSettings>, AppError> {
        // O nome exibido cai para o nome do usuário quando a vitrine não define um
        let settings = sqlx::query_as::<_, StorefrontSettings>(
            r#"
            SELECT
                uss.user_id,
                uss.slug,
                COALESCE(NULLIF(uss.display_name, ''), u.display_name) AS seller_name,
                uss.whatsapp_number,
                uss.currency,
                uss.language
            FROM user_storefront_settings uss
            JOIN users u ON u.id = uss.user_id
            WHERE uss.slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }
}
