// src/models/storefront.rs

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// O pedaço de `user_storefront_settings` que a mensagem de pedido usa.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontSettings {
    pub user_id: Uuid,
    pub slug: String,
    pub seller_name: String,
    pub whatsapp_number: Option<String>,
    pub currency: Option<String>,
    pub language: Option<String>,
}
