// src/models/size.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomSize {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "GG")]
    pub size_name: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSizePayload {
    #[schema(example = "GG")]
    pub size_name: String,
}
