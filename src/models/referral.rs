// src/models/referral.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::pix::PixKeyType;

// As colunas de status são TEXT; a conversão é feita no FromRow via `try_from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CommissionStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Paid,
    Rejected,
}

impl TryFrom<String> for CommissionStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(CommissionStatus::Pending),
            "paid" => Ok(CommissionStatus::Paid),
            other => Err(format!("status de comissão desconhecido: {other}")),
        }
    }
}

impl TryFrom<String> for WithdrawalStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            "paid" => Ok(WithdrawalStatus::Paid),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            other => Err(format!("status de saque desconhecido: {other}")),
        }
    }
}

impl WithdrawalStatus {
    /// Pedidos que ainda comprometem o saldo de comissões pendentes.
    pub fn reserves_balance(self) -> bool {
        matches!(self, WithdrawalStatus::Pending | WithdrawalStatus::Approved)
    }
}

/// Comissão de indicação, com o status da assinatura que a gerou.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRecord {
    pub referrer_id: Uuid,
    #[schema(value_type = f64, example = 100.0)]
    pub amount: Decimal,
    #[sqlx(try_from = "String")]
    pub status: CommissionStatus,
    // Vem do LEFT JOIN com subscriptions
    #[schema(example = "active")]
    pub subscription_status: Option<String>,
}

impl CommissionRecord {
    pub fn has_active_subscription(&self) -> bool {
        self.subscription_status.as_deref() == Some("active")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRecord {
    pub user_id: Uuid,
    #[schema(value_type = f64, example = 50.0)]
    pub amount: Decimal,
    #[sqlx(try_from = "String")]
    pub status: WithdrawalStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralStats {
    pub total_referrals: u32,
    pub active_referrals: u32,
    #[schema(value_type = f64)]
    pub total_commissions: Decimal,
    #[schema(value_type = f64)]
    pub pending_commissions: Decimal,
    #[schema(value_type = f64)]
    pub paid_commissions: Decimal,
    #[schema(value_type = f64)]
    pub available_for_withdrawal: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub pix_key: String,
    pub pix_key_type: String,
    #[sqlx(try_from = "String")]
    pub status: WithdrawalStatus,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalPayload {
    #[schema(value_type = f64, example = 150.0)]
    pub amount: Decimal,
    #[schema(example = "123.456.789-09")]
    pub pix_key: String,
    pub pix_key_type: PixKeyType,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PixValidationPayload {
    pub pix_key: String,
    pub pix_key_type: PixKeyType,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PixValidationResponse {
    pub valid: bool,
    pub formatted: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CommissionQuery {
    /// Nome livre do plano, ex.: "Plano Anual"
    pub plan_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionResponse {
    pub plan_type: String,
    #[schema(value_type = f64, example = 100.0)]
    pub amount: Decimal,
}
