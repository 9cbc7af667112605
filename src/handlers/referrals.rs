// src/handlers/referrals.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermReferralsRead, PermWithdrawalsWrite, RequirePermission},
    },
    models::referral::{
        CommissionQuery, CommissionResponse, PixValidationPayload, PixValidationResponse,
        ReferralStats, WithdrawalPayload, WithdrawalRequest,
    },
    services::pix::{format_pix_key, get_commission_amount, validate_pix_key},
};

// GET /api/referrals/stats
#[utoipa::path(
    get,
    path = "/api/referrals/stats",
    tag = "Referrals",
    responses(
        (status = 200, description = "Resumo das indicações (zerado se a leitura falhar)", body = ReferralStats),
        (status = 401, description = "Sessão expirada"),
        (status = 403, description = "Sem permissão")
    ),
    security(("session" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermReferralsRead>,
) -> Json<ReferralStats> {
    // Painel: erro de leitura aparece como zeros, nunca como falha
    Json(app_state.referral_service.get_referral_stats(user.0.id).await)
}

// POST /api/referrals/withdrawals
#[utoipa::path(
    post,
    path = "/api/referrals/withdrawals",
    tag = "Referrals",
    request_body = WithdrawalPayload,
    responses(
        (status = 201, description = "Pedido de saque criado", body = WithdrawalRequest),
        (status = 400, description = "Valor ou chave PIX inválidos"),
        (status = 401, description = "Sessão expirada"),
        (status = 403, description = "Sem permissão")
    ),
    security(("session" = []))
)]
pub async fn request_withdrawal(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermWithdrawalsWrite>,
    Json(payload): Json<WithdrawalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let request = app_state
        .referral_service
        .request_withdrawal(user.0.id, payload.amount, &payload.pix_key, payload.pix_key_type)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(request)))
}

// POST /api/pix/validate
#[utoipa::path(
    post,
    path = "/api/pix/validate",
    tag = "Referrals",
    request_body = PixValidationPayload,
    responses(
        (status = 200, description = "Resultado da validação e chave formatada", body = PixValidationResponse)
    )
)]
pub async fn validate_pix(Json(payload): Json<PixValidationPayload>) -> Json<PixValidationResponse> {
    Json(PixValidationResponse {
        valid: validate_pix_key(&payload.pix_key, payload.pix_key_type),
        formatted: format_pix_key(&payload.pix_key, payload.pix_key_type),
    })
}

// GET /api/plans/commission?planType=...
#[utoipa::path(
    get,
    path = "/api/plans/commission",
    tag = "Referrals",
    params(CommissionQuery),
    responses(
        (status = 200, description = "Comissão fixa do plano", body = CommissionResponse)
    )
)]
pub async fn get_commission(Query(query): Query<CommissionQuery>) -> Json<CommissionResponse> {
    let amount = get_commission_amount(&query.plan_type);
    Json(CommissionResponse {
        plan_type: query.plan_type,
        amount,
    })
}
