// src/handlers/sizes.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermProductsWrite, RequirePermission},
    },
    models::size::{CreateSizePayload, CustomSize},
};

// GET /api/sizes
#[utoipa::path(
    get,
    path = "/api/sizes",
    tag = "Catalog",
    responses((status = 200, description = "Tamanhos personalizados do vendedor", body = Vec<CustomSize>)),
    security(("session" = []))
)]
pub async fn list_sizes(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermProductsWrite>,
) -> Result<impl IntoResponse, ApiError> {
    let sizes = app_state
        .size_service
        .list_custom_sizes(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(sizes))
}

// POST /api/sizes
#[utoipa::path(
    post,
    path = "/api/sizes",
    tag = "Catalog",
    request_body = CreateSizePayload,
    responses(
        (status = 201, description = "Tamanho criado", body = CustomSize),
        (status = 204, description = "Nome vazio ou já existente: nada a fazer")
    ),
    security(("session" = []))
)]
pub async fn create_size(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermProductsWrite>,
    Json(payload): Json<CreateSizePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let created = app_state
        .size_service
        .add_custom_size(user.0.id, &payload.size_name)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(match created {
        Some(size) => (StatusCode::CREATED, Json(size)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

// DELETE /api/sizes/{id}
#[utoipa::path(
    delete,
    path = "/api/sizes/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do tamanho")),
    responses(
        (status = 204, description = "Removido"),
        (status = 404, description = "Não encontrado")
    ),
    security(("session" = []))
)]
pub async fn delete_size(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermProductsWrite>,
    Path(size_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .size_service
        .delete_custom_size(user.0.id, size_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
