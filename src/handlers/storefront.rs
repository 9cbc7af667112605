// src/handlers/storefront.rs

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::cart::{OrderMessagePayload, OrderMessageResponse},
    services::cart_service::{calculate_cart_stats, generate_cart_order_message, whatsapp_link},
};

const DEFAULT_CURRENCY: &str = "BRL";

// POST /api/storefronts/{slug}/order-message
#[utoipa::path(
    post,
    path = "/api/storefronts/{slug}/order-message",
    tag = "Storefront",
    request_body = OrderMessagePayload,
    params(("slug" = String, Path, description = "Slug público da vitrine")),
    responses(
        (status = 200, description = "Totais, mensagem e link do WhatsApp", body = OrderMessageResponse),
        (status = 400, description = "Carrinho inválido"),
        (status = 404, description = "Vitrine não encontrada")
    )
)]
pub async fn build_order_message(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
    locale: Locale,
    headers: HeaderMap,
    Json(payload): Json<OrderMessagePayload>,
) -> Result<Json<OrderMessageResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    // Totais antes de ir ao banco: carrinho absurdo para aqui com 400
    let stats = calculate_cart_stats(&payload.items).map_err(|e| e.to_api_error(&locale))?;

    let storefront = app_state
        .storefront_repo
        .find_by_slug(&slug)
        .await
        .map_err(|e| e.to_api_error(&locale))?
        .ok_or_else(|| AppError::NotFound(format!("vitrine '{slug}'")).to_api_error(&locale))?;

    // Idioma: payload > vitrine > pt
    let language = payload
        .language
        .as_deref()
        .or(storefront.language.as_deref())
        .unwrap_or("pt-BR");
    let currency = storefront.currency.as_deref().unwrap_or(DEFAULT_CURRENCY);

    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    let link_base = app_state.config.links.resolve(origin);

    let message = generate_cart_order_message(
        &payload.items,
        stats.total,
        &storefront.seller_name,
        &storefront.slug,
        currency,
        language,
        &link_base,
    );

    let whatsapp_url = storefront
        .whatsapp_number
        .as_deref()
        .and_then(|phone| whatsapp_link(phone, &message));

    Ok(Json(OrderMessageResponse {
        item_count: stats.item_count,
        total: stats.total,
        message,
        whatsapp_url,
    }))
}
