// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::permissions;
use crate::services;
use crate::session;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Referrals ---
        handlers::referrals::get_stats,
        handlers::referrals::request_withdrawal,
        handlers::referrals::validate_pix,
        handlers::referrals::get_commission,

        // --- Storefront ---
        handlers::storefront::build_order_message,

        // --- Catalog ---
        handlers::sizes::list_sizes,
        handlers::sizes::create_size,
        handlers::sizes::delete_size,
    ),
    components(
        schemas(
            // --- Auth ---
            session::SessionRecord,
            permissions::Role,
            permissions::RoleCapabilities,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Referrals ---
            services::pix::PixKeyType,
            models::referral::CommissionStatus,
            models::referral::WithdrawalStatus,
            models::referral::ReferralStats,
            models::referral::WithdrawalRequest,
            models::referral::WithdrawalPayload,
            models::referral::PixValidationPayload,
            models::referral::PixValidationResponse,
            models::referral::CommissionResponse,

            // --- Storefront ---
            models::cart::CartItem,
            models::cart::CartStats,
            models::cart::OrderMessagePayload,
            models::cart::OrderMessageResponse,

            // --- Catalog ---
            models::size::CustomSize,
            models::size::CreateSizePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login e sessão"),
        (name = "Referrals", description = "Indicações, comissões e saques via PIX"),
        (name = "Storefront", description = "Vitrine pública e pedido pelo WhatsApp"),
        (name = "Catalog", description = "Cadastros auxiliares do catálogo")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        // Bearer + X-User-ID + X-User-Role, todos obrigatórios
        components.add_security_scheme(
            "session",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
        components.add_security_scheme(
            "user_id",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-User-ID"))),
        );
        components.add_security_scheme(
            "user_role",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-User-Role"))),
        );
    }
}
