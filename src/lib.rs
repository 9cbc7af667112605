// src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod permissions;
pub mod services;
pub mod session;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, middleware::auth::auth_guard};

/// Monta o router completo da API.
pub fn app(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/pix/validate", post(handlers::referrals::validate_pix))
        .route("/plans/commission", get(handlers::referrals::get_commission))
        .route(
            "/storefronts/{slug}/order-message",
            post(handlers::storefront::build_order_message),
        );

    // Rotas protegidas pelo guardião de sessão
    let user_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let referral_routes = Router::new()
        .route("/stats", get(handlers::referrals::get_stats))
        .route("/withdrawals", post(handlers::referrals::request_withdrawal));

    let size_routes = Router::new()
        .route(
            "/",
            get(handlers::sizes::list_sizes).post(handlers::sizes::create_size),
        )
        .route("/{id}", delete(handlers::sizes::delete_size));

    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/referrals", referral_routes)
        .nest("/sizes", size_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", public_routes.merge(protected_routes))
        .with_state(app_state)
}
