// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{ReferralRepository, SizeRepository, StorefrontRepository, UserRepository},
    services::{
        auth::{AuthService, SessionTokens},
        cart_service::LinkConfig,
        referral_service::ReferralService,
        size_service::SizeService,
    },
};

const DEFAULT_SESSION_HOURS: i64 = 24;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_CANONICAL_ORIGIN: &str = "https://vitrineturbo.com";
const DEFAULT_PRODUCTION_HOSTS: &str = "vitrineturbo.com,www.vitrineturbo.com";

/// Tudo o que vem do ambiente (.env).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub session_duration: chrono::Duration,
    pub bind_addr: String,
    pub links: LinkConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let session_hours = match env::var("SESSION_DURATION_HOURS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .with_context(|| format!("SESSION_DURATION_HOURS inválido: {raw}"))?,
            Err(_) => DEFAULT_SESSION_HOURS,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let canonical_origin = env::var("CANONICAL_ORIGIN")
            .unwrap_or_else(|_| DEFAULT_CANONICAL_ORIGIN.to_string());
        let production_hosts = env::var("PRODUCTION_HOSTS")
            .unwrap_or_else(|_| DEFAULT_PRODUCTION_HOSTS.to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            session_duration: chrono::Duration::hours(session_hours),
            bind_addr,
            links: LinkConfig::new(&canonical_origin, production_hosts.split(',')),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub auth_service: AuthService,
    pub referral_service: ReferralService,
    pub size_service: SizeService,
    pub storefront_repo: StorefrontRepository,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(config, db_pool))
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn from_pool(config: Config, db_pool: PgPool) -> Self {
        let tokens = SessionTokens::new(&config.jwt_secret, config.session_duration);
        let auth_service = AuthService::new(UserRepository::new(db_pool.clone()), tokens);
        let referral_service = ReferralService::new(ReferralRepository::new(db_pool.clone()));
        let size_service = SizeService::new(SizeRepository::new(db_pool.clone()));
        let storefront_repo = StorefrontRepository::new(db_pool.clone());

        Self {
            db_pool,
            config,
            auth_service,
            referral_service,
            size_service,
            storefront_repo,
        }
    }
}
