// src/services/auth.rs

use bcrypt::verify;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    permissions::Role,
    session::SessionRecord,
};

// Estrutura de dados ("claims") dentro do token de sessão
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,    // ID do usuário
    pub role: Role,
    pub sid: Uuid,    // ID da sessão, preservado nas renovações
    pub name: String,
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued At
}

/// Emite e valida os tokens que servem de `sessionId`.
#[derive(Clone)]
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    duration: Duration,
}

impl SessionTokens {
    pub fn new(secret: &str, duration: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            duration,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn issue(&self, user_id: Uuid, role: Role, display_name: &str) -> Result<SessionRecord, AppError> {
        self.sign(user_id, role, Uuid::new_v4(), display_name, Utc::now())
    }

    /// Renova a expiração mantendo o mesmo `sid`.
    pub fn refresh(&self, current: &SessionRecord) -> Result<SessionRecord, AppError> {
        let claims = self.decode_claims(&current.session_id)?;
        self.sign(claims.sub, claims.role, claims.sid, &claims.name, Utc::now())
    }

    /// Qualquer falha (assinatura, formato, expiração) vira `SessionExpired`.
    pub fn validate(&self, token: &str) -> Result<SessionRecord, AppError> {
        let claims = self.decode_claims(token)?;

        let expires_at =
            DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or(AppError::SessionExpired)?;

        let record = SessionRecord {
            id: claims.sub,
            role: claims.role,
            session_id: token.to_string(),
            display_name: claims.name,
            expires_at,
        };

        // O jsonwebtoken aceita exp == agora; nós não.
        if !record.is_live() {
            return Err(AppError::SessionExpired);
        }
        Ok(record)
    }

    fn decode_claims(&self, token: &str) -> Result<SessionClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token de sessão rejeitado: {}", e);
                AppError::SessionExpired
            })
    }

    fn sign(
        &self,
        user_id: Uuid,
        role: Role,
        sid: Uuid,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionRecord, AppError> {
        let expires_at = now + self.duration;

        let claims = SessionClaims {
            sub: user_id,
            role,
            sid,
            name: display_name.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

        // Guardamos a expiração em segundos cheios, igual ao token.
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or(expires_at);

        Ok(SessionRecord {
            id: user_id,
            role,
            session_id: token,
            display_name: display_name.to_string(),
            expires_at,
        })
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tokens: SessionTokens,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, tokens: SessionTokens) -> Self {
        Self { user_repo, tokens }
    }

    pub fn tokens(&self) -> &SessionTokens {
        &self.tokens
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<SessionRecord, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let role: Role = user.role.parse().map_err(|_| {
            tracing::warn!("⚠️ Usuário {} com papel desconhecido '{}'", user.id, user.role);
            AppError::InvalidCredentials
        })?;

        let session = self.tokens.issue(user.id, role, &user.display_name)?;
        tracing::info!("🔑 Sessão criada para {} ({})", user.id, role);
        Ok(session)
    }

    pub fn validate_token(&self, token: &str) -> Result<SessionRecord, AppError> {
        self.tokens.validate(token)
    }

    pub fn refresh(&self, current: &SessionRecord) -> Result<SessionRecord, AppError> {
        self.tokens.refresh(current)
    }
}
