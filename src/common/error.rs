// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    middleware::i18n::Locale,
    permissions::{Action, Resource},
    services::i18n::Language,
};

/// Família do erro. Os chamadores decidem o que fazer olhando para isto,
/// nunca para o texto da mensagem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Sessão ausente ou expirada: o cliente deve voltar para o login.
    SessionExpired,
    /// Sessão válida, mas o papel não permite a ação: mostrar mensagem e ficar na página.
    InsufficientPermission,
    /// Banco, rede ou qualquer falha interna.
    BackendFailure,
    /// Entrada malformada rejeitada na borda.
    ValidationFailure,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Sessão expirada")]
    SessionExpired,

    #[error("Permissão insuficiente para '{action}' em '{}'", .resource.map(|r| r.as_str()).unwrap_or("*"))]
    InsufficientPermission {
        action: Action,
        resource: Option<Resource>,
    },

    #[error("Dados inválidos: {0}")]
    Validation(String),

    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Não encontrado: {0}")]
    NotFound(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    // `anyhow::Error` guarda o contexto de qualquer outro erro inesperado.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::SessionExpired => ErrorKind::SessionExpired,
            AppError::InsufficientPermission { .. } => ErrorKind::InsufficientPermission,
            AppError::Validation(_) | AppError::ValidationError(_) | AppError::InvalidCredentials => {
                ErrorKind::ValidationFailure
            }
            AppError::NotFound(_)
            | AppError::DatabaseError(_)
            | AppError::JwtError(_)
            | AppError::BcryptError(_)
            | AppError::InternalServerError(_) => ErrorKind::BackendFailure,
        }
    }

    /// Converte o erro interno na resposta HTTP, com a mensagem no idioma do cliente.
    pub fn to_api_error(self, locale: &Locale) -> ApiError {
        let lang = locale.0;
        let kind = self.kind();

        let (status, code, error, details) = match self {
            AppError::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                "SESSION_EXPIRED",
                text(lang, Msg::SessionExpired),
                None,
            ),
            AppError::InsufficientPermission { action, resource } => (
                StatusCode::FORBIDDEN,
                "INSUFFICIENT_PERMISSION",
                text(lang, Msg::InsufficientPermission),
                Some(json!({
                    "action": action.as_str(),
                    "resource": resource.map(|r| r.as_str()),
                })),
            ),
            AppError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                text(lang, Msg::Validation),
                Some(json!({ "reason": message })),
            ),
            AppError::ValidationError(errors) => {
                // Devolve todos os detalhes da validação, campo a campo.
                let mut fields = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    fields.insert(field.to_string(), messages);
                }
                (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_FAILED",
                    text(lang, Msg::Validation),
                    Some(json!(fields)),
                )
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                text(lang, Msg::InvalidCredentials),
                None,
            ),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                text(lang, Msg::NotFound),
                Some(json!({ "resource": what })),
            ),
            // Todo o resto vira 500. O `tracing` loga a mensagem detalhada.
            ref e => {
                tracing::error!("🔥 Erro Interno do Servidor: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "BACKEND_FAILURE",
                    text(lang, Msg::Internal),
                    None,
                )
            }
        };

        ApiError {
            status,
            kind,
            code,
            error: error.to_string(),
            details,
        }
    }
}

// Sem locale (ex.: middleware), respondemos em português.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

/// O erro como o cliente HTTP o recebe.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: ErrorKind,
    pub code: &'static str,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error,
            "code": self.code,
            "kind": self.kind,
            "details": self.details,
        }));
        (self.status, body).into_response()
    }
}

#[derive(Clone, Copy)]
enum Msg {
    SessionExpired,
    InsufficientPermission,
    Validation,
    InvalidCredentials,
    NotFound,
    Internal,
}

fn text(lang: Language, msg: Msg) -> &'static str {
    match (lang, msg) {
        (Language::Pt, Msg::SessionExpired) => "Sua sessão expirou. Faça login novamente.",
        (Language::En, Msg::SessionExpired) => "Your session has expired. Please log in again.",
        (Language::Es, Msg::SessionExpired) => "Tu sesión ha expirado. Inicia sesión de nuevo.",

        (Language::Pt, Msg::InsufficientPermission) => "Você não tem permissão para realizar esta ação.",
        (Language::En, Msg::InsufficientPermission) => "You do not have permission to perform this action.",
        (Language::Es, Msg::InsufficientPermission) => "No tienes permiso para realizar esta acción.",

        (Language::Pt, Msg::Validation) => "Um ou mais campos são inválidos.",
        (Language::En, Msg::Validation) => "One or more fields are invalid.",
        (Language::Es, Msg::Validation) => "Uno o más campos no son válidos.",

        (Language::Pt, Msg::InvalidCredentials) => "E-mail ou senha inválidos.",
        (Language::En, Msg::InvalidCredentials) => "Invalid e-mail or password.",
        (Language::Es, Msg::InvalidCredentials) => "Correo o contraseña no válidos.",

        (Language::Pt, Msg::NotFound) => "Registro não encontrado.",
        (Language::En, Msg::NotFound) => "Record not found.",
        (Language::Es, Msg::NotFound) => "Registro no encontrado.",

        (Language::Pt, Msg::Internal) => "Ocorreu um erro inesperado.",
        (Language::En, Msg::Internal) => "An unexpected error occurred.",
        (Language::Es, Msg::Internal) => "Ocurrió un error inesperado.",
    }
}
