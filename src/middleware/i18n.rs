// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::services::i18n::Language;

// Nosso extrator de idioma
#[derive(Debug, Clone, Copy, Default)]
pub struct Locale(pub Language);

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let lang = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                // Pega o primeiro idioma por ordem de preferência (ex: "pt-BR")
                accept_language::parse(header_str)
                    .first()
                    .map(|tag| Language::from_code(tag))
            })
            .unwrap_or_default();

        Ok(Locale(lang))
    }
}
