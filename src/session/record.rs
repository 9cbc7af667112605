// src/session/record.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::permissions::Role;

/// O usuário autenticado, como fica guardado no storage do cliente.
///
/// Os nomes dos campos são o formato persistido: mudar qualquer um deles
/// desloga silenciosamente todas as sessões existentes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: Uuid,
    pub role: Role,
    pub session_id: String,
    pub display_name: String,

    // Milissegundos desde a época Unix
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64, example = 1767225600000_i64)]
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_well_formed(&self) -> bool {
        !self.session_id.trim().is_empty()
    }

    /// Expiração igual a `now` já conta como expirada.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.is_well_formed() && self.expires_at > now
    }

    pub fn is_live(&self) -> bool {
        self.is_live_at(Utc::now())
    }
}
