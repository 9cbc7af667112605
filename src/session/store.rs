// src/session/store.rs

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::session::{SessionRecord, SessionStorage};

/// Toda chave que a aplicação grava começa com este prefixo.
pub const STORAGE_PREFIX: &str = "vitrineturbo_";
pub const SESSION_KEY: &str = "vitrineturbo_session";

pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");
pub const USER_ROLE_HEADER: HeaderName = HeaderName::from_static("x-user-role");

/// Contexto de sessão explícito.
///
/// Nada aqui devolve erro: storage corrompido ou ilegível equivale a
/// "sem sessão". Cada chamada relê o storage, então o que ela enxerga é tão
/// fresco quanto a última gravação feita por qualquer instância que
/// compartilhe o mesmo storage.
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    storage: S,
    duration: Duration,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S, duration: Duration) -> Self {
        Self { storage, duration }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Grava o registro criado no login. Devolve `false` se o storage recusar.
    /// A expiração é guardada em milissegundos inteiros.
    pub fn create(&self, record: &SessionRecord) -> bool {
        let mut record = record.clone();
        record.expires_at = record.expires_at.trunc_subsecs(3);
        self.write(&record)
    }

    /// O registro guardado, expirado ou não. `None` se ausente ou ilegível.
    pub fn get_stored_user(&self) -> Option<SessionRecord> {
        let raw = match self.storage.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("⚠️ Falha ao ler a sessão do storage: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) if record.is_well_formed() => Some(record),
            Ok(_) => {
                tracing::warn!("⚠️ Sessão guardada sem sessionId, ignorando.");
                None
            }
            Err(e) => {
                tracing::warn!("⚠️ Sessão guardada ilegível, ignorando: {}", e);
                None
            }
        }
    }

    /// O usuário, apenas se a sessão ainda estiver válida.
    pub fn current_user(&self) -> Option<SessionRecord> {
        self.get_stored_user().filter(|r| r.is_live())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Não limpa nada: em caso de `false`, o chamador deve chamar
    /// [`Self::clear_all_stored_data`] antes de tratar o usuário como deslogado.
    pub fn validate_session(&self) -> bool {
        self.is_authenticated()
    }

    /// Empurra a expiração para `agora + duração`. Sessão ausente ou já
    /// expirada não é ressuscitada.
    pub fn extend_session(&self) -> Option<DateTime<Utc>> {
        let mut record = self.current_user()?;
        // Mesma precisão do formato persistido
        record.expires_at = (Utc::now() + self.duration).trunc_subsecs(3);

        if self.write(&record) {
            Some(record.expires_at)
        } else {
            None
        }
    }

    /// Remove a sessão e qualquer dado auxiliar (carrinhos, caches).
    pub fn clear_all_stored_data(&self) {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("⚠️ Falha ao listar o storage, removendo só a sessão: {}", e);
                vec![SESSION_KEY.to_string()]
            }
        };

        for key in keys.iter().filter(|k| k.starts_with(STORAGE_PREFIX)) {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!("⚠️ Falha ao remover '{}' do storage: {}", key, e);
            }
        }
    }

    /// `Authorization`, `X-User-ID` e `X-User-Role` para chamadas autenticadas.
    /// Vazio quando não há sessão válida.
    pub fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let Some(user) = self.current_user() else {
            return headers;
        };

        let bearer = HeaderValue::from_str(&format!("Bearer {}", user.session_id));
        let user_id = HeaderValue::from_str(&user.id.to_string());
        match (bearer, user_id) {
            (Ok(bearer), Ok(user_id)) => {
                headers.insert(header::AUTHORIZATION, bearer);
                headers.insert(USER_ID_HEADER, user_id);
                headers.insert(USER_ROLE_HEADER, HeaderValue::from_static(user.role.as_str()));
            }
            _ => tracing::warn!("⚠️ sessionId com caracteres inválidos para header."),
        }
        headers
    }

    fn write(&self, record: &SessionRecord) -> bool {
        let raw = match serde_json::to_string(record) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("⚠️ Falha ao serializar a sessão: {}", e);
                return false;
            }
        };

        match self.storage.set(SESSION_KEY, &raw) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("⚠️ Falha ao gravar a sessão no storage: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{permissions::Role, session::MemoryStorage};

    fn store() -> SessionStore<MemoryStorage> {
        SessionStore::new(MemoryStorage::new(), Duration::hours(24))
    }

    fn record(expires_at: DateTime<Utc>) -> SessionRecord {
        SessionRecord {
            id: Uuid::new_v4(),
            role: Role::Parceiro,
            session_id: "token-123".into(),
            display_name: "João".into(),
            expires_at,
        }
    }

    #[test]
    fn empty_storage_means_no_session() {
        let s = store();
        assert!(s.get_stored_user().is_none());
        assert!(!s.is_authenticated());
        assert!(!s.validate_session());
        assert!(s.extend_session().is_none());
        assert!(s.auth_headers().is_empty());
    }

    #[test]
    fn live_session_is_authenticated() {
        let s = store();
        let r = record((Utc::now() + Duration::minutes(5)).trunc_subsecs(3));
        assert!(s.create(&r));
        assert_eq!(s.get_stored_user(), Some(r));
        assert!(s.is_authenticated());
        assert!(s.validate_session());
    }

    #[test]
    fn stored_expiry_reads_back_exactly() {
        let s = store();
        let expires_at = Utc::now() + Duration::minutes(5) + Duration::nanoseconds(123_456);
        s.create(&record(expires_at));

        let stored = s.get_stored_user().unwrap();
        assert_eq!(stored.expires_at, expires_at.trunc_subsecs(3));
        assert_eq!(stored.expires_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn expired_session_is_never_valid_and_is_not_cleared_by_validation() {
        let s = store();
        s.create(&record(Utc::now() - Duration::seconds(1)));

        assert!(!s.is_authenticated());
        assert!(!s.validate_session());
        // Limpar é responsabilidade do chamador.
        assert!(s.get_stored_user().is_some());
        assert!(s.extend_session().is_none());
    }

    #[test]
    fn corrupted_storage_is_treated_as_no_session() {
        let s = store();
        s.storage().set(SESSION_KEY, "{not json").unwrap();
        assert!(s.get_stored_user().is_none());

        s.storage()
            .set(
                SESSION_KEY,
                r#"{"id":"00000000-0000-0000-0000-000000000000","role":"root","sessionId":"x","displayName":"x","expiresAt":99999999999999}"#,
            )
            .unwrap();
        assert!(!s.is_authenticated());
    }

    #[test]
    fn extend_pushes_expiry_forward() {
        let s = store();
        s.create(&record(Utc::now() + Duration::minutes(1)));

        let new_expiry = s.extend_session().expect("sessão viva");
        assert!(new_expiry > Utc::now() + Duration::hours(23));
        assert_eq!(s.get_stored_user().unwrap().expires_at, new_expiry);

        // Idempotente: estender de novo só recalcula a partir de agora.
        let again = s.extend_session().unwrap();
        assert!(again >= new_expiry);
    }

    #[test]
    fn clear_removes_only_application_keys() {
        let s = store();
        s.create(&record(Utc::now() + Duration::minutes(5)));
        s.storage().set("vitrineturbo_cart_loja", "[]").unwrap();
        s.storage().set("tema", "escuro").unwrap();

        s.clear_all_stored_data();
        s.clear_all_stored_data();

        assert!(s.get_stored_user().is_none());
        assert_eq!(s.storage().get("vitrineturbo_cart_loja").unwrap(), None);
        assert_eq!(s.storage().get("tema").unwrap().as_deref(), Some("escuro"));
    }

    #[test]
    fn auth_headers_carry_the_triple() {
        let s = store();
        let r = record(Utc::now() + Duration::minutes(5));
        s.create(&r);

        let headers = s.auth_headers();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer token-123");
        assert_eq!(headers[USER_ID_HEADER], r.id.to_string().as_str());
        assert_eq!(headers[USER_ROLE_HEADER], "parceiro");
    }

    #[test]
    fn two_stores_over_one_storage_see_each_other() {
        let shared = MemoryStorage::new();
        let tab_a = SessionStore::new(shared.clone(), Duration::hours(1));
        let tab_b = SessionStore::new(shared, Duration::hours(1));

        tab_a.create(&record(Utc::now() + Duration::minutes(5)));
        assert!(tab_b.is_authenticated());

        tab_b.clear_all_stored_data();
        assert!(!tab_a.is_authenticated());
    }
}
