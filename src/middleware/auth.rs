// src/middleware/auth.rs

use std::future::Future;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::AppError,
    config::AppState,
    permissions::{require_permission, Action, Resource},
    services::auth::SessionTokens,
    session::{
        store::{USER_ID_HEADER, USER_ROLE_HEADER},
        SessionRecord, SessionStorage, SessionStore,
    },
};

pub const SESSION_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-session-token");
pub const SESSION_EXPIRES_HEADER: HeaderName = HeaderName::from_static("x-session-expires-at");

// ---
// Guardião do lado do cliente
// ---

/// Envolve operações assíncronas com a checagem de sessão.
///
/// Sessão inválida: limpa o storage e falha com [`AppError::SessionExpired`]
/// sem executar a operação. Sessão válida: estende a expiração e executa.
pub struct AuthGuard<S> {
    store: SessionStore<S>,
}

impl<S: SessionStorage> AuthGuard<S> {
    pub fn new(store: SessionStore<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub async fn with_auth<F, Fut, T>(&self, operation: F) -> Result<T, AppError>
    where
        F: FnOnce(SessionRecord) -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut user = self.live_user_or_clear()?;

        if let Some(expires_at) = self.store.extend_session() {
            user.expires_at = expires_at;
        }

        operation(user).await
    }

    /// `with_auth` + checagem de permissão antes da operação.
    /// Permissão negada não mexe na sessão.
    pub async fn authenticated<F, Fut, T>(
        &self,
        action: Action,
        resource: Option<Resource>,
        operation: F,
    ) -> Result<T, AppError>
    where
        F: FnOnce(SessionRecord) -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        self.with_auth(|user| async move {
            require_permission(Some(&user), action, resource)?;
            operation(user).await
        })
        .await
    }

    fn live_user_or_clear(&self) -> Result<SessionRecord, AppError> {
        if !self.store.validate_session() {
            self.store.clear_all_stored_data();
            tracing::info!("🔒 Sessão inválida, exigindo novo login.");
            return Err(AppError::SessionExpired);
        }
        // Entre a validação e a leitura outra instância pode ter feito logout.
        self.store.current_user().ok_or_else(|| {
            self.store.clear_all_stored_data();
            AppError::SessionExpired
        })
    }
}

// ---
// Guardião HTTP
// ---

/// Lê `Authorization: Bearer`, `X-User-ID` e `X-User-Role` e confere se batem
/// com o token.
pub fn authenticate_headers(
    tokens: &SessionTokens,
    headers: &HeaderMap,
) -> Result<SessionRecord, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::SessionExpired)?;

    let record = tokens.validate(token)?;

    let user_id = headers.get(USER_ID_HEADER).and_then(|v| v.to_str().ok());
    let role = headers.get(USER_ROLE_HEADER).and_then(|v| v.to_str().ok());

    let id_matches = user_id == Some(record.id.to_string().as_str());
    let role_matches = role == Some(record.role.as_str());

    if !(id_matches && role_matches) {
        tracing::warn!("⚠️ Headers de identidade não batem com o token de sessão de {}", record.id);
        return Err(AppError::SessionExpired);
    }

    Ok(record)
}

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate_headers(app_state.auth_service.tokens(), request.headers())?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(AuthenticatedUser(user.clone()));

    let mut response = next.run(request).await;

    // Atividade bem-sucedida estende a sessão.
    if response.status().is_success() {
        match app_state.auth_service.refresh(&user) {
            Ok(refreshed) => attach_session(response.headers_mut(), &refreshed),
            Err(e) => tracing::warn!("⚠️ Falha ao renovar a sessão de {}: {}", user.id, e),
        }
    }

    Ok(response)
}

fn attach_session(headers: &mut HeaderMap, session: &SessionRecord) {
    if let Ok(token) = HeaderValue::from_str(&session.session_id) {
        headers.insert(SESSION_TOKEN_HEADER, token);
    }
    if let Ok(expires) = HeaderValue::from_str(&session.expires_at.timestamp_millis().to_string()) {
        headers.insert(SESSION_EXPIRES_HEADER, expires);
    }
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub SessionRecord);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::SessionExpired)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::{common::error::ErrorKind, permissions::Role, session::MemoryStorage};

    fn guard_with(role: Role, expires_in: Duration) -> AuthGuard<MemoryStorage> {
        let store = SessionStore::new(MemoryStorage::new(), Duration::hours(8));
        store.create(&SessionRecord {
            id: Uuid::new_v4(),
            role,
            session_id: "sid".into(),
            display_name: "Teste".into(),
            expires_at: Utc::now() + expires_in,
        });
        store.storage().set("vitrineturbo_cart_loja", "[]").unwrap();
        AuthGuard::new(store)
    }

    #[tokio::test]
    async fn invalid_session_clears_storage_and_skips_the_operation() {
        let guard = guard_with(Role::Admin, Duration::seconds(-1));
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();

        let result = guard
            .with_auth(|_| async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::SessionExpired);
        assert!(!ran.load(Ordering::SeqCst));
        assert!(guard.store().get_stored_user().is_none());
        assert_eq!(guard.store().storage().get("vitrineturbo_cart_loja").unwrap(), None);
    }

    #[tokio::test]
    async fn valid_session_is_extended_and_outcome_passes_through() {
        let guard = guard_with(Role::Corretor, Duration::minutes(1));

        let value = guard
            .with_auth(|user| async move {
                assert!(user.expires_at > Utc::now() + Duration::hours(7));
                Ok(42)
            })
            .await
            .unwrap();
        assert_eq!(value, 42);

        let err = guard
            .with_auth(|_| async { Err::<(), _>(AppError::NotFound("produto".into())) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        // Erro da operação não derruba a sessão.
        assert!(guard.store().is_authenticated());
    }

    #[tokio::test]
    async fn operation_sees_the_expiry_that_was_stored() {
        let guard = guard_with(Role::Parceiro, Duration::minutes(1));

        let seen = guard.with_auth(|user| async move { Ok(user) }).await.unwrap();
        assert_eq!(Some(seen), guard.store().current_user());
    }

    #[tokio::test]
    async fn permission_failure_is_distinct_and_keeps_the_session() {
        let guard = guard_with(Role::Corretor, Duration::minutes(10));
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();

        let err = guard
            .authenticated(Action::Manage, Some(Resource::Users), |_| async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientPermission);
        assert!(!ran.load(Ordering::SeqCst));
        assert!(guard.store().is_authenticated());

        let ok = guard
            .authenticated(Action::Write, Some(Resource::Products), |u| async move { Ok(u.role) })
            .await
            .unwrap();
        assert_eq!(ok, Role::Corretor);
    }

    #[tokio::test]
    async fn expired_session_wins_over_permission_check() {
        let guard = guard_with(Role::Admin, Duration::seconds(-10));
        let err = guard
            .authenticated(Action::Read, None, |_| async { Ok(()) })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionExpired);
    }

    fn headers_for(record: &SessionRecord) -> HeaderMap {
        let store = SessionStore::new(MemoryStorage::new(), Duration::hours(1));
        store.create(record);
        store.auth_headers()
    }

    #[test]
    fn header_triple_authenticates() {
        let tokens = SessionTokens::new("segredo", Duration::hours(1));
        let session = tokens.issue(Uuid::new_v4(), Role::Parceiro, "Paulo").unwrap();

        let user = authenticate_headers(&tokens, &headers_for(&session)).unwrap();
        assert_eq!(user.id, session.id);
        assert_eq!(user.role, Role::Parceiro);
    }

    #[test]
    fn mismatched_role_header_is_rejected() {
        let tokens = SessionTokens::new("segredo", Duration::hours(1));
        let session = tokens.issue(Uuid::new_v4(), Role::Corretor, "C").unwrap();

        let mut headers = headers_for(&session);
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("admin"));

        assert!(matches!(
            authenticate_headers(&tokens, &headers),
            Err(AppError::SessionExpired)
        ));
        assert!(matches!(
            authenticate_headers(&tokens, &HeaderMap::new()),
            Err(AppError::SessionExpired)
        ));
    }
}
