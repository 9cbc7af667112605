// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    permissions::{require_permission, Action, Resource},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    const ACTION: Action;
    const RESOURCE: Option<Resource>;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
// A decisão vem da tabela do papel, sem ida ao banco.
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        // A. Extrai Usuário (colocado pelo auth_guard)
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::SessionExpired)
            .map_err(|e| e.to_api_error(&locale))?;

        // B. Verifica na tabela
        require_permission(Some(&user.0), T::ACTION, T::RESOURCE)
            .map_err(|e| e.to_api_error(&locale))?;

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermReferralsRead;
impl PermissionDef for PermReferralsRead {
    const ACTION: Action = Action::Read;
    const RESOURCE: Option<Resource> = Some(Resource::Referrals);
}

pub struct PermWithdrawalsWrite;
impl PermissionDef for PermWithdrawalsWrite {
    const ACTION: Action = Action::Write;
    const RESOURCE: Option<Resource> = Some(Resource::Withdrawals);
}

pub struct PermProductsWrite;
impl PermissionDef for PermProductsWrite {
    const ACTION: Action = Action::Write;
    const RESOURCE: Option<Resource> = Some(Resource::Products);
}
