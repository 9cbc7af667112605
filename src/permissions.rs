// src/permissions.rs

//! Resolução de permissões por papel.
//!
//! Cada [`Role`] carrega a sua tabela estática de [`Grant`]s; a decisão é
//! sempre recalculada a partir de `(papel, ação, recurso)`, nunca guardada.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{common::error::AppError, session::SessionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Parceiro,
    Corretor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Write,
    Delete,
    Manage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Products,
    Categories,
    Profile,
    Storefront,
    Users,
    Subscriptions,
    Plans,
    Referrals,
    Commissions,
    Withdrawals,
    Analytics,
}

/// Até onde uma concessão vale.
#[derive(Debug, Clone, Copy)]
pub enum Scope {
    Any,
    Only(&'static [Resource]),
}

#[derive(Debug, Clone, Copy)]
pub struct Grant {
    pub action: Action,
    pub scope: Scope,
}

const fn grant(action: Action, scope: Scope) -> Grant {
    Grant { action, scope }
}

// ---
// TABELAS DE PERMISSÃO
// ---
// Adicionar um papel ou liberar um recurso é só mexer aqui.

const CORRETOR_WRITABLE: &[Resource] = &[Resource::Products, Resource::Profile];

const CORRETOR_GRANTS: &[Grant] = &[
    grant(Action::Read, Scope::Any),
    grant(Action::Write, Scope::Only(CORRETOR_WRITABLE)),
    grant(Action::Delete, Scope::Only(CORRETOR_WRITABLE)),
];

const PARCEIRO_GRANTS: &[Grant] = &[
    grant(Action::Read, Scope::Any),
    grant(
        Action::Write,
        Scope::Only(&[Resource::Profile, Resource::Referrals, Resource::Withdrawals]),
    ),
];

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Parceiro, Role::Corretor];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Parceiro => "parceiro",
            Role::Corretor => "corretor",
        }
    }

    /// `None` significa acesso irrestrito.
    fn grants(self) -> Option<&'static [Grant]> {
        match self {
            Role::Admin => None,
            Role::Parceiro => Some(PARCEIRO_GRANTS),
            Role::Corretor => Some(CORRETOR_GRANTS),
        }
    }

    pub fn allows(self, action: Action, resource: Option<Resource>) -> bool {
        let Some(grants) = self.grants() else {
            return true;
        };

        grants.iter().any(|g| {
            g.action == action
                && match (g.scope, resource) {
                    (Scope::Any, _) => true,
                    (Scope::Only(allowed), Some(r)) => allowed.contains(&r),
                    // Ação restrita sem recurso informado: nega.
                    (Scope::Only(_), None) => false,
                }
        })
    }

    pub fn capabilities(self) -> RoleCapabilities {
        RoleCapabilities {
            can_manage_users: self.allows(Action::Manage, Some(Resource::Users)),
            can_manage_products: self.allows(Action::Write, Some(Resource::Products)),
            can_manage_subscriptions: self.allows(Action::Manage, Some(Resource::Subscriptions)),
            can_manage_plans: self.allows(Action::Manage, Some(Resource::Plans)),
            can_view_referrals: self.allows(Action::Read, Some(Resource::Referrals)),
            can_request_withdrawals: self.allows(Action::Write, Some(Resource::Withdrawals)),
            can_view_analytics: self.allows(Action::Read, Some(Resource::Analytics)),
            can_edit_profile: self.allows(Action::Write, Some(Resource::Profile)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "parceiro" => Ok(Role::Parceiro),
            "corretor" => Ok(Role::Corretor),
            other => Err(AppError::Validation(format!("papel desconhecido: {other}"))),
        }
    }
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Action::Read),
            "write" => Ok(Action::Write),
            "delete" => Ok(Action::Delete),
            "manage" => Ok(Action::Manage),
            other => Err(AppError::Validation(format!("ação desconhecida: {other}"))),
        }
    }
}

impl Resource {
    pub const ALL: [Resource; 11] = [
        Resource::Products,
        Resource::Categories,
        Resource::Profile,
        Resource::Storefront,
        Resource::Users,
        Resource::Subscriptions,
        Resource::Plans,
        Resource::Referrals,
        Resource::Commissions,
        Resource::Withdrawals,
        Resource::Analytics,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Categories => "categories",
            Resource::Profile => "profile",
            Resource::Storefront => "storefront",
            Resource::Users => "users",
            Resource::Subscriptions => "subscriptions",
            Resource::Plans => "plans",
            Resource::Referrals => "referrals",
            Resource::Commissions => "commissions",
            Resource::Withdrawals => "withdrawals",
            Resource::Analytics => "analytics",
        }
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("recurso desconhecido: {s}")))
    }
}

/// Flags derivadas da tabela do papel, para o frontend decidir o que mostrar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleCapabilities {
    pub can_manage_users: bool,
    pub can_manage_products: bool,
    pub can_manage_subscriptions: bool,
    pub can_manage_plans: bool,
    pub can_view_referrals: bool,
    pub can_request_withdrawals: bool,
    pub can_view_analytics: bool,
    pub can_edit_profile: bool,
}

/// Sem usuário autenticado, tudo é negado.
pub fn check_permission(
    user: Option<&SessionRecord>,
    action: Action,
    resource: Option<Resource>,
) -> bool {
    user.is_some_and(|u| u.role.allows(action, resource))
}

pub fn require_permission(
    user: Option<&SessionRecord>,
    action: Action,
    resource: Option<Resource>,
) -> Result<(), AppError> {
    if check_permission(user, action, resource) {
        Ok(())
    } else {
        Err(AppError::InsufficientPermission { action, resource })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;

    const ACTIONS: [Action; 4] = [Action::Read, Action::Write, Action::Delete, Action::Manage];

    fn user(role: Role) -> SessionRecord {
        SessionRecord {
            id: Uuid::new_v4(),
            role,
            session_id: "sid".into(),
            display_name: "Teste".into(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn admin_is_allowed_everything() {
        let admin = user(Role::Admin);
        for action in ACTIONS {
            assert!(check_permission(Some(&admin), action, None));
            for resource in Resource::ALL {
                assert!(check_permission(Some(&admin), action, Some(resource)));
            }
        }
    }

    #[test]
    fn every_other_role_is_denied_something() {
        for role in [Role::Parceiro, Role::Corretor] {
            let u = user(role);
            let denied = ACTIONS.iter().any(|&a| {
                Resource::ALL
                    .iter()
                    .any(|&r| !check_permission(Some(&u), a, Some(r)))
            });
            assert!(denied, "{role} should have at least one denied pair");
            assert!(!check_permission(Some(&u), Action::Manage, Some(Resource::Users)));
        }
    }

    #[test]
    fn corretor_writes_only_products_and_profile() {
        let c = user(Role::Corretor);
        assert!(check_permission(Some(&c), Action::Write, Some(Resource::Products)));
        assert!(check_permission(Some(&c), Action::Delete, Some(Resource::Profile)));
        assert!(check_permission(Some(&c), Action::Read, Some(Resource::Users)));
        assert!(!check_permission(Some(&c), Action::Write, Some(Resource::Users)));
        assert!(!check_permission(Some(&c), Action::Delete, Some(Resource::Withdrawals)));
        assert!(!check_permission(Some(&c), Action::Write, None));
    }

    #[test]
    fn parceiro_can_request_withdrawals_but_not_delete() {
        let p = user(Role::Parceiro);
        assert!(check_permission(Some(&p), Action::Write, Some(Resource::Withdrawals)));
        assert!(!check_permission(Some(&p), Action::Delete, Some(Resource::Referrals)));
        assert!(!check_permission(Some(&p), Action::Write, Some(Resource::Products)));
    }

    #[test]
    fn unauthenticated_is_denied_everything() {
        for action in ACTIONS {
            assert!(!check_permission(None, action, None));
            assert!(!check_permission(None, action, Some(Resource::Profile)));
        }
    }

    #[test]
    fn unknown_role_does_not_parse() {
        assert!("superuser".parse::<Role>().is_err());
        assert_eq!("corretor".parse::<Role>().ok(), Some(Role::Corretor));
    }

    #[test]
    fn require_permission_reports_the_denied_pair() {
        let p = user(Role::Parceiro);
        let err = require_permission(Some(&p), Action::Manage, Some(Resource::Plans)).unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientPermission {
                action: Action::Manage,
                resource: Some(Resource::Plans)
            }
        ));
        assert!(require_permission(Some(&p), Action::Read, Some(Resource::Plans)).is_ok());
    }

    #[test]
    fn capabilities_follow_the_tables() {
        let admin = Role::Admin.capabilities();
        assert!(admin.can_manage_users && admin.can_manage_plans && admin.can_view_analytics);

        let corretor = Role::Corretor.capabilities();
        assert!(corretor.can_manage_products);
        assert!(!corretor.can_manage_users);
        assert!(!corretor.can_request_withdrawals);

        let parceiro = Role::Parceiro.capabilities();
        assert!(parceiro.can_request_withdrawals);
        assert!(parceiro.can_view_referrals);
        assert!(!parceiro.can_manage_products);
    }
}
