//! Authentication middleware and extractors for axum.
//!
//! ```text
//! Request → auth_middleware → injects Principal into extensions
//!                                      ↓
//!                 Handler → RequireMember / RequireAdmin reads from extensions
//! ```
//!
//! A missing token is not an error here; the extractors reject requests that
//! need a principal. An invalid or expired token is rejected immediately.
//!
//! Admin principals are reloaded from the store on every request, so a
//! deleted account loses access and a role change applies at once.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::adapters::http::error::ApiError;
use crate::domain::foundation::{AdminRole, AdminUserId, DomainError, MemberId, Permission, Principal};
use crate::ports::{AdminUserRepository, TokenService};

/// Auth middleware state.
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenService>,
    pub admin_users: Arc<dyn AdminUserRepository>,
}

/// Replaces the admin claims in a token with the stored account.
async fn refresh_admin(
    admin_users: &dyn AdminUserRepository,
    principal: Principal,
) -> Result<Principal, ApiError> {
    let id = match principal {
        Principal::Admin { id, .. } => id,
        Principal::Member { .. } => return Ok(principal),
    };
    match admin_users.find_by_id(&id).await? {
        Some(user) => Ok(Principal::Admin {
            id: user.id,
            email: user.email.to_string(),
            role: user.role,
        }),
        None => {
            tracing::debug!(admin_id = %id, "Token for a deleted admin account");
            Err(ApiError::unauthorized("Account no longer exists"))
        }
    }
}

/// Validates `Authorization: Bearer <token>` and injects the [`Principal`].
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .map(str::to_owned);

    let Some(token) = token else {
        return next.run(request).await;
    };

    let principal = match auth.tokens.validate(&token).await {
        Ok(principal) => principal,
        Err(err) => {
            tracing::debug!(error = %err, "Rejected bearer token");
            return ApiError(DomainError::from(err)).into_response();
        }
    };

    match refresh_admin(auth.admin_users.as_ref(), principal).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

fn principal(parts: &Parts) -> Result<Principal, ApiError> {
    parts
        .extensions
        .get::<Principal>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication is required"))
}

/// Requires a logged-in member.
#[derive(Debug, Clone)]
pub struct RequireMember {
    pub member_id: MemberId,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireMember
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match principal(parts)? {
            Principal::Member { id, email } => Ok(RequireMember {
                member_id: id,
                email,
            }),
            Principal::Admin { .. } => Err(ApiError::forbidden()),
        }
    }
}

/// Requires a back-office user. Finer permissions are checked with
/// [`RequireAdmin::ensure`].
#[derive(Debug, Clone)]
pub struct RequireAdmin {
    pub admin_id: AdminUserId,
    pub email: String,
    pub role: AdminRole,
}

impl RequireAdmin {
    pub fn ensure(&self, permission: Permission) -> Result<(), ApiError> {
        if self.role.allows(permission) {
            Ok(())
        } else {
            tracing::debug!(
                admin_id = %self.admin_id,
                role = %self.role,
                ?permission,
                "Permission denied"
            );
            Err(ApiError::forbidden())
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match principal(parts)? {
            Principal::Admin { id, email, role } if role.allows(Permission::ViewBackOffice) => {
                Ok(RequireAdmin {
                    admin_id: id,
                    email,
                    role,
                })
            }
            _ => Err(ApiError::forbidden()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn parts_with(principal: Option<Principal>) -> Parts {
        let mut request = axum::http::Request::builder().uri("/").body(()).unwrap();
        if let Some(p) = principal {
            request.extensions_mut().insert(p);
        }
        request.into_parts().0
    }

    fn admin(role: AdminRole) -> Principal {
        Principal::Admin {
            id: AdminUserId::new(),
            email: "staff@example.org".into(),
            role,
        }
    }

    #[tokio::test]
    async fn require_member_rejects_anonymous_and_admins() {
        let mut anonymous = parts_with(None);
        let err = RequireMember::from_request_parts(&mut anonymous, &()).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);

        let mut staff = parts_with(Some(admin(AdminRole::Administrator)));
        let err = RequireMember::from_request_parts(&mut staff, &()).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn require_admin_checks_permissions() {
        let mut parts = parts_with(Some(admin(AdminRole::Viewer)));
        let viewer = RequireAdmin::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(viewer.ensure(Permission::ViewBackOffice).is_ok());
        assert!(viewer.ensure(Permission::ManageContent).is_err());

        let mut member = parts_with(Some(Principal::Member {
            id: MemberId::new(),
            email: "m@example.org".into(),
        }));
        assert!(RequireAdmin::from_request_parts(&mut member, &()).await.is_err());
    }

    #[tokio::test]
    async fn admin_claims_are_replaced_by_the_stored_account() {
        use crate::adapters::memory::InMemoryStore;
        use crate::domain::admin::AdminUser;
        use crate::domain::foundation::Email;

        let store = InMemoryStore::new();
        let stored = AdminUser::new(
            AdminUserId::new(),
            Email::parse("ed@example.org").unwrap(),
            "Ed",
            "hash".into(),
            AdminRole::Viewer,
        )
        .unwrap();
        AdminUserRepository::save(&store, &stored).await.unwrap();

        let claimed = Principal::Admin {
            id: stored.id,
            email: "ed@example.org".into(),
            role: AdminRole::Administrator,
        };
        let refreshed = refresh_admin(&store, claimed.clone()).await.unwrap();
        assert_eq!(refreshed.admin(), Some((stored.id, AdminRole::Viewer)));

        AdminUserRepository::delete(&store, &stored.id).await.unwrap();
        let err = refresh_admin(&store, claimed).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn member_principals_pass_through_unchanged() {
        let store = crate::adapters::memory::InMemoryStore::new();
        let member = Principal::Member {
            id: MemberId::new(),
            email: "m@example.org".into(),
        };
        assert_eq!(refresh_admin(&store, member.clone()).await.unwrap(), member);
    }
}
