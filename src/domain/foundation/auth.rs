//! Authentication and role types for the domain layer.
//!
//! A `Principal` is what a validated bearer token resolves to. It carries no
//! provider-specific data; the token service adapter populates it and the HTTP
//! middleware injects it into request extensions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::{AdminUserId, DomainError, ErrorCode, MemberId, ValidationError};

/// Back-office role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Administrator,
    Editor,
    Viewer,
}

/// Actions gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewBackOffice,
    ManageContent,
    ManageMembers,
    DeleteMembers,
    RefundPayments,
    ManageAdminUsers,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Administrator => "administrator",
            AdminRole::Editor => "editor",
            AdminRole::Viewer => "viewer",
        }
    }

    /// Role/permission table.
    pub fn allows(&self, permission: Permission) -> bool {
        use Permission::*;
        match self {
            AdminRole::Administrator => true,
            AdminRole::Editor => matches!(permission, ViewBackOffice | ManageContent | ManageMembers),
            AdminRole::Viewer => matches!(permission, ViewBackOffice),
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "administrator" => Ok(AdminRole::Administrator),
            "editor" => Ok(AdminRole::Editor),
            "viewer" => Ok(AdminRole::Viewer),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// Identity behind an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Member { id: MemberId, email: String },
    Admin {
        id: AdminUserId,
        email: String,
        role: AdminRole,
    },
}

impl Principal {
    pub fn email(&self) -> &str {
        match self {
            Principal::Member { email, .. } | Principal::Admin { email, .. } => email,
        }
    }

    pub fn member_id(&self) -> Option<MemberId> {
        match self {
            Principal::Member { id, .. } => Some(*id),
            Principal::Admin { .. } => None,
        }
    }

    pub fn admin(&self) -> Option<(AdminUserId, AdminRole)> {
        match self {
            Principal::Admin { id, role, .. } => Some((*id, *role)),
            Principal::Member { .. } => None,
        }
    }

    /// Members hold no back-office permissions.
    pub fn can(&self, permission: Permission) -> bool {
        self.admin()
            .map(|(_, role)| role.allows(permission))
            .unwrap_or(false)
    }
}

/// Authentication errors that can occur during token issue or validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Token service failure: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns true if this error indicates the caller should log in again.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        let code = match err {
            AuthError::InvalidToken | AuthError::TokenExpired => ErrorCode::Unauthorized,
            AuthError::InsufficientPermissions => ErrorCode::Forbidden,
            AuthError::Internal(_) => ErrorCode::InternalError,
        };
        DomainError::new(code, err.to_string())
    }
}
