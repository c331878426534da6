//! Back-office account.

use crate::domain::foundation::{
    required_text, AdminRole, AdminUserId, DomainError, Email, ErrorCode, Timestamp,
    ValidationError,
};

pub const MAX_ADMIN_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub password_hash: String,
    pub role: AdminRole,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AdminUser {
    pub fn new(
        id: AdminUserId,
        email: Email,
        name: &str,
        password_hash: String,
        role: AdminRole,
    ) -> Result<Self, ValidationError> {
        let now = Timestamp::now();
        Ok(Self {
            id,
            email,
            name: required_text("name", name, MAX_ADMIN_NAME_LEN)?,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn rename(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = required_text("name", name, MAX_ADMIN_NAME_LEN)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    pub fn change_role(&mut self, role: AdminRole) {
        self.role = role;
        self.updated_at = Timestamp::now();
    }

    pub fn change_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Timestamp::now();
    }
}

/// Guards the rule that at least one administrator remains.
///
/// `administrators` is the current count of administrator accounts
/// including `target`.
pub fn ensure_not_last_administrator(
    target: &AdminUser,
    administrators: u64,
) -> Result<(), DomainError> {
    if target.role == AdminRole::Administrator && administrators <= 1 {
        return Err(last_administrator());
    }
    Ok(())
}

pub fn last_administrator() -> DomainError {
    DomainError::new(
        ErrorCode::LastAdministrator,
        "At least one administrator account must remain",
    )
}
