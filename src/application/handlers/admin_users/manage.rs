//! Admin user management (administrators only).
//!
//! The last administrator can be neither demoted nor deleted, and nobody can
//! delete their own account.

use std::sync::Arc;

use crate::domain::admin::{ensure_not_last_administrator, AdminUser};
use crate::domain::foundation::{AdminRole, AdminUserId, DomainError, Email, ErrorCode};
use crate::domain::member::validate_password;
use crate::ports::{AdminUserRepository, PasswordHasher};

fn admin_not_found(id: &AdminUserId) -> DomainError {
    DomainError::new(ErrorCode::AdminUserNotFound, "Admin user not found")
        .with_detail("admin_user_id", id.to_string())
}

async fn load(admins: &dyn AdminUserRepository, id: &AdminUserId) -> Result<AdminUser, DomainError> {
    admins.find_by_id(id).await?.ok_or_else(|| admin_not_found(id))
}

pub struct ListAdminUsersHandler {
    admins: Arc<dyn AdminUserRepository>,
}

impl ListAdminUsersHandler {
    pub fn new(admins: Arc<dyn AdminUserRepository>) -> Self {
        Self { admins }
    }

    pub async fn handle(&self) -> Result<Vec<AdminUser>, DomainError> {
        self.admins.list().await
    }
}

#[derive(Debug, Clone)]
pub struct CreateAdminUserCommand {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: AdminRole,
}

pub struct CreateAdminUserHandler {
    admins: Arc<dyn AdminUserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl CreateAdminUserHandler {
    pub fn new(admins: Arc<dyn AdminUserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { admins, hasher }
    }

    pub async fn handle(&self, cmd: CreateAdminUserCommand) -> Result<AdminUser, DomainError> {
        let email = Email::parse(&cmd.email)?;
        validate_password(&cmd.password)?;
        if self.admins.find_by_email(&email).await?.is_some() {
            return Err(DomainError::new(
                ErrorCode::AdminUserExists,
                "An admin user with this email already exists",
            ));
        }

        let admin = AdminUser::new(
            AdminUserId::new(),
            email,
            &cmd.name,
            self.hasher.hash(&cmd.password)?,
            cmd.role,
        )?;
        self.admins.save(&admin).await?;
        tracing::info!(admin_id = %admin.id, role = %admin.role, "Admin user created");
        Ok(admin)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateAdminUserCommand {
    pub admin_user_id: AdminUserId,
    pub name: Option<String>,
    pub role: Option<AdminRole>,
    pub password: Option<String>,
}

pub struct UpdateAdminUserHandler {
    admins: Arc<dyn AdminUserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UpdateAdminUserHandler {
    pub fn new(admins: Arc<dyn AdminUserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { admins, hasher }
    }

    pub async fn handle(&self, cmd: UpdateAdminUserCommand) -> Result<AdminUser, DomainError> {
        let mut admin = load(self.admins.as_ref(), &cmd.admin_user_id).await?;

        if let Some(name) = cmd.name.as_deref() {
            admin.rename(name)?;
        }
        if let Some(role) = cmd.role {
            if role != AdminRole::Administrator {
                let administrators = self.admins.count_with_role(AdminRole::Administrator).await?;
                ensure_not_last_administrator(&admin, administrators)?;
            }
            admin.change_role(role);
        }
        if let Some(password) = cmd.password.as_deref() {
            validate_password(password)?;
            admin.change_password_hash(self.hasher.hash(password)?);
        }

        self.admins.update(&admin).await?;
        tracing::info!(admin_id = %admin.id, role = %admin.role, "Admin user updated");
        Ok(admin)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteAdminUserCommand {
    pub admin_user_id: AdminUserId,
    pub requested_by: AdminUserId,
}

pub struct DeleteAdminUserHandler {
    admins: Arc<dyn AdminUserRepository>,
}

impl DeleteAdminUserHandler {
    pub fn new(admins: Arc<dyn AdminUserRepository>) -> Self {
        Self { admins }
    }

    pub async fn handle(&self, cmd: DeleteAdminUserCommand) -> Result<(), DomainError> {
        if cmd.admin_user_id == cmd.requested_by {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "You cannot delete your own account",
            ));
        }
        let admin = load(self.admins.as_ref(), &cmd.admin_user_id).await?;
        let administrators = self.admins.count_with_role(AdminRole::Administrator).await?;
        ensure_not_last_administrator(&admin, administrators)?;

        self.admins.delete(&admin.id).await?;
        tracing::info!(
            admin_id = %admin.id,
            requested_by = %cmd.requested_by,
            "Admin user deleted"
        );
        Ok(())
    }
}
