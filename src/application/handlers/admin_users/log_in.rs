//! LogInAdminHandler - Back-office login.

use std::sync::Arc;

use crate::application::handlers::members::invalid_credentials;
use crate::domain::admin::AdminUser;
use crate::domain::foundation::{DomainError, Email, Principal};
use crate::ports::{AdminUserRepository, IssuedToken, PasswordHasher, TokenService};

#[derive(Debug, Clone)]
pub struct LogInAdminCommand {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LogInAdminResult {
    pub admin: AdminUser,
    pub token: IssuedToken,
}

pub struct LogInAdminHandler {
    admins: Arc<dyn AdminUserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

impl LogInAdminHandler {
    pub fn new(
        admins: Arc<dyn AdminUserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            admins,
            hasher,
            tokens,
        }
    }

    pub async fn handle(&self, cmd: LogInAdminCommand) -> Result<LogInAdminResult, DomainError> {
        let email = Email::parse(&cmd.email).map_err(|_| invalid_credentials())?;
        let Some(admin) = self.admins.find_by_email(&email).await? else {
            tracing::warn!("Admin login for unknown email");
            return Err(invalid_credentials());
        };
        if !self.hasher.verify(&cmd.password, &admin.password_hash)? {
            tracing::warn!(admin_id = %admin.id, "Admin login with wrong password");
            return Err(invalid_credentials());
        }

        let token = self
            .tokens
            .issue(&Principal::Admin {
                id: admin.id,
                email: admin.email.as_str().to_string(),
                role: admin.role,
            })
            .await?;
        tracing::info!(admin_id = %admin.id, role = %admin.role, "Admin logged in");
        Ok(LogInAdminResult { admin, token })
    }
}
