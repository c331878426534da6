//! BootstrapAdminHandler - First administrator from configuration.
//!
//! Runs at startup. Does nothing once any admin user exists.

use std::sync::Arc;

use crate::domain::admin::AdminUser;
use crate::domain::foundation::{AdminRole, AdminUserId, DomainError, Email};
use crate::domain::member::validate_password;
use crate::ports::{AdminUserRepository, PasswordHasher};

#[derive(Debug, Clone)]
pub struct BootstrapAdminCommand {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub struct BootstrapAdminHandler {
    admins: Arc<dyn AdminUserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl BootstrapAdminHandler {
    pub fn new(admins: Arc<dyn AdminUserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { admins, hasher }
    }

    /// Returns the created administrator, or `None` if admins already exist.
    pub async fn handle(&self, cmd: BootstrapAdminCommand) -> Result<Option<AdminUser>, DomainError> {
        if self.admins.count().await? > 0 {
            tracing::debug!("Admin users present; skipping bootstrap");
            return Ok(None);
        }

        validate_password(&cmd.password)?;
        let admin = AdminUser::new(
            AdminUserId::new(),
            Email::parse(&cmd.email)?,
            &cmd.name,
            self.hasher.hash(&cmd.password)?,
            AdminRole::Administrator,
        )?;
        self.admins.save(&admin).await?;
        tracing::info!(admin_id = %admin.id, email = %admin.email, "Bootstrap administrator created");
        Ok(Some(admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::handlers::test_support;

    fn command() -> BootstrapAdminCommand {
        BootstrapAdminCommand {
            email: "root@example.org".into(),
            password: "initial secret".into(),
            name: "Root".into(),
        }
    }

    #[tokio::test]
    async fn creates_once() {
        let store = InMemoryStore::new();
        let handler = BootstrapAdminHandler::new(Arc::new(store.clone()), test_support::hasher());

        let created = handler.handle(command()).await.unwrap().unwrap();
        assert_eq!(created.role, AdminRole::Administrator);
        assert!(handler.handle(command()).await.unwrap().is_none());
        assert_eq!(AdminUserRepository::count(&store).await.unwrap(), 1);
    }
}
