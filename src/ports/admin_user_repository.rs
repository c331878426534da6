//! Admin user repository port.

use async_trait::async_trait;

use crate::domain::admin::AdminUser;
use crate::domain::foundation::{AdminRole, AdminUserId, DomainError, Email};

#[async_trait]
pub trait AdminUserRepository: Send + Sync {
    /// # Errors
    ///
    /// - `AdminUserExists` if the email is taken
    async fn save(&self, user: &AdminUser) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `AdminUserNotFound` if the account does not exist
    /// - `LastAdministrator` if this demotes the only administrator; checked
    ///   atomically with the write
    async fn update(&self, user: &AdminUser) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &AdminUserId) -> Result<Option<AdminUser>, DomainError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<AdminUser>, DomainError>;

    /// Ordered by name.
    async fn list(&self) -> Result<Vec<AdminUser>, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;

    async fn count_with_role(&self, role: AdminRole) -> Result<u64, DomainError>;

    /// # Errors
    ///
    /// - `AdminUserNotFound` if the account does not exist
    /// - `LastAdministrator` if it is the only administrator; checked
    ///   atomically with the delete
    async fn delete(&self, id: &AdminUserId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_user_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn AdminUserRepository) {}
    }
}
