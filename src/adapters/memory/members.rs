use async_trait::async_trait;

use crate::domain::admin::{ensure_not_last_administrator, AdminUser};
use crate::domain::foundation::{
    AdminRole, AdminUserId, DomainError, Email, ErrorCode, MemberId, Timestamp,
};
use crate::domain::member::Member;
use crate::ports::{AdminUserRepository, MemberFilter, MemberRepository, Page, Paginated};

use super::InMemoryStore;

fn member_exists() -> DomainError {
    DomainError::new(ErrorCode::MemberExists, "A member with this email already exists")
}

fn admin_exists() -> DomainError {
    DomainError::new(
        ErrorCode::AdminUserExists,
        "An admin user with this email already exists",
    )
}

#[async_trait]
impl MemberRepository for InMemoryStore {
    async fn save(&self, member: &Member) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if tables.members.values().any(|m| m.email == member.email) {
            return Err(member_exists());
        }
        tables.members.insert(member.id, member.clone());
        Ok(())
    }

    async fn update(&self, member: &Member) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.members.contains_key(&member.id) {
            return Err(DomainError::new(ErrorCode::MemberNotFound, "Member not found"));
        }
        if tables
            .members
            .values()
            .any(|m| m.id != member.id && m.email == member.email)
        {
            return Err(member_exists());
        }
        tables.members.insert(member.id, member.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, DomainError> {
        Ok(self.tables.read().await.members.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Member>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.members.values().find(|m| &m.email == email).cloned())
    }

    async fn list(
        &self,
        filter: &MemberFilter,
        page: Page,
    ) -> Result<Paginated<Member>, DomainError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<Member> = tables
            .members
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as i64;
        Ok(Paginated::new(page.slice(&matching), total, page))
    }

    async fn delete(&self, id: &MemberId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        tables
            .members
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::new(ErrorCode::MemberNotFound, "Member not found"))
    }

    async fn expire_lapsed(&self, now: &Timestamp) -> Result<u64, DomainError> {
        let mut tables = self.tables.write().await;
        let expired = tables
            .members
            .values_mut()
            .map(|m| m.expire_if_lapsed(now))
            .filter(|changed| *changed)
            .count();
        Ok(expired as u64)
    }
}

#[async_trait]
impl AdminUserRepository for InMemoryStore {
    async fn save(&self, user: &AdminUser) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if tables.admin_users.values().any(|u| u.email == user.email) {
            return Err(admin_exists());
        }
        tables.admin_users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &AdminUser) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.admin_users.get(&user.id) else {
            return Err(DomainError::new(
                ErrorCode::AdminUserNotFound,
                "Admin user not found",
            ));
        };
        if user.role != AdminRole::Administrator {
            let administrators = tables
                .admin_users
                .values()
                .filter(|u| u.role == AdminRole::Administrator)
                .count() as u64;
            ensure_not_last_administrator(stored, administrators)?;
        }
        if tables
            .admin_users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(admin_exists());
        }
        tables.admin_users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AdminUserId) -> Result<Option<AdminUser>, DomainError> {
        Ok(self.tables.read().await.admin_users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<AdminUser>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.admin_users.values().find(|u| &u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<AdminUser>, DomainError> {
        let tables = self.tables.read().await;
        let mut users: Vec<AdminUser> = tables.admin_users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.tables.read().await.admin_users.len() as u64)
    }

    async fn count_with_role(&self, role: AdminRole) -> Result<u64, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.admin_users.values().filter(|u| u.role == role).count() as u64)
    }

    async fn delete(&self, id: &AdminUserId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.admin_users.get(id) else {
            return Err(DomainError::new(ErrorCode::AdminUserNotFound, "Admin user not found"));
        };
        let administrators = tables
            .admin_users
            .values()
            .filter(|u| u.role == AdminRole::Administrator)
            .count() as u64;
        ensure_not_last_administrator(stored, administrators)?;
        tables.admin_users.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::{MembershipStatus, NewMember};

    fn member(email: &str, first: &str) -> Member {
        let new = NewMember::parse(email, first, "Tester", None, None).unwrap();
        Member::sign_up(MemberId::new(), new, "hash".to_string())
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        MemberRepository::save(&store, &member("a@example.org", "Ann")).await.unwrap();
        let err = MemberRepository::save(&store, &member("A@Example.org", "Other"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MemberExists);
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let store = InMemoryStore::new();
        for (email, name) in [
            ("ann@example.org", "Ann"),
            ("bob@example.org", "Bob"),
            ("anna@example.org", "Anna"),
        ] {
            MemberRepository::save(&store, &member(email, name)).await.unwrap();
        }

        let filter = MemberFilter {
            search: Some("ann".to_string()),
            status: Some(MembershipStatus::Pending),
        };
        let page = Page { limit: 1, offset: 0 };
        let result = MemberRepository::list(&store, &filter, page).await.unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.items.len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_member_is_not_found() {
        let store = InMemoryStore::new();
        let err = MemberRepository::delete(&store, &MemberId::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MemberNotFound);
    }

    #[tokio::test]
    async fn admin_role_counts() {
        let store = InMemoryStore::new();
        for (email, role) in [
            ("root@example.org", AdminRole::Administrator),
            ("ed@example.org", AdminRole::Editor),
        ] {
            let user = AdminUser::new(
                AdminUserId::new(),
                Email::parse(email).unwrap(),
                "Someone",
                "hash".to_string(),
                role,
            )
            .unwrap();
            AdminUserRepository::save(&store, &user).await.unwrap();
        }
        assert_eq!(AdminUserRepository::count(&store).await.unwrap(), 2);
        assert_eq!(
            store.count_with_role(AdminRole::Administrator).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn writes_cannot_remove_the_last_administrator() {
        let store = InMemoryStore::new();
        let mut root = AdminUser::new(
            AdminUserId::new(),
            Email::parse("root@example.org").unwrap(),
            "Root",
            "hash".to_string(),
            AdminRole::Administrator,
        )
        .unwrap();
        AdminUserRepository::save(&store, &root).await.unwrap();

        root.change_role(AdminRole::Viewer);
        let err = AdminUserRepository::update(&store, &root).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LastAdministrator);

        let err = AdminUserRepository::delete(&store, &root.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LastAdministrator);

        let stored = AdminUserRepository::find_by_id(&store, &root.id).await.unwrap().unwrap();
        assert_eq!(stored.role, AdminRole::Administrator);
    }
}
