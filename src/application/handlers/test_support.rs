//! Shared fixtures for handler tests.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use crate::adapters::auth::{Argon2PasswordHasher, JwtTokenService};
use crate::adapters::memory::InMemoryStore;
use crate::domain::foundation::{MemberId, Timestamp};
use crate::domain::member::{Member, NewMember};
use crate::ports::{MemberRepository, PasswordHasher, TokenService};

pub fn hasher() -> Arc<dyn PasswordHasher> {
    Arc::new(Argon2PasswordHasher::with_params(1024, 1, 1).unwrap())
}

pub fn tokens() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(
        SecretString::new("test-secret-with-enough-entropy".to_string()),
        "clubhouse-test",
        Duration::from_secs(3600),
    ))
}

pub async fn member(store: &InMemoryStore, email: &str) -> Member {
    let profile = NewMember::parse(email, "Ada", "Lovelace", None, None).unwrap();
    let member = Member::sign_up(MemberId::new(), profile, "hash".into());
    MemberRepository::save(store, &member).await.unwrap();
    member
}

pub async fn active_member(store: &InMemoryStore, email: &str) -> Member {
    let mut member = member(store, email).await;
    member.activate_membership(Timestamp::now(), 365).unwrap();
    MemberRepository::update(store, &member).await.unwrap();
    member
}
