//! Bearer token port.
//!
//! Issues tokens at login and resolves them back into a [`Principal`] in the
//! auth middleware.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::{AuthError, Principal, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

#[async_trait]
pub trait TokenService: Send + Sync {
    async fn issue(&self, principal: &Principal) -> Result<IssuedToken, AuthError>;

    async fn validate(&self, token: &str) -> Result<Principal, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_service_is_object_safe() {
        fn _accepts_dyn(_service: &dyn TokenService) {}
    }
}
