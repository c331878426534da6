//! HS256 bearer tokens.
//!
//! Claims carry the principal kind (`member` or `admin`) and, for admins, the
//! role at issue time. Role changes take effect on the next login.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AdminRole, AdminUserId, AuthError, MemberId, Principal, Timestamp,
};
use crate::ports::{IssuedToken, TokenService};

const KIND_MEMBER: &str = "member";
const KIND_ADMIN: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    kind: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    iss: String,
    iat: i64,
    exp: i64,
}

pub struct JwtTokenService {
    secret: SecretString,
    issuer: String,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: SecretString, issuer: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret,
            issuer: issuer.into(),
            ttl,
        }
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        let key = EncodingKey::from_secret(self.secret.expose_secret().as_bytes());
        encode(&Header::new(Algorithm::HS256), claims, &key).map_err(|e| {
            tracing::error!(error = %e, "failed to sign token");
            AuthError::Internal("failed to sign token".to_string())
        })
    }

    fn claims_for(&self, principal: &Principal, now: Timestamp) -> Claims {
        let (sub, kind, role) = match principal {
            Principal::Member { id, .. } => (id.to_string(), KIND_MEMBER, None),
            Principal::Admin { id, role, .. } => {
                (id.to_string(), KIND_ADMIN, Some(role.as_str().to_string()))
            }
        };
        let iat = now.as_unix_secs();
        Claims {
            sub,
            kind: kind.to_string(),
            email: principal.email().to_string(),
            role,
            iss: self.issuer.clone(),
            iat,
            exp: iat + self.ttl.as_secs() as i64,
        }
    }

    fn principal_from(claims: Claims) -> Result<Principal, AuthError> {
        match claims.kind.as_str() {
            KIND_MEMBER => {
                let id: MemberId = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
                Ok(Principal::Member {
                    id,
                    email: claims.email,
                })
            }
            KIND_ADMIN => {
                let id: AdminUserId = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
                let role: AdminRole = claims
                    .role
                    .as_deref()
                    .ok_or(AuthError::InvalidToken)?
                    .parse()
                    .map_err(|_| AuthError::InvalidToken)?;
                Ok(Principal::Admin {
                    id,
                    email: claims.email,
                    role,
                })
            }
            _ => Err(AuthError::InvalidToken),
        }
    }
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenService for JwtTokenService {
    async fn issue(&self, principal: &Principal) -> Result<IssuedToken, AuthError> {
        let claims = self.claims_for(principal, Timestamp::now());
        let expires_at = Timestamp::from_unix_secs(claims.exp)
            .ok_or_else(|| AuthError::Internal("token expiry out of range".to_string()))?;
        let token = self.encode_claims(&claims)?;
        Ok(IssuedToken { token, expires_at })
    }

    async fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = true;

        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    tracing::debug!(error = %e, "token rejected");
                    AuthError::InvalidToken
                }
            }
        })?;

        Self::principal_from(data.claims)
    }
}
