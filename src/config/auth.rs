//! Authentication configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

const MIN_PRODUCTION_SECRET_LEN: usize = 32;
const MIN_TOKEN_TTL_SECS: u64 = 5 * 60;
const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Token signing and bootstrap admin settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret for bearer tokens
    pub jwt_secret: String,

    /// `iss` claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// Administrator created at startup when no admin accounts exist
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
    #[serde(default = "default_bootstrap_name")]
    pub bootstrap_admin_name: String,
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Both bootstrap credentials, when configured.
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        match (&self.bootstrap_admin_email, &self.bootstrap_admin_password) {
            (Some(email), Some(password)) if !email.trim().is_empty() => {
                Some((email.as_str(), password.as_str()))
            }
            _ => None,
        }
    }

    /// Validate authentication configuration
    ///
    /// Production requires a secret of at least 32 characters.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if *environment == Environment::Production
            && self.jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN
        {
            return Err(ValidationError::JwtSecretTooShort(MIN_PRODUCTION_SECRET_LEN));
        }
        if !(MIN_TOKEN_TTL_SECS..=MAX_TOKEN_TTL_SECS).contains(&self.token_ttl_secs) {
            return Err(ValidationError::InvalidTokenTtl);
        }
        if let Some((_, password)) = self.bootstrap_admin() {
            if password.chars().count() < 8 {
                return Err(ValidationError::BootstrapPasswordTooShort);
            }
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: default_issuer(),
            token_ttl_secs: default_token_ttl(),
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
            bootstrap_admin_name: default_bootstrap_name(),
        }
    }
}

fn default_issuer() -> String {
    "clubhouse".to_string()
}

fn default_token_ttl() -> u64 {
    12 * 60 * 60
}

fn default_bootstrap_name() -> String {
    "Administrator".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_secret_fails() {
        assert_eq!(
            config("").validate(&Environment::Development),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );
    }

    #[test]
    fn test_short_secret_only_fails_in_production() {
        assert!(config("dev-secret").validate(&Environment::Development).is_ok());
        assert_eq!(
            config("dev-secret").validate(&Environment::Production),
            Err(ValidationError::JwtSecretTooShort(32))
        );
        let long = "x".repeat(32);
        assert!(config(&long).validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_token_ttl_bounds() {
        let mut cfg = config("secret");
        cfg.token_ttl_secs = 60;
        assert_eq!(cfg.validate(&Environment::Development), Err(ValidationError::InvalidTokenTtl));
        assert_eq!(config("secret").token_ttl(), Duration::from_secs(43_200));
    }

    #[test]
    fn test_bootstrap_admin_requires_both_values() {
        let mut cfg = config("secret");
        cfg.bootstrap_admin_email = Some("root@example.org".into());
        assert!(cfg.bootstrap_admin().is_none());

        cfg.bootstrap_admin_password = Some("short".into());
        assert_eq!(
            cfg.validate(&Environment::Development),
            Err(ValidationError::BootstrapPasswordTooShort)
        );

        cfg.bootstrap_admin_password = Some("long enough".into());
        assert_eq!(cfg.bootstrap_admin(), Some(("root@example.org", "long enough")));
    }
}
