//! Payment configuration (Stripe)

use serde::Deserialize;

use super::error::ValidationError;

/// Which payment provider adapter to wire.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    #[default]
    Stripe,
    /// Records checkout and refund calls without network traffic.
    Mock,
}

/// Stripe payment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    #[serde(default)]
    pub mode: PaymentMode,

    /// Stripe secret API key (sk_test_... or sk_live_...)
    #[serde(default)]
    pub stripe_api_key: String,

    /// Stripe webhook signing secret (whsec_...)
    #[serde(default)]
    pub stripe_webhook_secret: String,

    /// Stripe API base URL
    #[serde(default = "default_api_base_url")]
    pub stripe_api_base_url: String,

    /// ISO currency code for every charge
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Membership fee in cents
    #[serde(default = "default_membership_fee")]
    pub membership_fee_cents: i64,

    /// Days of access granted per membership payment
    #[serde(default = "default_membership_period")]
    pub membership_period_days: i64,

    /// Days before expiry when renewal checkout opens
    #[serde(default = "default_renewal_window")]
    pub renewal_window_days: i64,

    /// Public site URL used for Checkout success/cancel redirects
    #[serde(default = "default_site_url")]
    pub site_url: String,
}

impl PaymentConfig {
    /// Check if using test mode keys
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using live mode keys
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mode == PaymentMode::Stripe {
            if self.stripe_api_key.is_empty() {
                return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"));
            }
            if self.stripe_webhook_secret.is_empty() {
                return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_WEBHOOK_SECRET"));
            }
            if !self.stripe_api_key.starts_with("sk_") {
                return Err(ValidationError::InvalidStripeKey);
            }
        }
        if !self.stripe_webhook_secret.is_empty() && !self.stripe_webhook_secret.starts_with("whsec_")
        {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        let currency_ok = self.currency.len() == 3
            && self.currency.chars().all(|c| c.is_ascii_alphabetic());
        if !currency_ok {
            return Err(ValidationError::InvalidCurrency(self.currency.clone()));
        }
        if self.membership_fee_cents <= 0 {
            return Err(ValidationError::InvalidMembershipFee);
        }
        if self.membership_period_days <= 0
            || self.renewal_window_days <= 0
            || self.renewal_window_days >= self.membership_period_days
        {
            return Err(ValidationError::InvalidMembershipPeriod);
        }
        if !self.site_url.starts_with("http://") && !self.site_url.starts_with("https://") {
            return Err(ValidationError::InvalidSiteUrl);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            mode: PaymentMode::default(),
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            stripe_api_base_url: default_api_base_url(),
            currency: default_currency(),
            membership_fee_cents: default_membership_fee(),
            membership_period_days: default_membership_period(),
            renewal_window_days: default_renewal_window(),
            site_url: default_site_url(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_membership_fee() -> i64 {
    5_000
}

fn default_membership_period() -> i64 {
    365
}

fn default_renewal_window() -> i64 {
    30
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripe_config() -> PaymentConfig {
        PaymentConfig {
            stripe_api_key: "sk_test_abcd1234".to_string(),
            stripe_webhook_secret: "whsec_xyz789".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_test_mode() {
        let config = stripe_config();
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());
    }

    #[test]
    fn test_validation_missing_keys() {
        assert_eq!(
            PaymentConfig::default().validate(),
            Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"))
        );
        let config = PaymentConfig {
            stripe_api_key: "sk_test_xxx".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("PAYMENT__STRIPE_WEBHOOK_SECRET"))
        );
    }

    #[test]
    fn test_validation_key_prefixes() {
        let config = PaymentConfig {
            stripe_api_key: "pk_test_xxx".to_string(),
            ..stripe_config()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidStripeKey));

        let config = PaymentConfig {
            stripe_webhook_secret: "secret_xxx".to_string(),
            ..stripe_config()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidStripeWebhookSecret));
    }

    #[test]
    fn test_mock_mode_needs_no_keys() {
        let config = PaymentConfig {
            mode: PaymentMode::Mock,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_membership_terms_validation() {
        let config = PaymentConfig {
            renewal_window_days: 400,
            ..stripe_config()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidMembershipPeriod));

        let config = PaymentConfig {
            membership_fee_cents: 0,
            ..stripe_config()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidMembershipFee));

        let config = PaymentConfig {
            currency: "dollars".to_string(),
            ..stripe_config()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidCurrency(_))));
    }

    #[test]
    fn test_site_url_with_trailing_slash_is_valid() {
        let config = PaymentConfig {
            site_url: "https://club.example.org/".to_string(),
            ..stripe_config()
        };
        assert!(config.validate().is_ok());
    }
}
