//! Club-wide settings the handlers need from configuration.

use crate::config::AppConfig;
use crate::domain::foundation::{DomainError, Money};

/// Membership terms, checkout redirects and upload limits.
#[derive(Debug, Clone)]
pub struct ClubSettings {
    pub club_name: String,
    pub currency: String,
    pub membership_fee_cents: i64,
    pub membership_period_days: i64,
    pub renewal_window_days: i64,
    pub site_url: String,
    pub max_upload_bytes: u64,
}

impl ClubSettings {
    pub fn from_config(config: &AppConfig, club_name: impl Into<String>) -> Self {
        Self {
            club_name: club_name.into(),
            currency: config.payment.currency.to_ascii_lowercase(),
            membership_fee_cents: config.payment.membership_fee_cents,
            membership_period_days: config.payment.membership_period_days,
            renewal_window_days: config.payment.renewal_window_days,
            site_url: config.payment.site_url.trim_end_matches('/').to_string(),
            max_upload_bytes: config.storage.max_upload_bytes,
        }
    }

    pub fn membership_fee(&self) -> Result<Money, DomainError> {
        Ok(Money::new(self.membership_fee_cents, &self.currency)?)
    }

    /// Checkout success redirect; Stripe substitutes the session id.
    pub fn success_url(&self, path: &str) -> String {
        format!("{}{}?session_id={{CHECKOUT_SESSION_ID}}", self.site_url, path)
    }

    pub fn cancel_url(&self, path: &str) -> String {
        format!("{}{}", self.site_url, path)
    }
}

#[cfg(test)]
impl ClubSettings {
    /// Settings used across handler tests.
    pub fn for_tests() -> Self {
        Self {
            club_name: "Test Club".to_string(),
            currency: "usd".to_string(),
            membership_fee_cents: 5_000,
            membership_period_days: 365,
            renewal_window_days: 30,
            site_url: "https://club.example.org".to_string(),
            max_upload_bytes: 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_urls_join_site_and_path() {
        let settings = ClubSettings::for_tests();
        assert_eq!(
            settings.success_url("/membership/success"),
            "https://club.example.org/membership/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(
            settings.cancel_url("/membership"),
            "https://club.example.org/membership"
        );
    }

    #[test]
    fn membership_fee_uses_configured_currency() {
        let fee = ClubSettings::for_tests().membership_fee().unwrap();
        assert_eq!(fee.amount_cents(), 5_000);
        assert_eq!(fee.currency(), "usd");
    }
}
