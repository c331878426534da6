//! Money value object: integer minor units plus an ISO currency code.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A non-negative amount of money in minor units (cents).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount_cents: i64,
    currency: String,
}

impl Money {
    /// Creates an amount, rejecting negative values and malformed currency codes.
    pub fn new(amount_cents: i64, currency: impl AsRef<str>) -> Result<Self, ValidationError> {
        if amount_cents < 0 {
            return Err(ValidationError::out_of_range(
                "amount_cents",
                0,
                i64::MAX,
                amount_cents,
            ));
        }
        let currency = normalize_currency(currency.as_ref())?;
        Ok(Self {
            amount_cents,
            currency,
        })
    }

    /// Zero in the given currency.
    pub fn zero(currency: impl AsRef<str>) -> Result<Self, ValidationError> {
        Self::new(0, currency)
    }

    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }

    /// Lowercase ISO 4217 code, as Stripe expects it.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Same currency, new amount.
    pub fn with_amount(&self, amount_cents: i64) -> Result<Self, ValidationError> {
        Self::new(amount_cents, &self.currency)
    }

    /// Difference, or `None` when it would go negative.
    pub fn checked_sub_cents(&self, cents: i64) -> Option<Self> {
        let remaining = self.amount_cents.checked_sub(cents)?;
        (remaining >= 0).then(|| Self {
            amount_cents: remaining,
            currency: self.currency.clone(),
        })
    }

    /// Human-readable form used on receipts, e.g. `25.00 USD`.
    pub fn display(&self) -> String {
        format_cents(self.amount_cents, &self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Formats minor units with two decimals and an uppercase code.
pub fn format_cents(amount_cents: i64, currency: &str) -> String {
    let sign = if amount_cents < 0 { "-" } else { "" };
    let abs = amount_cents.unsigned_abs();
    format!(
        "{}{}.{:02} {}",
        sign,
        abs / 100,
        abs % 100,
        currency.to_ascii_uppercase()
    )
}

fn normalize_currency(raw: &str) -> Result<String, ValidationError> {
    let code = raw.trim().to_ascii_lowercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::invalid_format(
            "currency",
            "must be a three-letter ISO 4217 code",
        ));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_negative_amounts() {
        assert!(Money::new(-1, "usd").is_err());
    }

    #[test]
    fn normalizes_currency_to_lowercase() {
        let money = Money::new(2500, " USD ").unwrap();
        assert_eq!(money.currency(), "usd");
    }

    #[test]
    fn rejects_malformed_currency() {
        assert!(Money::new(100, "dollars").is_err());
        assert!(Money::new(100, "u$d").is_err());
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Money::new(2500, "usd").unwrap().display(), "25.00 USD");
        assert_eq!(Money::new(7, "eur").unwrap().display(), "0.07 EUR");
        assert_eq!(format_cents(-1050, "usd"), "-10.50 USD");
    }

    #[test]
    fn checked_sub_refuses_to_go_negative() {
        let money = Money::new(500, "usd").unwrap();
        assert_eq!(money.checked_sub_cents(200).unwrap().amount_cents(), 300);
        assert!(money.checked_sub_cents(501).is_none());
    }

    proptest! {
        #[test]
        fn checked_sub_never_yields_negative(amount in 0i64..1_000_000, cents in 0i64..2_000_000) {
            let money = Money::new(amount, "usd").unwrap();
            match money.checked_sub_cents(cents) {
                Some(rest) => prop_assert_eq!(rest.amount_cents(), amount - cents),
                None => prop_assert!(cents > amount),
            }
        }
    }
}
