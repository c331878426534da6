//! Event pricing tiers.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Money, ValidationError};

/// Most guests a member may bring to one event.
pub const MAX_GUESTS: u32 = 10;

/// Member and guest ticket prices for an event, in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTiers {
    pub member_price_cents: i64,
    pub guest_price_cents: i64,
    pub currency: String,
}

impl PricingTiers {
    pub fn new(
        member_price_cents: i64,
        guest_price_cents: i64,
        currency: &str,
    ) -> Result<Self, ValidationError> {
        // Money::new validates sign and currency for both tiers.
        let member = Money::new(member_price_cents, currency)?;
        Money::new(guest_price_cents, currency).map_err(|_| {
            ValidationError::out_of_range("guest_price_cents", 0, i64::MAX, guest_price_cents)
        })?;
        Ok(Self {
            member_price_cents,
            guest_price_cents,
            currency: member.currency().to_string(),
        })
    }

    /// Free when both tiers cost nothing.
    pub fn is_free(&self) -> bool {
        self.member_price_cents == 0 && self.guest_price_cents == 0
    }

    /// Member price plus `guests` times the guest price.
    pub fn price_for(&self, guests: u32) -> Result<Money, ValidationError> {
        validate_guests(guests)?;
        let total = self
            .guest_price_cents
            .checked_mul(i64::from(guests))
            .and_then(|g| g.checked_add(self.member_price_cents))
            .ok_or_else(|| ValidationError::invalid_format("price", "ticket total overflows"))?;
        Money::new(total, &self.currency)
    }
}

pub fn validate_guests(guests: u32) -> Result<(), ValidationError> {
    if guests > MAX_GUESTS {
        return Err(ValidationError::out_of_range(
            "guests",
            0,
            i64::from(MAX_GUESTS),
            i64::from(guests),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn price_adds_guest_tier_per_guest() {
        let pricing = PricingTiers::new(2000, 1500, "usd").unwrap();
        assert_eq!(pricing.price_for(0).unwrap().amount_cents(), 2000);
        assert_eq!(pricing.price_for(3).unwrap().amount_cents(), 6500);
    }

    #[test]
    fn rejects_too_many_guests() {
        let pricing = PricingTiers::new(0, 0, "usd").unwrap();
        assert!(pricing.price_for(MAX_GUESTS + 1).is_err());
    }

    #[test]
    fn rejects_negative_prices() {
        assert!(PricingTiers::new(-1, 0, "usd").is_err());
        assert!(PricingTiers::new(0, -1, "usd").is_err());
    }

    #[test]
    fn free_only_when_both_tiers_are_zero() {
        assert!(PricingTiers::new(0, 0, "usd").unwrap().is_free());
        assert!(!PricingTiers::new(0, 500, "usd").unwrap().is_free());
    }

    proptest! {
        #[test]
        fn price_is_linear_in_guests(member in 0i64..100_000, guest in 0i64..100_000, guests in 0u32..=MAX_GUESTS) {
            let pricing = PricingTiers::new(member, guest, "usd").unwrap();
            let total = pricing.price_for(guests).unwrap().amount_cents();
            prop_assert_eq!(total, member + guest * i64::from(guests));
        }
    }
}
