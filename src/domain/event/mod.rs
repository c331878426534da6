//! Events, pricing tiers and reservations.

mod aggregate;
mod pricing;
mod rsvp;

pub use aggregate::{Event, EventDetails, MAX_CAPACITY, MAX_TITLE_LEN};
pub use pricing::{validate_guests, PricingTiers, MAX_GUESTS};
pub use rsvp::{Rsvp, RsvpStatus};
