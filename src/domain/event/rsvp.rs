//! Event reservations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, MemberId, PaymentId, RsvpId, Timestamp, ValidationError,
};

use super::validate_guests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Confirmed,
    Cancelled,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Confirmed => "confirmed",
            RsvpStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(RsvpStatus::Confirmed),
            "cancelled" => Ok(RsvpStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown rsvp status '{}'", other),
            )),
        }
    }
}

/// A member's reservation: one seat for the member plus guests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rsvp {
    pub id: RsvpId,
    pub event_id: EventId,
    pub member_id: MemberId,
    pub guests: u32,
    pub status: RsvpStatus,
    pub checked_in: bool,
    pub payment_id: Option<PaymentId>,
    pub created_at: Timestamp,
}

impl Rsvp {
    pub fn confirm(
        id: RsvpId,
        event_id: EventId,
        member_id: MemberId,
        guests: u32,
        payment_id: Option<PaymentId>,
    ) -> Result<Self, ValidationError> {
        validate_guests(guests)?;
        Ok(Self {
            id,
            event_id,
            member_id,
            guests,
            status: RsvpStatus::Confirmed,
            checked_in: false,
            payment_id,
            created_at: Timestamp::now(),
        })
    }

    /// Seats held: the member plus guests.
    pub fn seats(&self) -> u32 {
        1 + self.guests
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == RsvpStatus::Confirmed
    }

    pub fn cancel(&mut self) -> Result<(), DomainError> {
        if !self.is_confirmed() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Reservation is already cancelled",
            ));
        }
        self.status = RsvpStatus::Cancelled;
        Ok(())
    }

    pub fn check_in(&mut self) -> Result<(), DomainError> {
        if !self.is_confirmed() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Cannot check in a cancelled reservation",
            ));
        }
        if self.checked_in {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Reservation is already checked in",
            ));
        }
        self.checked_in = true;
        Ok(())
    }
}
