//! Membership status state machine.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a member's paid membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Signed up, membership fee not yet paid.
    Pending,

    /// Paid and within the membership period.
    Active,

    /// Membership period ended without renewal.
    Expired,

    /// Cancelled by an admin or by a full refund.
    Cancelled,
}

impl MembershipStatus {
    pub const ALL: [MembershipStatus; 4] = [
        MembershipStatus::Pending,
        MembershipStatus::Active,
        MembershipStatus::Expired,
        MembershipStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Pending => "pending",
            MembershipStatus::Active => "active",
            MembershipStatus::Expired => "expired",
            MembershipStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MembershipStatus::Pending),
            "active" => Ok(MembershipStatus::Active),
            "expired" => Ok(MembershipStatus::Expired),
            "cancelled" => Ok(MembershipStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown membership status '{}'", other),
            )),
        }
    }
}

impl StateMachine for MembershipStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use MembershipStatus::*;
        matches!(
            (self, target),
            (Pending, Active)
                | (Pending, Cancelled)
                | (Active, Active) // renewal
                | (Active, Expired)
                | (Active, Cancelled)
                | (Expired, Active)
                | (Expired, Pending)
                | (Cancelled, Active)
                | (Cancelled, Pending)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use MembershipStatus::*;
        match self {
            Pending => vec![Active, Cancelled],
            Active => vec![Active, Expired, Cancelled],
            Expired => vec![Active, Pending],
            Cancelled => vec![Active, Pending],
        }
    }
}
