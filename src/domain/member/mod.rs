//! Member domain module.
//!
//! - `aggregate` - Member aggregate and profile validation
//! - `status` - MembershipStatus state machine

mod aggregate;
mod status;

pub use aggregate::{
    validate_password, Member, NewMember, MAX_NAME_LEN, MAX_NOTES_LEN, MAX_PHONE_LEN,
    MIN_PASSWORD_LEN,
};
pub use status::MembershipStatus;
