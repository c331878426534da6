//! Member handlers.
//!
//! ## Commands
//! - Signing up (account plus membership checkout)
//! - Logging in
//! - Updating the own profile
//! - Starting a membership checkout or renewal
//! - Back office: status, notes, deletion
//!
//! ## Queries
//! - Own profile
//! - Back office: member list and detail

mod log_in;
mod manage;
mod membership_checkout;
mod profile;
mod sign_up;

pub use log_in::{LogInMemberCommand, LogInMemberHandler, LogInMemberResult};
pub(crate) use log_in::invalid_credentials;
pub(crate) use profile::expire_lapsed;
pub use manage::{
    DeleteMemberHandler, GetMemberHandler, ListMembersHandler, ListMembersQuery, MemberDetail,
    UpdateMemberNotesCommand, UpdateMemberNotesHandler, UpdateMemberStatusCommand,
    UpdateMemberStatusHandler,
};
pub use membership_checkout::StartMembershipCheckoutHandler;
pub use profile::{GetProfileHandler, UpdateProfileCommand, UpdateProfileHandler};
pub use sign_up::{SignUpCommand, SignUpHandler, SignUpResult};
