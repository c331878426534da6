//! Marketing handlers: referral sources and dashboard statistics.

mod referral_sources;
mod stats;

pub use referral_sources::{
    CreateReferralSourceHandler, DeleteReferralSourceHandler, ListReferralSourcesHandler,
    UpdateReferralSourceCommand, UpdateReferralSourceHandler,
};
pub use stats::GetMarketingStatsHandler;
