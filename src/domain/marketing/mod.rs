//! Referral sources and marketing statistics.

mod referral_source;
mod statistics;

pub use referral_source::{name_key, ReferralSource, MAX_SOURCE_NAME_LEN};
pub use statistics::{
    compile_stats, DateRange, EventAttendance, MarketingStats, MemberFact, MonthlyStat,
    PaymentFact, PurposeRevenue, ReferralStat, RefundTotals, UNATTRIBUTED,
};
