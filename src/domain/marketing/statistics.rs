//! Marketing statistics compiled from read-model facts.
//!
//! The marketing reader port loads flat facts about members, payments and
//! events; everything here is pure aggregation so it is tested without a
//! database.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::domain::event::Event;
use crate::domain::foundation::{DomainError, EventId, ReferralSourceId, Timestamp};
use crate::domain::member::MembershipStatus;
use crate::domain::payment::{PaymentPurpose, PaymentStatus};

use super::ReferralSource;

/// Label used for members who picked no referral source.
pub const UNATTRIBUTED: &str = "unattributed";

/// Inclusive-exclusive window `[from, to)`; open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

impl DateRange {
    pub fn new(from: Option<Timestamp>, to: Option<Timestamp>) -> Result<Self, DomainError> {
        if let (Some(from), Some(to)) = (from, to) {
            if to.is_before(&from) {
                return Err(DomainError::validation("to", "Range end must not precede its start"));
            }
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, ts: &Timestamp) -> bool {
        self.from.map_or(true, |from| !ts.is_before(&from))
            && self.to.map_or(true, |to| ts.is_before(&to))
    }
}

/// Member row as the statistics need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberFact {
    pub status: MembershipStatus,
    pub referral_source_id: Option<ReferralSourceId>,
    pub created_at: Timestamp,
    /// Member has at least one paid membership payment.
    pub converted: bool,
}

/// Payment row as the statistics need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentFact {
    pub purpose: PaymentPurpose,
    pub status: PaymentStatus,
    pub amount_cents: i64,
    pub refunded_cents: i64,
    pub paid_at: Option<Timestamp>,
}

/// Attendance counters for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventAttendance {
    pub event_id: EventId,
    pub title: String,
    pub starts_at: Timestamp,
    pub capacity: Option<u32>,
    pub rsvp_count: u32,
    pub checked_in_count: u32,
    pub utilization: Option<f64>,
}

impl From<&Event> for EventAttendance {
    fn from(event: &Event) -> Self {
        Self {
            event_id: event.id,
            title: event.title.clone(),
            starts_at: event.starts_at,
            capacity: event.capacity,
            rsvp_count: event.rsvp_count,
            checked_in_count: event.checked_in_count,
            utilization: event.utilization(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferralStat {
    pub source_id: Option<ReferralSourceId>,
    pub name: String,
    pub signups: u64,
    /// Fraction of all signups in range.
    pub share: f64,
    pub converted: u64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyStat {
    /// `YYYY-MM`
    pub month: String,
    pub signups: u64,
    pub net_revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurposeRevenue {
    pub purpose: PaymentPurpose,
    pub payments: u64,
    pub gross_cents: i64,
    pub refunded_cents: i64,
    pub net_cents: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefundTotals {
    pub refunded_payments: u64,
    pub fully_refunded_payments: u64,
    pub total_refunded_cents: i64,
}

/// Dashboard payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketingStats {
    pub range: DateRange,
    pub currency: String,
    pub total_members: u64,
    pub members_by_status: BTreeMap<String, u64>,
    pub signups_in_range: u64,
    pub referrals: Vec<ReferralStat>,
    pub monthly: Vec<MonthlyStat>,
    pub revenue_by_purpose: Vec<PurposeRevenue>,
    pub refunds: RefundTotals,
    pub events: Vec<EventAttendance>,
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Aggregates facts into the dashboard payload.
pub fn compile_stats(
    range: DateRange,
    currency: &str,
    sources: &[ReferralSource],
    members: &[MemberFact],
    payments: &[PaymentFact],
    events: Vec<EventAttendance>,
) -> MarketingStats {
    let mut members_by_status: BTreeMap<String, u64> = MembershipStatus::ALL
        .iter()
        .map(|status| (status.as_str().to_string(), 0))
        .collect();
    for member in members {
        *members_by_status
            .entry(member.status.as_str().to_string())
            .or_default() += 1;
    }

    let signups: Vec<&MemberFact> = members
        .iter()
        .filter(|m| range.contains(&m.created_at))
        .collect();
    let signups_in_range = signups.len() as u64;

    let referrals = referral_breakdown(sources, &signups, signups_in_range);

    let paid: Vec<(&PaymentFact, Timestamp)> = payments
        .iter()
        .filter(|p| p.status.was_paid())
        .filter_map(|p| p.paid_at.map(|at| (p, at)))
        .filter(|(_, at)| range.contains(at))
        .collect();

    let mut months: BTreeMap<String, MonthlyStat> = BTreeMap::new();
    for member in &signups {
        let key = member.created_at.month_key();
        months
            .entry(key.clone())
            .or_insert_with(|| MonthlyStat {
                month: key,
                signups: 0,
                net_revenue_cents: 0,
            })
            .signups += 1;
    }
    for (payment, at) in &paid {
        let key = at.month_key();
        months
            .entry(key.clone())
            .or_insert_with(|| MonthlyStat {
                month: key,
                signups: 0,
                net_revenue_cents: 0,
            })
            .net_revenue_cents += payment.amount_cents - payment.refunded_cents;
    }

    let mut revenue_by_purpose = Vec::new();
    for purpose in [PaymentPurpose::Membership, PaymentPurpose::EventTicket] {
        let mut row = PurposeRevenue {
            purpose,
            payments: 0,
            gross_cents: 0,
            refunded_cents: 0,
            net_cents: 0,
        };
        for (payment, _) in paid.iter().filter(|(p, _)| p.purpose == purpose) {
            row.payments += 1;
            row.gross_cents += payment.amount_cents;
            row.refunded_cents += payment.refunded_cents;
        }
        row.net_cents = row.gross_cents - row.refunded_cents;
        revenue_by_purpose.push(row);
    }

    let mut refunds = RefundTotals::default();
    for (payment, _) in &paid {
        if payment.refunded_cents > 0 {
            refunds.refunded_payments += 1;
            refunds.total_refunded_cents += payment.refunded_cents;
        }
        if payment.status == PaymentStatus::Refunded {
            refunds.fully_refunded_payments += 1;
        }
    }

    let mut events: Vec<EventAttendance> = events
        .into_iter()
        .filter(|e| range.contains(&e.starts_at))
        .collect();
    events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));

    MarketingStats {
        range,
        currency: currency.to_string(),
        total_members: members.len() as u64,
        members_by_status,
        signups_in_range,
        referrals,
        monthly: months.into_values().collect(),
        revenue_by_purpose,
        refunds,
        events,
    }
}

fn referral_breakdown(
    sources: &[ReferralSource],
    signups: &[&MemberFact],
    total: u64,
) -> Vec<ReferralStat> {
    let mut counts: HashMap<Option<ReferralSourceId>, (u64, u64)> = HashMap::new();
    for member in signups {
        let entry = counts.entry(member.referral_source_id).or_default();
        entry.0 += 1;
        if member.converted {
            entry.1 += 1;
        }
    }

    let mut rows: Vec<ReferralStat> = sources
        .iter()
        .map(|source| {
            let (signups, converted) = counts.remove(&Some(source.id)).unwrap_or_default();
            ReferralStat {
                source_id: Some(source.id),
                name: source.name.clone(),
                signups,
                share: ratio(signups, total),
                converted,
                conversion_rate: ratio(converted, signups),
            }
        })
        .collect();

    // Members whose source was deleted count as unattributed.
    let (signups, converted) = counts
        .into_values()
        .fold((0, 0), |acc, (s, c)| (acc.0 + s, acc.1 + c));
    rows.push(ReferralStat {
        source_id: None,
        name: UNATTRIBUTED.to_string(),
        signups,
        share: ratio(signups, total),
        converted,
        conversion_rate: ratio(converted, signups),
    });

    rows.sort_by(|a, b| b.signups.cmp(&a.signups).then_with(|| a.name.cmp(&b.name)));
    rows
}
