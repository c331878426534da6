//! Back-office member management.

use std::sync::Arc;

use crate::domain::event::Rsvp;
use crate::domain::foundation::{DomainError, MemberId, Timestamp};
use crate::domain::member::{Member, MembershipStatus};
use crate::domain::payment::Payment;
use crate::ports::{
    EventRepository, MemberFilter, MemberRepository, Page, Paginated, PaymentRepository,
};

use super::profile::{expire_lapsed, load_current};

#[derive(Debug, Clone, Default)]
pub struct ListMembersQuery {
    pub filter: MemberFilter,
    pub page: Page,
}

pub struct ListMembersHandler {
    members: Arc<dyn MemberRepository>,
}

impl ListMembersHandler {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    pub async fn handle(&self, query: ListMembersQuery) -> Result<Paginated<Member>, DomainError> {
        expire_lapsed(self.members.as_ref()).await?;
        self.members.list(&query.filter, query.page).await
    }
}

/// A member with their payment and reservation history.
#[derive(Debug, Clone)]
pub struct MemberDetail {
    pub member: Member,
    pub payments: Vec<Payment>,
    pub rsvps: Vec<Rsvp>,
}

pub struct GetMemberHandler {
    members: Arc<dyn MemberRepository>,
    payments: Arc<dyn PaymentRepository>,
    events: Arc<dyn EventRepository>,
}

impl GetMemberHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        payments: Arc<dyn PaymentRepository>,
        events: Arc<dyn EventRepository>,
    ) -> Self {
        Self {
            members,
            payments,
            events,
        }
    }

    pub async fn handle(&self, id: MemberId) -> Result<MemberDetail, DomainError> {
        let member = load_current(self.members.as_ref(), &id).await?;
        let payments = self.payments.list_for_member(&id).await?;
        let rsvps = self.events.list_rsvps_for_member(&id).await?;
        Ok(MemberDetail {
            member,
            payments,
            rsvps,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UpdateMemberStatusCommand {
    pub member_id: MemberId,
    pub status: MembershipStatus,
    pub membership_expires_at: Option<Timestamp>,
}

pub struct UpdateMemberStatusHandler {
    members: Arc<dyn MemberRepository>,
}

impl UpdateMemberStatusHandler {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    pub async fn handle(&self, cmd: UpdateMemberStatusCommand) -> Result<Member, DomainError> {
        let mut member = load_current(self.members.as_ref(), &cmd.member_id).await?;
        let from = member.status;
        member.set_status(cmd.status, cmd.membership_expires_at)?;
        self.members.update(&member).await?;
        tracing::info!(
            member_id = %member.id,
            from = %from,
            to = %member.status,
            "Member status changed by admin"
        );
        Ok(member)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateMemberNotesCommand {
    pub member_id: MemberId,
    pub notes: Option<String>,
}

pub struct UpdateMemberNotesHandler {
    members: Arc<dyn MemberRepository>,
}

impl UpdateMemberNotesHandler {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    pub async fn handle(&self, cmd: UpdateMemberNotesCommand) -> Result<Member, DomainError> {
        let mut member = load_current(self.members.as_ref(), &cmd.member_id).await?;
        member.set_admin_notes(cmd.notes.as_deref())?;
        self.members.update(&member).await?;
        Ok(member)
    }
}

/// Deletes a member. Reservations go with them; payments stay for the
/// books with the member reference cleared.
pub struct DeleteMemberHandler {
    members: Arc<dyn MemberRepository>,
    payments: Arc<dyn PaymentRepository>,
    events: Arc<dyn EventRepository>,
}

impl DeleteMemberHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        payments: Arc<dyn PaymentRepository>,
        events: Arc<dyn EventRepository>,
    ) -> Self {
        Self {
            members,
            payments,
            events,
        }
    }

    pub async fn handle(&self, id: MemberId) -> Result<(), DomainError> {
        let member = load_current(self.members.as_ref(), &id).await?;
        let rsvps = self.events.remove_member_rsvps(&id).await?;
        let payments = self.payments.detach_member(&id).await?;
        self.members.delete(&id).await?;
        tracing::info!(
            member_id = %member.id,
            rsvps_removed = rsvps,
            payments_detached = payments,
            "Member deleted"
        );
        Ok(())
    }
}
