//! Referral source management.
//!
//! Names are unique ignoring case; the repository enforces it. Sources that
//! members point at can only be deactivated, never deleted.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, ReferralSourceId};
use crate::domain::marketing::ReferralSource;
use crate::ports::ReferralSourceRepository;

async fn load(
    sources: &dyn ReferralSourceRepository,
    id: &ReferralSourceId,
) -> Result<ReferralSource, DomainError> {
    sources.find_by_id(id).await?.ok_or_else(|| {
        DomainError::new(ErrorCode::ReferralSourceNotFound, "Referral source not found")
            .with_detail("referral_source_id", id.to_string())
    })
}

/// Lists sources. The signup form only sees active ones.
pub struct ListReferralSourcesHandler {
    sources: Arc<dyn ReferralSourceRepository>,
}

impl ListReferralSourcesHandler {
    pub fn new(sources: Arc<dyn ReferralSourceRepository>) -> Self {
        Self { sources }
    }

    pub async fn handle(&self, active_only: bool) -> Result<Vec<ReferralSource>, DomainError> {
        self.sources.list(active_only).await
    }
}

pub struct CreateReferralSourceHandler {
    sources: Arc<dyn ReferralSourceRepository>,
}

impl CreateReferralSourceHandler {
    pub fn new(sources: Arc<dyn ReferralSourceRepository>) -> Self {
        Self { sources }
    }

    pub async fn handle(&self, name: &str) -> Result<ReferralSource, DomainError> {
        let source = ReferralSource::new(ReferralSourceId::new(), name)?;
        self.sources.save(&source).await?;
        tracing::info!(referral_source_id = %source.id, name = %source.name, "Referral source created");
        Ok(source)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateReferralSourceCommand {
    pub referral_source_id: ReferralSourceId,
    pub name: Option<String>,
    pub active: Option<bool>,
}

pub struct UpdateReferralSourceHandler {
    sources: Arc<dyn ReferralSourceRepository>,
}

impl UpdateReferralSourceHandler {
    pub fn new(sources: Arc<dyn ReferralSourceRepository>) -> Self {
        Self { sources }
    }

    pub async fn handle(
        &self,
        cmd: UpdateReferralSourceCommand,
    ) -> Result<ReferralSource, DomainError> {
        let mut source = load(self.sources.as_ref(), &cmd.referral_source_id).await?;
        if let Some(name) = cmd.name.as_deref() {
            source.rename(name)?;
        }
        if let Some(active) = cmd.active {
            source.set_active(active);
        }
        self.sources.update(&source).await?;
        tracing::info!(
            referral_source_id = %source.id,
            active = source.active,
            "Referral source updated"
        );
        Ok(source)
    }
}

pub struct DeleteReferralSourceHandler {
    sources: Arc<dyn ReferralSourceRepository>,
}

impl DeleteReferralSourceHandler {
    pub fn new(sources: Arc<dyn ReferralSourceRepository>) -> Self {
        Self { sources }
    }

    pub async fn handle(&self, id: ReferralSourceId) -> Result<(), DomainError> {
        let source = load(self.sources.as_ref(), &id).await?;
        let usage = self.sources.usage_count(&source.id).await?;
        if usage > 0 {
            return Err(DomainError::new(
                ErrorCode::ReferralSourceInUse,
                "Referral source is in use; deactivate it instead",
            )
            .with_detail("members", usage.to_string()));
        }
        self.sources.delete(&source.id).await?;
        tracing::info!(referral_source_id = %source.id, "Referral source deleted");
        Ok(())
    }
}
