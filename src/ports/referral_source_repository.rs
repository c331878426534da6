//! Referral source repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ReferralSourceId};
use crate::domain::marketing::ReferralSource;

#[async_trait]
pub trait ReferralSourceRepository: Send + Sync {
    /// # Errors
    ///
    /// - `ReferralSourceExists` if the name is taken (case-insensitive)
    async fn save(&self, source: &ReferralSource) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `ReferralSourceExists` if a rename collides with another source
    async fn update(&self, source: &ReferralSource) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ReferralSourceId)
        -> Result<Option<ReferralSource>, DomainError>;

    /// Ordered by name; `active_only` hides deactivated sources.
    async fn list(&self, active_only: bool) -> Result<Vec<ReferralSource>, DomainError>;

    /// Members attributed to this source.
    async fn usage_count(&self, id: &ReferralSourceId) -> Result<u64, DomainError>;

    async fn delete(&self, id: &ReferralSourceId) -> Result<(), DomainError>;
}
