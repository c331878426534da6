//! Gallery image repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, GalleryImageId};
use crate::domain::gallery::GalleryImage;

#[async_trait]
pub trait GalleryRepository: Send + Sync {
    async fn save(&self, image: &GalleryImage) -> Result<(), DomainError>;

    async fn update(&self, image: &GalleryImage) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &GalleryImageId) -> Result<Option<GalleryImage>, DomainError>;

    /// Sorted by sort order, then newest first.
    async fn list(&self) -> Result<Vec<GalleryImage>, DomainError>;

    /// Highest sort order in use, if any image exists.
    async fn max_sort_order(&self) -> Result<Option<i32>, DomainError>;

    async fn delete(&self, id: &GalleryImageId) -> Result<(), DomainError>;
}
