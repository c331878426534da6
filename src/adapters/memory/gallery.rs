use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, GalleryImageId};
use crate::domain::gallery::GalleryImage;
use crate::ports::GalleryRepository;

use super::InMemoryStore;

fn image_not_found() -> DomainError {
    DomainError::new(ErrorCode::GalleryImageNotFound, "Gallery image not found")
}

#[async_trait]
impl GalleryRepository for InMemoryStore {
    async fn save(&self, image: &GalleryImage) -> Result<(), DomainError> {
        self.tables.write().await.gallery.insert(image.id, image.clone());
        Ok(())
    }

    async fn update(&self, image: &GalleryImage) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let stored = tables.gallery.get_mut(&image.id).ok_or_else(image_not_found)?;
        *stored = image.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: &GalleryImageId) -> Result<Option<GalleryImage>, DomainError> {
        Ok(self.tables.read().await.gallery.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<GalleryImage>, DomainError> {
        let tables = self.tables.read().await;
        let mut images: Vec<GalleryImage> = tables.gallery.values().cloned().collect();
        images.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(images)
    }

    async fn max_sort_order(&self) -> Result<Option<i32>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.gallery.values().map(|i| i.sort_order).max())
    }

    async fn delete(&self, id: &GalleryImageId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        tables.gallery.remove(id).map(|_| ()).ok_or_else(image_not_found)
    }
}
