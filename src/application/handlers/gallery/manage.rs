//! Gallery listing, edits and deletion.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, GalleryImageId};
use crate::domain::gallery::GalleryImage;
use crate::ports::{BlobStorage, GalleryRepository, StoredBlob};

async fn load(
    gallery: &dyn GalleryRepository,
    id: &GalleryImageId,
) -> Result<GalleryImage, DomainError> {
    gallery.find_by_id(id).await?.ok_or_else(|| {
        DomainError::new(ErrorCode::GalleryImageNotFound, "Image not found")
            .with_detail("image_id", id.to_string())
    })
}

/// Public gallery, by sort order then newest.
pub struct ListImagesHandler {
    gallery: Arc<dyn GalleryRepository>,
}

impl ListImagesHandler {
    pub fn new(gallery: Arc<dyn GalleryRepository>) -> Self {
        Self { gallery }
    }

    pub async fn handle(&self) -> Result<Vec<GalleryImage>, DomainError> {
        self.gallery.list().await
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateImageCommand {
    pub image_id: GalleryImageId,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub sort_order: Option<i32>,
}

pub struct UpdateImageHandler {
    gallery: Arc<dyn GalleryRepository>,
}

impl UpdateImageHandler {
    pub fn new(gallery: Arc<dyn GalleryRepository>) -> Self {
        Self { gallery }
    }

    pub async fn handle(&self, cmd: UpdateImageCommand) -> Result<GalleryImage, DomainError> {
        let mut image = load(self.gallery.as_ref(), &cmd.image_id).await?;
        image.update(cmd.title.as_deref(), cmd.caption.as_deref(), cmd.sort_order)?;
        self.gallery.update(&image).await?;
        tracing::info!(image_id = %image.id, "Gallery image updated");
        Ok(image)
    }
}

pub struct DeleteImageHandler {
    gallery: Arc<dyn GalleryRepository>,
    storage: Arc<dyn BlobStorage>,
}

impl DeleteImageHandler {
    pub fn new(gallery: Arc<dyn GalleryRepository>, storage: Arc<dyn BlobStorage>) -> Self {
        Self { gallery, storage }
    }

    pub async fn handle(&self, image_id: GalleryImageId) -> Result<(), DomainError> {
        let image = load(self.gallery.as_ref(), &image_id).await?;
        self.storage
            .delete(&StoredBlob {
                url: image.url.clone(),
                pathname: image.pathname.clone(),
            })
            .await?;
        self.gallery.delete(&image.id).await?;
        tracing::info!(image_id = %image.id, pathname = %image.pathname, "Gallery image deleted");
        Ok(())
    }
}
