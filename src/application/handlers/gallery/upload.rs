//! UploadImageHandler - Stores a gallery photo and its metadata.
//!
//! The blob is written first; if the metadata insert fails the blob is
//! removed again so storage never holds orphans from this path.

use std::sync::Arc;

use crate::domain::foundation::{AdminUserId, DomainError, GalleryImageId};
use crate::domain::gallery::{blob_pathname, validate_upload_size, GalleryImage, ImageContentType};
use crate::ports::{BlobStorage, GalleryRepository};

#[derive(Debug, Clone)]
pub struct UploadImageCommand {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub title: String,
    pub caption: Option<String>,
    pub uploaded_by: AdminUserId,
}

pub struct UploadImageHandler {
    gallery: Arc<dyn GalleryRepository>,
    storage: Arc<dyn BlobStorage>,
    max_upload_bytes: u64,
}

impl UploadImageHandler {
    pub fn new(
        gallery: Arc<dyn GalleryRepository>,
        storage: Arc<dyn BlobStorage>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            gallery,
            storage,
            max_upload_bytes,
        }
    }

    pub async fn handle(&self, cmd: UploadImageCommand) -> Result<GalleryImage, DomainError> {
        let content_type = ImageContentType::from_mime(&cmd.content_type)?;
        validate_upload_size(cmd.bytes.len() as u64, self.max_upload_bytes)?;

        let id = GalleryImageId::new();
        let size_bytes = cmd.bytes.len() as u64;
        let sort_order = self.gallery.max_sort_order().await?.map_or(0, |max| max + 1);
        let pathname = blob_pathname(id, &cmd.file_name, content_type);

        // Validate the metadata before touching storage.
        let mut image = GalleryImage::new(
            id,
            &cmd.title,
            cmd.caption.as_deref(),
            String::new(),
            pathname.clone(),
            content_type,
            size_bytes,
            sort_order,
            Some(cmd.uploaded_by),
        )?;

        let blob = self
            .storage
            .put(&pathname, cmd.bytes, content_type.mime())
            .await?;
        image.url = blob.url.clone();
        image.pathname = blob.pathname.clone();

        if let Err(e) = self.gallery.save(&image).await {
            if let Err(cleanup) = self.storage.delete(&blob).await {
                tracing::warn!(pathname = %blob.pathname, error = %cleanup, "Orphaned blob after failed save");
            }
            return Err(e);
        }

        tracing::info!(
            image_id = %image.id,
            pathname = %image.pathname,
            size_bytes,
            "Gallery image uploaded"
        );
        Ok(image)
    }
}
