//! PostgreSQL implementation of GalleryRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{AdminUserId, DomainError, ErrorCode, GalleryImageId, Timestamp};
use crate::domain::gallery::{GalleryImage, ImageContentType};
use crate::ports::GalleryRepository;

use super::{corrupt, db_error};

pub struct PostgresGalleryRepository {
    pool: PgPool,
}

impl PostgresGalleryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GalleryImageRow {
    id: Uuid,
    title: String,
    caption: Option<String>,
    url: String,
    pathname: String,
    content_type: String,
    size_bytes: i64,
    sort_order: i32,
    uploaded_by: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<GalleryImageRow> for GalleryImage {
    type Error = DomainError;

    fn try_from(row: GalleryImageRow) -> Result<Self, Self::Error> {
        Ok(GalleryImage {
            id: GalleryImageId::from_uuid(row.id),
            title: row.title,
            caption: row.caption,
            url: row.url,
            pathname: row.pathname,
            content_type: ImageContentType::from_mime(&row.content_type)
                .map_err(|_| corrupt("content_type", &row.content_type))?,
            size_bytes: u64::try_from(row.size_bytes)
                .map_err(|_| corrupt("size_bytes", row.size_bytes))?,
            sort_order: row.sort_order,
            uploaded_by: row.uploaded_by.map(AdminUserId::from_uuid),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

const SELECT_IMAGE: &str = r#"
    SELECT id, title, caption, url, pathname, content_type, size_bytes, sort_order,
           uploaded_by, created_at
    FROM gallery_images
"#;

fn not_found() -> DomainError {
    DomainError::new(ErrorCode::GalleryImageNotFound, "Gallery image not found")
}

#[async_trait]
impl GalleryRepository for PostgresGalleryRepository {
    async fn save(&self, image: &GalleryImage) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO gallery_images (
                id, title, caption, url, pathname, content_type, size_bytes, sort_order,
                uploaded_by, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(image.id.as_uuid())
        .bind(&image.title)
        .bind(&image.caption)
        .bind(&image.url)
        .bind(&image.pathname)
        .bind(image.content_type.mime())
        .bind(image.size_bytes as i64)
        .bind(image.sort_order)
        .bind(image.uploaded_by.map(|id| *id.as_uuid()))
        .bind(image.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save gallery image", e))?;
        Ok(())
    }

    async fn update(&self, image: &GalleryImage) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE gallery_images SET title = $2, caption = $3, sort_order = $4 WHERE id = $1",
        )
        .bind(image.id.as_uuid())
        .bind(&image.title)
        .bind(&image.caption)
        .bind(image.sort_order)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update gallery image", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &GalleryImageId) -> Result<Option<GalleryImage>, DomainError> {
        let row: Option<GalleryImageRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_IMAGE))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to fetch gallery image", e))?;
        row.map(GalleryImage::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<GalleryImage>, DomainError> {
        let rows: Vec<GalleryImageRow> = sqlx::query_as(&format!(
            "{} ORDER BY sort_order ASC, created_at DESC",
            SELECT_IMAGE
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list gallery images", e))?;
        rows.into_iter().map(GalleryImage::try_from).collect()
    }

    async fn max_sort_order(&self) -> Result<Option<i32>, DomainError> {
        sqlx::query_scalar::<_, Option<i32>>("SELECT MAX(sort_order) FROM gallery_images")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to read gallery order", e))
    }

    async fn delete(&self, id: &GalleryImageId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM gallery_images WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete gallery image", e))?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }
}
