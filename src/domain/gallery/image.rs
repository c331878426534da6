//! Gallery images and upload rules.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    optional_text, required_text, AdminUserId, GalleryImageId, Timestamp, ValidationError,
};

pub const MAX_IMAGE_TITLE_LEN: usize = 200;
pub const MAX_CAPTION_LEN: usize = 1000;
const MAX_FILE_STEM_LEN: usize = 80;

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageContentType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    Webp,
    #[serde(rename = "image/gif")]
    Gif,
}

impl ImageContentType {
    /// Parses a MIME type, ignoring parameters and case.
    pub fn from_mime(mime: &str) -> Result<Self, ValidationError> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            "image/webp" => Ok(Self::Webp),
            "image/gif" => Ok(Self::Gif),
            _ => Err(ValidationError::invalid_format(
                "file",
                "only JPEG, PNG, WebP and GIF images are accepted",
            )),
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }
}

/// Reduces an uploaded file name to `[a-z0-9-]` and swaps in the canonical
/// extension for `content_type`.
pub fn sanitize_file_name(original: &str, content_type: ImageContentType) -> String {
    // Drop any client-side directory components.
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };

    let mut cleaned = String::with_capacity(stem.len());
    let mut last_dash = true;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            cleaned.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            cleaned.push('-');
            last_dash = true;
        }
        if cleaned.len() >= MAX_FILE_STEM_LEN {
            break;
        }
    }
    let cleaned = cleaned.trim_matches('-');
    let stem = if cleaned.is_empty() { "image" } else { cleaned };
    format!("{}.{}", stem, content_type.extension())
}

/// Blob path for an image: `gallery/{id}-{sanitized name}`.
pub fn blob_pathname(
    id: GalleryImageId,
    original_name: &str,
    content_type: ImageContentType,
) -> String {
    format!(
        "gallery/{}-{}",
        id,
        sanitize_file_name(original_name, content_type)
    )
}

/// Uploaded gallery photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub id: GalleryImageId,
    pub title: String,
    pub caption: Option<String>,
    pub url: String,
    pub pathname: String,
    pub content_type: ImageContentType,
    pub size_bytes: u64,
    pub sort_order: i32,
    pub uploaded_by: Option<AdminUserId>,
    pub created_at: Timestamp,
}

impl GalleryImage {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: GalleryImageId,
        title: &str,
        caption: Option<&str>,
        url: String,
        pathname: String,
        content_type: ImageContentType,
        size_bytes: u64,
        sort_order: i32,
        uploaded_by: Option<AdminUserId>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            title: required_text("title", title, MAX_IMAGE_TITLE_LEN)?,
            caption: optional_text("caption", caption, MAX_CAPTION_LEN)?,
            url,
            pathname,
            content_type,
            size_bytes,
            sort_order,
            uploaded_by,
            created_at: Timestamp::now(),
        })
    }

    /// Partial update; `Some("")` clears the caption.
    pub fn update(
        &mut self,
        title: Option<&str>,
        caption: Option<&str>,
        sort_order: Option<i32>,
    ) -> Result<(), ValidationError> {
        if let Some(title) = title {
            self.title = required_text("title", title, MAX_IMAGE_TITLE_LEN)?;
        }
        if caption.is_some() {
            self.caption = optional_text("caption", caption, MAX_CAPTION_LEN)?;
        }
        if let Some(order) = sort_order {
            self.sort_order = order;
        }
        Ok(())
    }
}

/// Validates an upload against the size limit.
pub fn validate_upload_size(size_bytes: u64, max_bytes: u64) -> Result<(), ValidationError> {
    if size_bytes == 0 {
        return Err(ValidationError::empty_field("file"));
    }
    if size_bytes > max_bytes {
        return Err(ValidationError::invalid_format(
            "file",
            format!("image exceeds the {} byte limit", max_bytes),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_accepts_common_images() {
        assert_eq!(ImageContentType::from_mime("image/JPEG").unwrap(), ImageContentType::Jpeg);
        assert_eq!(ImageContentType::from_mime("image/png; q=1").unwrap(), ImageContentType::Png);
        assert!(ImageContentType::from_mime("application/pdf").is_err());
        assert!(ImageContentType::from_mime("image/svg+xml").is_err());
    }

    #[test]
    fn sanitize_strips_paths_and_symbols() {
        assert_eq!(
            sanitize_file_name("../../etc/My Photo (1).JPG", ImageContentType::Jpeg),
            "my-photo-1.jpg"
        );
        assert_eq!(
            sanitize_file_name("C:\\Users\\me\\pic.jpeg", ImageContentType::Jpeg),
            "pic.jpg"
        );
    }

    #[test]
    fn sanitize_falls_back_for_empty_stems() {
        assert_eq!(sanitize_file_name("!!!.png", ImageContentType::Png), "image.png");
        assert_eq!(sanitize_file_name("", ImageContentType::Gif), "image.gif");
        assert_eq!(sanitize_file_name(".hidden", ImageContentType::Webp), "hidden.webp");
    }

    #[test]
    fn pathname_is_prefixed_with_id() {
        let id = GalleryImageId::new();
        let path = blob_pathname(id, "Sunset.png", ImageContentType::Png);
        assert_eq!(path, format!("gallery/{}-sunset.png", id));
    }

    #[test]
    fn upload_size_is_bounded() {
        assert!(validate_upload_size(0, 10).is_err());
        assert!(validate_upload_size(11, 10).is_err());
        assert!(validate_upload_size(10, 10).is_ok());
    }

    #[test]
    fn update_clears_caption_on_blank() {
        let mut image = GalleryImage::new(
            GalleryImageId::new(),
            "Dinner",
            Some("Annual dinner"),
            "https://blob/x.jpg".into(),
            "gallery/x.jpg".into(),
            ImageContentType::Jpeg,
            10,
            0,
            None,
        )
        .unwrap();
        image.update(None, Some(""), Some(3)).unwrap();
        assert_eq!(image.caption, None);
        assert_eq!(image.sort_order, 3);
    }
}
