//! Photo gallery.

mod image;

pub use image::{
    blob_pathname, sanitize_file_name, validate_upload_size, GalleryImage, ImageContentType,
    MAX_CAPTION_LEN, MAX_IMAGE_TITLE_LEN,
};
