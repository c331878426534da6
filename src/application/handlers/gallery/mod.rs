//! Gallery handlers: public listing and back-office upload, edit, delete.

mod manage;
mod upload;

pub use manage::{DeleteImageHandler, ListImagesHandler, UpdateImageCommand, UpdateImageHandler};
pub use upload::{UploadImageCommand, UploadImageHandler};
