//! Blob storage adapters for gallery uploads.
//!
//! - `LocalBlobStorage` - files under a served directory
//! - `VercelBlobStorage` - Vercel Blob REST API
//! - `InMemoryBlobStorage` - tests

mod in_memory_blob_storage;
mod local_blob_storage;
mod vercel_blob_storage;

pub use in_memory_blob_storage::{InMemoryBlobStorage, StoredObject};
pub use local_blob_storage::LocalBlobStorage;
pub use vercel_blob_storage::VercelBlobStorage;

use crate::ports::StorageError;

/// Accepts relative `a/b/c.ext` paths made of plain segments.
pub(crate) fn checked_pathname(pathname: &str) -> Result<&str, StorageError> {
    let invalid = pathname.is_empty()
        || pathname.starts_with('/')
        || pathname.contains('\\')
        || pathname
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        return Err(StorageError::InvalidPath(pathname.to_string()));
    }
    Ok(pathname)
}
