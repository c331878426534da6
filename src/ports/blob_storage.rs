//! Blob storage port for gallery uploads.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// A stored object: public URL plus the pathname it was stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub url: String,
    pub pathname: String,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid blob path: {0}")]
    InvalidPath(String),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage backend failed: {0}")]
    Backend(String),
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        DomainError::new(ErrorCode::StorageError, err.to_string())
    }
}

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Stores `bytes` at `pathname`, replacing any existing object.
    async fn put(
        &self,
        pathname: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredBlob, StorageError>;

    /// Deletes the object. A missing object is not an error.
    async fn delete(&self, blob: &StoredBlob) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_storage_is_object_safe() {
        fn _accepts_dyn(_storage: &dyn BlobStorage) {}
    }
}
