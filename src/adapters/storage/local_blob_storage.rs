//! Local filesystem blob storage.
//!
//! Writes gallery uploads under a root directory that the HTTP layer serves
//! as static files.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::ports::{BlobStorage, StorageError, StoredBlob};

use super::checked_pathname;

/// Local filesystem storage for gallery images.
///
/// # Directory Structure
///
/// ```text
/// {root}/
/// └── gallery/
///     ├── 2f1c...-sunset.jpg
///     └── 9a0b...-team-photo.png
/// ```
///
/// # Atomic Writes
///
/// Content goes to `{name}.tmp`, is synced, then renamed into place so a
/// crash never leaves a half-written image behind the public URL.
#[derive(Debug, Clone)]
pub struct LocalBlobStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn path_for(&self, pathname: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(checked_pathname(pathname)?))
    }

    fn url_for(&self, pathname: &str) -> String {
        format!("{}/{}", self.public_base_url, pathname)
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn put(
        &self,
        pathname: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<StoredBlob, StorageError> {
        let final_path = self.path_for(pathname)?;
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut temp_name = final_path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, &final_path).await?;

        tracing::debug!(path = %final_path.display(), size = bytes.len(), "Blob written");

        Ok(StoredBlob {
            url: self.url_for(pathname),
            pathname: pathname.to_string(),
        })
    }

    async fn delete(&self, blob: &StoredBlob) -> Result<(), StorageError> {
        let path = self.path_for(&blob.pathname)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Blob already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, LocalBlobStorage) {
        let dir = TempDir::new().unwrap();
        let storage = LocalBlobStorage::new(dir.path(), "/uploads/");
        (dir, storage)
    }

    #[tokio::test]
    async fn put_writes_file_and_returns_public_url() {
        let (dir, storage) = storage();
        let blob = storage
            .put("gallery/abc-sunset.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();

        assert_eq!(blob.url, "/uploads/gallery/abc-sunset.jpg");
        let written = std::fs::read(dir.path().join("gallery/abc-sunset.jpg")).unwrap();
        assert_eq!(written, vec![1, 2, 3]);
        assert!(!dir.path().join("gallery/abc-sunset.jpg.tmp").exists());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (dir, storage) = storage();
        let blob = storage
            .put("gallery/x.png", vec![9], "image/png")
            .await
            .unwrap();

        storage.delete(&blob).await.unwrap();
        assert!(!dir.path().join("gallery/x.png").exists());
        storage.delete(&blob).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_escaping_paths() {
        let (_dir, storage) = storage();
        let err = storage
            .put("../outside.jpg", vec![1], "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
    }
}
