//! In-memory blob storage for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{BlobStorage, StorageError, StoredBlob};

use super::checked_pathname;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryBlobStorage {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl InMemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, pathname: &str) -> Option<StoredObject> {
        self.objects.read().await.get(pathname).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn put(
        &self,
        pathname: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredBlob, StorageError> {
        let pathname = checked_pathname(pathname)?;
        self.objects.write().await.insert(
            pathname.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(StoredBlob {
            url: format!("memory://{}", pathname),
            pathname: pathname.to_string(),
        })
    }

    async fn delete(&self, blob: &StoredBlob) -> Result<(), StorageError> {
        self.objects.write().await.remove(&blob.pathname);
        Ok(())
    }
}
