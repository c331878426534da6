//! Vercel Blob storage adapter.
//!
//! Uploads with `PUT {api}/{pathname}` and deletes with `POST {api}/delete`,
//! authenticated by a read-write token.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::ports::{BlobStorage, StorageError, StoredBlob};

use super::checked_pathname;

const API_VERSION: &str = "7";

pub struct VercelBlobStorage {
    token: SecretString,
    api_url: String,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    url: String,
    pathname: String,
}

impl VercelBlobStorage {
    pub fn new(token: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }

    async fn failure(operation: &str, response: reqwest::Response) -> StorageError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(operation, status = status.as_u16(), body = %body, "Vercel Blob request failed");
        StorageError::Backend(format!("{} failed with status {}", operation, status))
    }
}

#[async_trait]
impl BlobStorage for VercelBlobStorage {
    async fn put(
        &self,
        pathname: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredBlob, StorageError> {
        let pathname = checked_pathname(pathname)?;
        let url = format!("{}/{}", self.api_url, pathname);

        let response = self
            .http_client
            .put(&url)
            .header("authorization", self.bearer())
            .header("x-api-version", API_VERSION)
            .header("x-content-type", content_type)
            .header("x-add-random-suffix", "0")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::failure("put", response).await);
        }

        let stored: PutResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Backend(format!("invalid upload response: {}", e)))?;

        Ok(StoredBlob {
            url: stored.url,
            pathname: stored.pathname,
        })
    }

    async fn delete(&self, blob: &StoredBlob) -> Result<(), StorageError> {
        let response = self
            .http_client
            .post(format!("{}/delete", self.api_url))
            .header("authorization", self.bearer())
            .header("x-api-version", API_VERSION)
            .json(&serde_json::json!({ "urls": [blob.url] }))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::failure("delete", response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_rejects_bad_pathname_before_network() {
        let storage = VercelBlobStorage::new("token", "http://127.0.0.1:9");
        let err = storage.put("/etc/passwd", vec![1], "image/png").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_backend_error() {
        let storage = VercelBlobStorage::new("token", "http://127.0.0.1:9");
        let err = storage
            .put("gallery/a.png", vec![1], "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)));
    }
}
