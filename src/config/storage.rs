//! Blob storage configuration for gallery uploads

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

const MAX_ALLOWED_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    Vercel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the local backend
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,

    /// URL prefix the local directory is served under
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Vercel Blob read-write token
    pub vercel_token: Option<String>,

    #[serde(default = "default_vercel_api_url")]
    pub vercel_api_url: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_upload_bytes == 0 || self.max_upload_bytes > MAX_ALLOWED_UPLOAD_BYTES {
            return Err(ValidationError::InvalidUploadLimit);
        }
        if self.backend == StorageBackend::Vercel
            && self.vercel_token.as_deref().map_or(true, str::is_empty)
        {
            return Err(ValidationError::MissingRequired("STORAGE__VERCEL_TOKEN"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            local_dir: default_local_dir(),
            public_base_url: default_public_base_url(),
            vercel_token: None,
            vercel_api_url: default_vercel_api_url(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_local_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_public_base_url() -> String {
    "/uploads".to_string()
}

fn default_vercel_api_url() -> String {
    "https://blob.vercel-storage.com".to_string()
}

fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024
}
