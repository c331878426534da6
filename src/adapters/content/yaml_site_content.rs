//! Reads `SiteContent` from a YAML file at startup.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::content::SiteContent;
use crate::domain::foundation::ValidationError;

#[derive(Debug, Error)]
pub enum SiteContentError {
    #[error("cannot read site content from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("site content is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("site content is incomplete: {0}")]
    Invalid(#[from] ValidationError),
}

pub fn parse_site_content(yaml: &str) -> Result<SiteContent, SiteContentError> {
    let content: SiteContent = serde_yaml::from_str(yaml)?;
    content.validate()?;
    Ok(content)
}

/// Loads and validates the file. A missing file falls back to the built-in
/// placeholder content so a fresh checkout still serves pages.
pub async fn load_site_content(path: &Path) -> Result<SiteContent, SiteContentError> {
    match tokio::fs::read_to_string(path).await {
        Ok(yaml) => {
            let content = parse_site_content(&yaml)?;
            tracing::info!(path = %path.display(), faq_entries = content.faq.len(), "Site content loaded");
            Ok(content)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Site content file missing; using defaults");
            Ok(SiteContent::default())
        }
        Err(source) => Err(SiteContentError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
