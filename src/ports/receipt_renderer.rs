//! Receipt rendering port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::payment::Receipt;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer not available: {0}")]
    Unavailable(String),

    #[error("rendering failed: {0}")]
    Failed(String),

    #[error("rendering timed out after {0} seconds")]
    Timeout(u64),
}

impl From<RenderError> for DomainError {
    fn from(err: RenderError) -> Self {
        DomainError::new(ErrorCode::RenderError, err.to_string())
    }
}

/// Turns a receipt into a downloadable PDF.
#[async_trait]
pub trait ReceiptRenderer: Send + Sync {
    async fn render_pdf(&self, receipt: &Receipt) -> Result<Vec<u8>, RenderError>;
}
