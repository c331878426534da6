//! Receipt rendering adapters.
//!
//! - `PandocReceiptRenderer` - Markdown to PDF through Pandoc
//! - `BuiltinPdfRenderer` - pure Rust single-page writer

mod builtin_pdf_renderer;
mod pandoc_receipt_renderer;

pub use builtin_pdf_renderer::BuiltinPdfRenderer;
pub use pandoc_receipt_renderer::PandocReceiptRenderer;

use std::sync::Arc;

use crate::config::{ReceiptConfig, ReceiptRendererKind};
use crate::ports::ReceiptRenderer;

/// Picks the renderer for `config`. `Auto` probes Pandoc once.
pub async fn select_renderer(config: &ReceiptConfig) -> Arc<dyn ReceiptRenderer> {
    match config.renderer {
        ReceiptRendererKind::Builtin => Arc::new(BuiltinPdfRenderer::new()),
        ReceiptRendererKind::Pandoc => Arc::new(PandocReceiptRenderer::from_config(config)),
        ReceiptRendererKind::Auto => {
            let pandoc = PandocReceiptRenderer::from_config(config);
            if pandoc.is_available().await {
                tracing::info!(pandoc = %config.pandoc_path, "Receipts rendered with Pandoc");
                Arc::new(pandoc)
            } else {
                tracing::info!("Pandoc not found; receipts rendered with the builtin PDF writer");
                Arc::new(BuiltinPdfRenderer::new())
            }
        }
    }
}
