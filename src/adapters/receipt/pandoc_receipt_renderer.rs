//! Pandoc-based receipt renderer.
//!
//! Pipes the receipt Markdown into `pandoc` and returns the PDF it writes to
//! stdout. Pandoc and a PDF engine must be installed on the host.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::ReceiptConfig;
use crate::domain::payment::Receipt;
use crate::ports::{ReceiptRenderer, RenderError};

/// Receipt renderer that shells out to Pandoc.
///
/// # Example
///
/// ```rust,ignore
/// let renderer = PandocReceiptRenderer::new("pandoc").with_timeout(30);
/// if renderer.is_available().await {
///     let pdf = renderer.render_pdf(&receipt).await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PandocReceiptRenderer {
    pandoc_path: String,
    pdf_engine: Option<String>,
    timeout_secs: u64,
}

impl PandocReceiptRenderer {
    pub fn new(pandoc_path: impl Into<String>) -> Self {
        Self {
            pandoc_path: pandoc_path.into(),
            pdf_engine: None,
            timeout_secs: 30,
        }
    }

    pub fn from_config(config: &ReceiptConfig) -> Self {
        Self {
            pandoc_path: config.pandoc_path.clone(),
            pdf_engine: config.pdf_engine.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn with_pdf_engine(mut self, engine: impl Into<String>) -> Self {
        self.pdf_engine = Some(engine.into());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Check if Pandoc is installed and accessible.
    pub async fn is_available(&self) -> bool {
        let output = Command::new(&self.pandoc_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await;

        output.map(|o| o.status.success()).unwrap_or(false)
    }

    fn args(&self, title: &str) -> Vec<String> {
        let mut args: Vec<String> = [
            "-f",
            "markdown",
            "-t",
            "pdf",
            "-o",
            "-",
            "-V",
            "geometry:margin=1in",
            "-V",
            "fontsize=11pt",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push("-M".to_string());
        args.push(format!("pagetitle={}", title));
        if let Some(engine) = &self.pdf_engine {
            args.push(format!("--pdf-engine={}", engine));
        }
        args
    }
}

#[async_trait]
impl ReceiptRenderer for PandocReceiptRenderer {
    async fn render_pdf(&self, receipt: &Receipt) -> Result<Vec<u8>, RenderError> {
        let markdown = receipt.to_markdown();

        let mut child = Command::new(&self.pandoc_path)
            .args(self.args(&format!("Receipt {}", receipt.number)))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => RenderError::Unavailable(format!(
                    "Pandoc not found at '{}'",
                    self.pandoc_path
                )),
                _ => RenderError::Failed(format!("Failed to start Pandoc: {}", e)),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(markdown.as_bytes())
                .await
                .map_err(|e| RenderError::Failed(format!("Failed to write to Pandoc: {}", e)))?;
        }

        let output = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| {
            tracing::warn!(receipt = %receipt.number, timeout_secs = self.timeout_secs, "Pandoc timed out");
            RenderError::Timeout(self.timeout_secs)
        })?
        .map_err(|e| RenderError::Failed(format!("Pandoc execution failed: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(receipt = %receipt.number, stderr = %stderr.trim(), "Pandoc failed");
            return Err(RenderError::Failed(format!(
                "Pandoc returned error: {}",
                stderr.trim()
            )));
        }

        tracing::debug!(receipt = %receipt.number, bytes = output.stdout.len(), "Receipt rendered with Pandoc");
        Ok(output.stdout)
    }
}
