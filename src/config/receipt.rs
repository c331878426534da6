//! Receipt rendering configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptRendererKind {
    /// Pandoc when the binary is installed, otherwise the builtin writer
    #[default]
    Auto,
    Pandoc,
    Builtin,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptConfig {
    #[serde(default)]
    pub renderer: ReceiptRendererKind,

    #[serde(default = "default_pandoc_path")]
    pub pandoc_path: String,

    /// PDF engine passed to pandoc (`--pdf-engine`)
    pub pdf_engine: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ReceiptConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            renderer: ReceiptRendererKind::default(),
            pandoc_path: default_pandoc_path(),
            pdf_engine: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_pandoc_path() -> String {
    "pandoc".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
