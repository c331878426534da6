//! Site content configuration

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// YAML file holding home/about/FAQ/contact content
    #[serde(default = "default_site_path")]
    pub site_path: PathBuf,

    /// Directory served as the public site root, if any
    pub static_dir: Option<PathBuf>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            site_path: default_site_path(),
            static_dir: None,
        }
    }
}

fn default_site_path() -> PathBuf {
    PathBuf::from("content/site.yaml")
}
