//! Site content loaded from YAML.

mod yaml_site_content;

pub use yaml_site_content::{load_site_content, parse_site_content, SiteContentError};
