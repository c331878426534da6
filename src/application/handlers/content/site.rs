//! GetSiteContentHandler - Serves the content loaded at startup.

use std::sync::Arc;

use crate::domain::content::SiteContent;

#[derive(Clone)]
pub struct GetSiteContentHandler {
    content: Arc<SiteContent>,
}

impl GetSiteContentHandler {
    pub fn new(content: Arc<SiteContent>) -> Self {
        Self { content }
    }

    pub fn handle(&self) -> Arc<SiteContent> {
        Arc::clone(&self.content)
    }
}
