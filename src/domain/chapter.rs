use url::Url;

use crate::domain::FeedItem;

/// A successfully resolved item, ready to be packaged.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    /// Sanitized XHTML fragment.
    pub body: String,
    /// Position of the originating feed item.
    pub order: usize,
    pub source_url: Url,
    pub guid: String,
    /// Body references images by remote URL.
    pub has_remote_resources: bool,
}

impl Chapter {
    pub fn from_item(item: &FeedItem, body: String, has_remote_resources: bool) -> Self {
        Self {
            id: item.chapter_id(),
            title: item.title.clone(),
            body,
            order: item.position,
            source_url: item.link.clone(),
            guid: item.guid.clone(),
            has_remote_resources,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.xhtml", self.id)
    }
}
