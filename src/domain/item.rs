use chrono::{DateTime, Utc};
use url::Url;

/// One entry of the read-later feed, in feed order.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub title: String,
    pub link: Url,
    pub published_at: Option<DateTime<Utc>>,
    pub guid: String,
    /// Zero-based position in the (truncated) feed.
    pub position: usize,
}

impl FeedItem {
    pub fn new(position: usize, title: impl Into<String>, link: Url, guid: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link,
            published_at: None,
            guid: guid.into(),
            position,
        }
    }

    /// Stable chapter id for this item. Derived from the position so ids are
    /// unique within a run and valid XML names.
    pub fn chapter_id(&self) -> String {
        chapter_id(self.position)
    }
}

pub fn chapter_id(position: usize) -> String {
    format!("chapter-{:03}", position + 1)
}
