use url::Url;

use crate::app::{LaterError, Result};
use crate::config::RunConfig;
use crate::domain::FeedItem;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;

/// Retrieves the read-later feed and turns it into ordered items.
pub struct FeedFetcher<'a> {
    fetcher: &'a (dyn Fetcher + Send + Sync),
    normalizer: &'a Normalizer,
}

impl<'a> FeedFetcher<'a> {
    pub fn new(fetcher: &'a (dyn Fetcher + Send + Sync), normalizer: &'a Normalizer) -> Self {
        Self {
            fetcher,
            normalizer,
        }
    }

    /// Fetch the feed at `config.url` and return at most `config.max_items`
    /// items in document order. Any failure here is fatal for the run.
    pub async fn fetch_items(&self, config: &RunConfig) -> Result<Vec<FeedItem>> {
        tracing::info!("Fetching feed from {}", config.url);

        let fetched = self
            .fetcher
            .fetch(&config.url)
            .await
            .map_err(|source| LaterError::Fetch {
                url: config.url.to_string(),
                source,
            })?;

        let items = self.normalizer.normalize(&fetched.final_url, &fetched.body, config.max_items)?;
        tracing::info!("Found {} items", items.len());
        Ok(items)
    }
}

/// Parse a user-supplied feed URL, accepting only http(s).
pub fn parse_feed_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LaterError::Config(format!(
            "Unsupported feed URL scheme '{}': {}",
            other, raw
        ))),
    }
}
