use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::{timeout, timeout_at, Instant};

use crate::app::{FetchFailure, ItemError};
use crate::config::RunConfig;
use crate::domain::{Chapter, FeedItem, RawPage};
use crate::fetcher::Fetcher;
use crate::sanitizer::ContentSanitizer;

pub type ItemResult = Result<Chapter, ItemError>;

/// Resolves feed items into chapters with a bounded number of concurrent
/// fetches.
pub struct ParallelResolver {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    sanitizer: Arc<ContentSanitizer>,
    semaphore: Arc<Semaphore>,
    item_timeout: Duration,
}

impl ParallelResolver {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        sanitizer: Arc<ContentSanitizer>,
        config: &RunConfig,
    ) -> Self {
        Self {
            fetcher,
            sanitizer,
            semaphore: Arc::new(Semaphore::new(config.workers)),
            item_timeout: config.item_timeout,
        }
    }

    /// Resolve every item. The returned vector is index-addressed: slot `i`
    /// holds the outcome for `items[i]`, whatever order tasks finished in.
    ///
    /// Items still outstanding at `deadline` are aborted and reported as
    /// [`ItemError::DeadlineExceeded`].
    pub async fn resolve_all(&self, items: &[FeedItem], deadline: Instant) -> Vec<ItemResult> {
        let mut handles = Vec::with_capacity(items.len());

        for item in items {
            let fetcher = self.fetcher.clone();
            let sanitizer = self.sanitizer.clone();
            let semaphore = self.semaphore.clone();
            let item_timeout = self.item_timeout;
            let item = item.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return Err(ItemError::TaskFailed("worker pool closed".into()));
                };

                resolve_item(fetcher.as_ref(), &sanitizer, &item, item_timeout).await
            });

            handles.push(handle);
        }

        let mut results = Vec::with_capacity(items.len());
        for (item, mut handle) in items.iter().zip(handles) {
            let result = match timeout_at(deadline, &mut handle).await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    tracing::error!("Task join error: {}", e);
                    Err(ItemError::TaskFailed(e.to_string()))
                }
                Err(_) => {
                    handle.abort();
                    Err(ItemError::DeadlineExceeded)
                }
            };

            match &result {
                Ok(chapter) => tracing::info!("Resolved '{}' as {}", item.title, chapter.id),
                Err(e) => tracing::warn!("Skipping '{}' ({}): {}", item.title, item.link, e),
            }
            results.push(result);
        }

        results
    }
}

/// Fetch and sanitize one item.
pub async fn resolve_item(
    fetcher: &(dyn Fetcher + Send + Sync),
    sanitizer: &ContentSanitizer,
    item: &FeedItem,
    item_timeout: Duration,
) -> ItemResult {
    let fetched = match timeout(item_timeout, fetcher.fetch(&item.link)).await {
        Ok(result) => result?,
        Err(_) => return Err(FetchFailure::Timeout.into()),
    };

    let page = RawPage::new(fetched.final_url, fetched.body).with_charset(fetched.charset);
    sanitizer.chapter(item, &page)
}

#[cfg(test)]
pub(crate) mod tests {
    use url::Url;

    use super::*;
    use crate::fetcher::scripted::ScriptedFetcher;
    use crate::sanitizer::SanitizerConfig;

    pub(crate) fn article(title: &str) -> String {
        format!(
            "<html><body><nav><a href=\"/\">Home</a></nav><article><h1>{title}</h1>\
             <p>{title} opens with a paragraph long enough to be treated as real prose by the extractor.</p>\
             <p>A second paragraph follows, adding more sentences so the density score is comfortably positive.</p>\
             </article></body></html>"
        )
    }

    fn items(n: usize) -> Vec<FeedItem> {
        (0..n)
            .map(|i| {
                let link = Url::parse(&format!("https://example.com/{i}")).unwrap();
                FeedItem::new(i, format!("Item {i}"), link, format!("g{i}"))
            })
            .collect()
    }

    fn resolver(fetcher: ScriptedFetcher, workers: usize, item_timeout: Duration) -> (ParallelResolver, Arc<ScriptedFetcher>) {
        let fetcher = Arc::new(fetcher);
        let mut config = RunConfig::for_tests("https://example.com/feed.xml", 10);
        config.workers = workers;
        config.item_timeout = item_timeout;
        let sanitizer = Arc::new(ContentSanitizer::new(&SanitizerConfig::lenient()));
        (ParallelResolver::new(fetcher.clone(), sanitizer, &config), fetcher)
    }

    #[tokio::test]
    async fn test_results_follow_feed_order_not_completion_order() {
        let fetcher = ScriptedFetcher::new()
            .slow("https://example.com/0", &article("Item 0"), Duration::from_millis(150))
            .slow("https://example.com/1", &article("Item 1"), Duration::from_millis(75))
            .page("https://example.com/2", &article("Item 2"));
        let (resolver, _) = resolver(fetcher, 3, Duration::from_secs(5));

        let results = resolver.resolve_all(&items(3), Instant::now() + Duration::from_secs(10)).await;
        let orders: Vec<_> = results.iter().map(|r| r.as_ref().unwrap().order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_worker_cap_is_enforced() {
        let mut fetcher = ScriptedFetcher::new();
        for i in 0..8 {
            fetcher = fetcher.slow(&format!("https://example.com/{i}"), &article("x"), Duration::from_millis(30));
        }
        let (resolver, fetcher) = resolver(fetcher, 2, Duration::from_secs(5));

        let results = resolver.resolve_all(&items(8), Instant::now() + Duration::from_secs(10)).await;
        assert!(results.iter().all(Result::is_ok));
        assert!(fetcher.peak_concurrency() <= 2);
        assert!(fetcher.peak_concurrency() >= 1);
    }

    #[tokio::test]
    async fn test_failures_are_per_item() {
        let fetcher = ScriptedFetcher::new()
            .page("https://example.com/0", &article("Item 0"))
            .failure("https://example.com/1", FetchFailure::Status(500))
            .page("https://example.com/2", "<html><body><p>tiny</p></body></html>");
        let (resolver, _) = resolver(fetcher, 4, Duration::from_secs(5));

        let results = resolver.resolve_all(&items(3), Instant::now() + Duration::from_secs(10)).await;
        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(ItemError::Fetch(FetchFailure::Status(500))));
        assert!(matches!(results[2], Err(ItemError::Extraction(_))));
    }

    #[tokio::test]
    async fn test_item_timeout() {
        let fetcher = ScriptedFetcher::new()
            .page("https://example.com/0", &article("Item 0"))
            .slow("https://example.com/1", &article("Item 1"), Duration::from_secs(5));
        let (resolver, _) = resolver(fetcher, 4, Duration::from_millis(100));

        let results = resolver.resolve_all(&items(2), Instant::now() + Duration::from_secs(10)).await;
        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(ItemError::Fetch(FetchFailure::Timeout)));
    }

    #[tokio::test]
    async fn test_deadline_abandons_outstanding_items() {
        let fetcher = ScriptedFetcher::new()
            .page("https://example.com/0", &article("Item 0"))
            .slow("https://example.com/1", &article("Item 1"), Duration::from_secs(5))
            .page("https://example.com/2", &article("Item 2"));
        let (resolver, _) = resolver(fetcher, 4, Duration::from_secs(30));

        let results = resolver.resolve_all(&items(3), Instant::now() + Duration::from_millis(300)).await;
        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(ItemError::DeadlineExceeded));
        assert!(results[2].is_ok());
    }

    #[tokio::test]
    async fn test_redirect_target_is_base_for_links() {
        let body = "<html><body><article><p>Redirected articles keep working links like <a href=\"next\">this one</a> inside the text body.</p>\
                    <p>Another paragraph so there is enough readable text to pass the lenient threshold here.</p></article></body></html>";
        let fetcher = ScriptedFetcher::new().redirected("https://example.com/0", "https://mirror.example.net/posts/0", body);
        let (resolver, _) = resolver(fetcher, 1, Duration::from_secs(5));

        let results = resolver.resolve_all(&items(1), Instant::now() + Duration::from_secs(10)).await;
        let chapter = results[0].as_ref().unwrap();
        assert!(chapter.body.contains("href=\"https://mirror.example.net/posts/next\""));
    }
}
