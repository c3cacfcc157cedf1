//! Canned-response fetcher for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::app::FetchFailure;
use crate::fetcher::{FetchOutcome, FetchedBody, Fetcher};

#[derive(Clone)]
enum Script {
    Page { body: String, final_url: Option<String> },
    Failure(FetchFailure),
    Slow { body: String, delay: Duration },
}

#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: HashMap<String, Script>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.scripts.insert(
            url.to_string(),
            Script::Page {
                body: body.to_string(),
                final_url: None,
            },
        );
        self
    }

    pub fn redirected(mut self, url: &str, final_url: &str, body: &str) -> Self {
        self.scripts.insert(
            url.to_string(),
            Script::Page {
                body: body.to_string(),
                final_url: Some(final_url.to_string()),
            },
        );
        self
    }

    pub fn failure(mut self, url: &str, failure: FetchFailure) -> Self {
        self.scripts.insert(url.to_string(), Script::Failure(failure));
        self
    }

    pub fn slow(mut self, url: &str, body: &str, delay: Duration) -> Self {
        self.scripts.insert(
            url.to_string(),
            Script::Slow {
                body: body.to_string(),
                delay,
            },
        );
        self
    }

    /// Highest number of fetches observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        // Yield so concurrent tasks overlap even for instant responses.
        tokio::time::sleep(Duration::from_millis(5)).await;

        let script = self.scripts.get(url.as_str()).cloned();
        let outcome = match script {
            Some(Script::Page { body, final_url }) => {
                let final_url = final_url
                    .and_then(|u| Url::parse(&u).ok())
                    .unwrap_or_else(|| url.clone());
                Ok(FetchedBody {
                    final_url,
                    body: body.into_bytes(),
                    charset: None,
                })
            }
            Some(Script::Slow { body, delay }) => {
                tokio::time::sleep(delay).await;
                Ok(FetchedBody {
                    final_url: url.clone(),
                    body: body.into_bytes(),
                    charset: None,
                })
            }
            Some(Script::Failure(failure)) => Err(failure),
            None => Err(FetchFailure::Status(404)),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}
