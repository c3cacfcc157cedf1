pub mod feed;
pub mod http_fetcher;
pub mod parallel;

use async_trait::async_trait;
use url::Url;

use crate::app::FetchFailure;

/// A successful HTTP retrieval.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// URL the body was served from, after redirects.
    pub final_url: Url,
    pub body: Vec<u8>,
    /// `charset` parameter of the `Content-Type` header.
    pub charset: Option<String>,
}

pub type FetchOutcome = std::result::Result<FetchedBody, FetchFailure>;

#[async_trait]
pub trait Fetcher {
    /// Retrieve `url`, following redirects. Non-success statuses and empty
    /// bodies are failures.
    async fn fetch(&self, url: &Url) -> FetchOutcome;
}

#[cfg(test)]
pub(crate) mod scripted;
