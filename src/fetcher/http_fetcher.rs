use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::Client;
use url::Url;

use crate::app::{FetchFailure, LaterError, Result};
use crate::fetcher::{FetchOutcome, FetchedBody, Fetcher};

const MAX_REDIRECTS: usize = 10;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent)
            .build()
            .map_err(|e| LaterError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        let response = self.client.get(url.clone()).send().await?;

        response.error_for_status_ref()?;

        let final_url = response.url().clone();
        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_param);
        let body = response.bytes().await?.to_vec();

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(FetchFailure::EmptyBody);
        }

        tracing::debug!("Fetched {} bytes from {}", body.len(), final_url);
        Ok(FetchedBody {
            final_url,
            body,
            charset,
        })
    }
}

/// The `charset` parameter of a `Content-Type` value.
fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        let value = value.trim().trim_matches('"');
        (key.trim().eq_ignore_ascii_case("charset") && !value.is_empty()).then(|| value.to_string())
    })
}
