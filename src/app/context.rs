use std::sync::Arc;

use crate::app::error::Result;
use crate::config::RunConfig;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::ParallelResolver;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::sanitizer::ContentSanitizer;

pub struct AppContext {
    pub config: Arc<RunConfig>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub resolver: ParallelResolver,
    pub normalizer: Normalizer,
}

impl AppContext {
    pub fn new(config: RunConfig) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::new(&config.user_agent, config.item_timeout)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Wire the components around an existing fetcher.
    pub fn with_fetcher(config: RunConfig, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        let sanitizer = Arc::new(ContentSanitizer::new(&config.sanitizer));
        let resolver = ParallelResolver::new(fetcher.clone(), sanitizer, &config);

        Self {
            config: Arc::new(config),
            fetcher,
            resolver,
            normalizer: Normalizer::new(),
        }
    }
}
