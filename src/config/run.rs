use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use url::Url;

use crate::app::{LaterError, Result};
use crate::config::Config;
use crate::sanitizer::SanitizerConfig;

/// Everything one run needs, fixed before the first request is made.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub url: Url,
    pub max_items: usize,
    pub user_agent: String,
    pub workers: usize,
    pub item_timeout: Duration,
    pub deadline: Duration,
    pub output: PathBuf,
    pub title: String,
    pub language: String,
    pub sanitizer: SanitizerConfig,
    /// Run timestamp. Also seeds the book identifier.
    pub started_at: DateTime<Utc>,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_items: Option<usize>,
    pub user_agent: Option<String>,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub deadline_secs: Option<u64>,
    pub output: Option<PathBuf>,
    pub title: Option<String>,
}

impl RunConfig {
    pub fn resolve(url: Url, config: Config, overrides: Overrides, started_at: DateTime<Utc>) -> Result<Self> {
        let fetch = config.fetch;

        let workers = overrides.workers.unwrap_or(fetch.workers);
        if workers == 0 {
            return Err(LaterError::Config("workers must be at least 1".into()));
        }

        let timeout_secs = overrides.timeout_secs.unwrap_or(fetch.timeout_secs);
        if timeout_secs == 0 {
            return Err(LaterError::Config("timeout must be at least 1 second".into()));
        }

        let title = overrides
            .title
            .or(config.book.title)
            .unwrap_or_else(|| default_title(&started_at));

        Ok(Self {
            url,
            max_items: overrides.max_items.unwrap_or(fetch.max_items),
            user_agent: overrides.user_agent.unwrap_or(fetch.user_agent),
            workers,
            item_timeout: Duration::from_secs(timeout_secs),
            deadline: Duration::from_secs(overrides.deadline_secs.unwrap_or(fetch.deadline_secs)),
            output: overrides.output.unwrap_or_else(|| default_output(&started_at)),
            title,
            language: config.book.language,
            sanitizer: config.sanitizer,
            started_at,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests(url: &str, max_items: usize) -> Self {
        use chrono::TimeZone;

        Self {
            url: Url::parse(url).expect("test URL"),
            max_items,
            user_agent: "laterpress-tests".to_string(),
            workers: 4,
            item_timeout: Duration::from_secs(5),
            deadline: Duration::from_secs(10),
            output: PathBuf::from("test.epub"),
            title: "Test Book".to_string(),
            language: "en".to_string(),
            sanitizer: SanitizerConfig::lenient(),
            started_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }
}

pub fn default_title(started_at: &DateTime<Utc>) -> String {
    format!("Read Later Articles - {}", started_at.format("%Y-%m-%d"))
}

pub fn default_output(started_at: &DateTime<Utc>) -> PathBuf {
    PathBuf::from(format!("read-later-{}.epub", started_at.format("%Y-%m-%d")))
}
