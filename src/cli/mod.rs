pub mod commands;

use std::path::PathBuf;

use clap::Parser;

use crate::config::run::Overrides;

#[derive(Parser)]
#[command(name = "laterpress")]
#[command(about = "Turn a read-later RSS/Atom feed into an EPUB", long_about = None)]
pub struct Cli {
    /// URL of the read-later feed
    #[arg(required_unless_present = "url_flag")]
    pub url: Option<String>,

    /// URL of the read-later feed (alternative to the positional argument)
    #[arg(long = "url", value_name = "URL", conflicts_with = "url")]
    pub url_flag: Option<String>,

    /// Maximum number of feed entries to consider
    #[arg(short = 'n', long)]
    pub max_items: Option<usize>,

    /// User-Agent header sent with every request
    #[arg(short = 'A', long)]
    pub user_agent: Option<String>,

    /// Output path (default: read-later-YYYY-MM-DD.epub)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Book title (default: "Read Later Articles - YYYY-MM-DD")
    #[arg(short, long)]
    pub title: Option<String>,

    /// Number of articles fetched concurrently
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Per-article timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Overall deadline for fetching articles, in seconds
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Config file path (default: ~/.config/laterpress/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    pub fn feed_url(&self) -> Option<&str> {
        self.url.as_deref().or(self.url_flag.as_deref())
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            max_items: self.max_items,
            user_agent: self.user_agent.clone(),
            workers: self.workers,
            timeout_secs: self.timeout,
            deadline_secs: self.deadline,
            output: self.output.clone(),
            title: self.title.clone(),
        }
    }
}
