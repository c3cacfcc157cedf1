use chrono::Utc;

use crate::app::{AppContext, LaterError, Result};
use crate::cli::Cli;
use crate::config::{Config, RunConfig};
use crate::fetcher::feed::parse_feed_url;
use crate::pipeline::{self, RunSummary};

/// Merge the config file and command-line flags into one run configuration.
pub fn run_config(cli: &Cli) -> Result<RunConfig> {
    let raw = cli
        .feed_url()
        .ok_or_else(|| LaterError::Config("A feed URL is required".into()))?;
    let url = parse_feed_url(raw)?;

    let config = Config::load(cli.config.as_deref()).map_err(|e| LaterError::Config(e.to_string()))?;
    RunConfig::resolve(url, config, cli.overrides(), Utc::now())
}

/// Convert the feed into an EPUB and print what happened.
pub async fn convert(cli: &Cli) -> Result<()> {
    let config = run_config(cli)?;
    let ctx = AppContext::new(config)?;

    match pipeline::run(&ctx).await {
        Ok(summary) => print_summary(&summary, cli.json),
        Err(failure) => {
            print_summary(&failure.summary, cli.json)?;
            Err(failure.error)
        }
    }
}

fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(summary).map_err(std::io::Error::from)?;
        println!("{}", out);
    } else {
        print!("{}", summary);
    }
    Ok(())
}
