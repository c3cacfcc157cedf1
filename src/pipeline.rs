//! One end-to-end run: feed → items → chapters → archive.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tokio::time::{timeout_at, Instant};

use crate::app::{AppContext, FetchFailure, ItemError, LaterError};
use crate::domain::FeedItem;
use crate::epub::EpubAssembler;
use crate::fetcher::feed::FeedFetcher;

/// An item that did not make it into the book.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    pub position: usize,
    pub title: String,
    pub link: String,
    pub reason: String,
}

impl SkippedItem {
    fn new(item: &FeedItem, reason: &ItemError) -> Self {
        Self {
            position: item.position,
            title: item.title.clone(),
            link: item.link.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// What a run did, reported on success and after any failure past the
/// feed fetch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub considered: usize,
    pub included: usize,
    pub skipped: Vec<SkippedItem>,
    pub output: Option<PathBuf>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Considered {} items, included {}, skipped {}",
            self.considered,
            self.included,
            self.skipped.len()
        )?;
        for skipped in &self.skipped {
            writeln!(
                f,
                "  skipped #{} {} ({}): {}",
                skipped.position + 1,
                skipped.title,
                skipped.link,
                skipped.reason
            )?;
        }
        if let Some(output) = &self.output {
            writeln!(f, "Wrote {}", output.display())?;
        }
        Ok(())
    }
}

/// A fatal error, with the summary collected up to that point. The summary
/// is all zeros when the feed itself could not be read.
#[derive(Debug)]
pub struct RunFailure {
    pub error: LaterError,
    pub summary: RunSummary,
}

impl RunFailure {
    fn new(error: impl Into<LaterError>, summary: RunSummary) -> Self {
        Self {
            error: error.into(),
            summary,
        }
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for RunFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.error)
    }
}

/// Fetch the feed, resolve every item, and write the archive to
/// `ctx.config.output`.
///
/// Per-item failures are recorded in the summary. The run fails only when
/// the feed cannot be read, nothing survives, or the archive cannot be
/// written; in each of those cases no archive is left behind.
///
/// The overall deadline covers the feed fetch as well as item resolution.
pub async fn run(ctx: &AppContext) -> Result<RunSummary, RunFailure> {
    let config = &ctx.config;
    let deadline = Instant::now() + config.deadline;

    let feed = FeedFetcher::new(ctx.fetcher.as_ref(), &ctx.normalizer);
    let items = match timeout_at(deadline, feed.fetch_items(config)).await {
        Ok(Ok(items)) => items,
        Ok(Err(e)) => return Err(RunFailure::new(e, RunSummary::default())),
        Err(_) => {
            let error = LaterError::Fetch {
                url: config.url.to_string(),
                source: FetchFailure::Timeout,
            };
            return Err(RunFailure::new(error, RunSummary::default()));
        }
    };

    let mut summary = RunSummary {
        considered: items.len(),
        ..RunSummary::default()
    };

    if items.is_empty() {
        return Err(RunFailure::new(LaterError::EmptyResult { considered: 0 }, summary));
    }

    let results = ctx.resolver.resolve_all(&items, deadline).await;

    let assembler = EpubAssembler::new(items.len());
    for (item, result) in items.iter().zip(results) {
        match result {
            Ok(chapter) => {
                if let Err(e) = assembler.add_chapter(chapter) {
                    return Err(RunFailure::new(e, summary));
                }
                summary.included += 1;
            }
            Err(reason) => summary.skipped.push(SkippedItem::new(item, &reason)),
        }
    }

    if summary.included == 0 {
        let considered = summary.considered;
        return Err(RunFailure::new(LaterError::EmptyResult { considered }, summary));
    }

    match assembler.finalize(config, &config.output) {
        Ok(doc) => {
            tracing::info!(
                "Assembled {} chapters into {}",
                doc.chapters().len(),
                config.output.display()
            );
            summary.output = Some(config.output.clone());
            Ok(summary)
        }
        Err(e) => Err(RunFailure::new(e, summary)),
    }
}
