//! # laterpress
//!
//! Turns a read-later RSS/Atom feed into a single EPUB for offline reading.
//!
//! ## Architecture
//!
//! ```text
//! FeedFetcher → Normalizer → ParallelResolver (fetch + sanitize) → EpubAssembler
//! ```
//!
//! - [`fetcher`]: HTTP retrieval of the feed and of each linked article
//! - [`normalizer`]: Converts RSS/Atom documents into ordered feed items
//! - [`sanitizer`]: Content-density extraction and XHTML cleanup
//! - [`epub`]: OCF container, package document and navigation
//!
//! ## Quick Start
//!
//! ```bash
//! # Convert the ten newest entries
//! laterpress https://example.com/read-later.xml
//!
//! # Twenty entries, custom title and output
//! laterpress https://example.com/read-later.xml -n 20 -t "Weekend" -o weekend.epub
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the fetcher,
/// normalizer and resolver around one immutable run configuration.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/laterpress/config.toml` and merges command-line
/// overrides into a [`RunConfig`](config::RunConfig).
pub mod config;

/// Core domain models.
///
/// - [`FeedItem`](domain::FeedItem): one normalized feed entry
/// - [`RawPage`](domain::RawPage): a fetched article page
/// - [`Chapter`](domain::Chapter): a sanitized article ready to package
pub mod domain;

/// EPUB assembly and archive writing.
pub mod epub;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for retrieval
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelResolver`](fetcher::parallel::ParallelResolver): Concurrent article resolution with semaphore
pub mod fetcher;

/// Feed parsing and normalization.
pub mod normalizer;

/// End-to-end run and summary.
pub mod pipeline;

/// Article extraction.
pub mod sanitizer;
