//! Article extraction and cleanup.
//!
//! ```text
//! RawPage → ContentExtractor (density scoring) → MarkupWriter (XHTML) → Chapter
//! ```
//!
//! Images stay remote: `<img>` sources are made absolute and the chapter is
//! flagged so its manifest entry declares `remote-resources`.

mod config;
mod extractor;
mod markup;

pub use config::SanitizerConfig;
pub use extractor::{Candidate, ContentExtractor, Stats};
pub use markup::{Markup, MarkupWriter};

use scraper::{Html, Selector};
use url::Url;

use crate::app::ItemError;
use crate::domain::{Chapter, FeedItem, RawPage};

/// Turns raw article pages into chapter bodies.
pub struct ContentSanitizer {
    extractor: ContentExtractor,
    base_selector: Option<Selector>,
}

impl ContentSanitizer {
    pub fn new(config: &SanitizerConfig) -> Self {
        Self {
            extractor: ContentExtractor::new(config),
            base_selector: Selector::parse("base[href]").ok(),
        }
    }

    /// Extract the readable region of `page` and rewrite it as an XHTML
    /// fragment.
    pub fn sanitize(&self, page: &RawPage, title: &str) -> Result<Markup, ItemError> {
        let document = Html::parse_document(&page.text());

        let best = self
            .extractor
            .best_candidate(&document)
            .ok_or_else(|| ItemError::Extraction("no plausible content region".into()))?;

        tracing::debug!(
            "Selected <{}> in {} (score {:.1}, {} paragraphs)",
            best.element.value().name(),
            page.source_url,
            best.score,
            best.stats.paragraphs
        );

        let base = self.base_url(&document, &page.source_url);
        let markup = MarkupWriter::new(&self.extractor, &base)
            .skip_heading_matching(title)
            .write(best.element);

        if markup.html.trim().is_empty() {
            return Err(ItemError::Extraction("content region is empty after cleanup".into()));
        }

        Ok(markup)
    }

    /// Sanitize `page` into the chapter for `item`.
    pub fn chapter(&self, item: &FeedItem, page: &RawPage) -> Result<Chapter, ItemError> {
        let markup = self.sanitize(page, &item.title)?;
        Ok(Chapter::from_item(item, markup.html, markup.has_remote_resources))
    }

    /// `<base href>` when present, else the page URL.
    fn base_url(&self, document: &Html, page_url: &Url) -> Url {
        self.base_selector
            .as_ref()
            .and_then(|sel| document.select(sel).next())
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| page_url.join(href).ok())
            .unwrap_or_else(|| page_url.clone())
    }
}
