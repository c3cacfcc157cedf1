//! Feed parsing: root-element sniffing plus one item mapping per format.

use feed_rs::model::{Entry, FeedType};
use feed_rs::parser;
use html_escape::decode_html_entities;
use quick_xml::events::Event;
use quick_xml::Reader;
use url::Url;

use crate::app::{LaterError, Result};
use crate::domain::FeedItem;

const UNTITLED: &str = "Untitled";

/// Feed document variants, chosen by the document's root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Rss,
    Atom,
}

impl FeedFormat {
    /// Inspect the first element of `body`. `<rss>` and RSS 1.0's `<rdf:RDF>`
    /// are RSS; `<feed>` is Atom. Anything else is a parse error.
    pub fn detect(body: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(body);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    let name = e.local_name();
                    return match name.as_ref() {
                        b"rss" | b"RDF" => Ok(FeedFormat::Rss),
                        b"feed" => Ok(FeedFormat::Atom),
                        other => Err(LaterError::Parse(format!(
                            "Unrecognized feed root element <{}>",
                            String::from_utf8_lossy(other)
                        ))),
                    };
                }
                Ok(Event::Eof) => {
                    return Err(LaterError::Parse("Document has no root element".into()));
                }
                Ok(_) => continue,
                Err(e) => {
                    return Err(LaterError::Parse(format!(
                        "Malformed XML at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
            }
        }
    }

    fn accepts(self, feed_type: &FeedType) -> bool {
        match self {
            FeedFormat::Rss => matches!(feed_type, FeedType::RSS0 | FeedType::RSS1 | FeedType::RSS2),
            FeedFormat::Atom => matches!(feed_type, FeedType::Atom),
        }
    }

    /// Pick the article link for an entry.
    fn entry_link<'e>(self, entry: &'e Entry) -> Option<&'e str> {
        match self {
            FeedFormat::Rss => entry.links.first().map(|l| l.href.as_str()),
            FeedFormat::Atom => entry
                .links
                .iter()
                .find(|l| l.rel.as_deref() == Some("alternate"))
                .or_else(|| entry.links.iter().find(|l| l.rel.is_none()))
                .map(|l| l.href.as_str()),
        }
    }

    fn entry_guid(self, entry: &Entry, link: &Url) -> String {
        match self {
            FeedFormat::Rss if entry.id.is_empty() => link.to_string(),
            FeedFormat::Rss => entry.id.clone(),
            // Atom requires <id>; fall back anyway rather than fail the feed.
            FeedFormat::Atom if entry.id.is_empty() => link.to_string(),
            FeedFormat::Atom => entry.id.clone(),
        }
    }

    /// Parse a feed document of this format into items, in document order.
    pub fn parse(self, feed_url: &Url, body: &[u8], max_items: usize) -> Result<Vec<FeedItem>> {
        // Leave missing ids empty instead of feed-rs's generated hash so the
        // per-format guid fallback applies.
        let feed = parser::Builder::new()
            .id_generator(|_, _, _| String::new())
            .build()
            .parse(body)
            .map_err(|e| LaterError::Parse(e.to_string()))?;

        if !self.accepts(&feed.feed_type) {
            return Err(LaterError::Parse(format!(
                "Root element says {:?} but document parsed as {:?}",
                self, feed.feed_type
            )));
        }

        let mut items = Vec::new();
        for entry in &feed.entries {
            if items.len() == max_items {
                break;
            }

            let Some(link) = self.resolve_link(feed_url, entry) else {
                tracing::warn!(
                    "Skipping entry without a usable link: {}",
                    entry.title.as_ref().map(|t| t.content.as_str()).unwrap_or(UNTITLED)
                );
                continue;
            };

            let title = entry
                .title
                .as_ref()
                .map(|t| decode_html_entities(t.content.trim()).to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string());

            let guid = self.entry_guid(entry, &link);
            let mut item = FeedItem::new(items.len(), title, link, guid);
            item.published_at = entry.published.or(entry.updated);
            items.push(item);
        }

        Ok(items)
    }

    fn resolve_link(self, feed_url: &Url, entry: &Entry) -> Option<Url> {
        let href = self.entry_link(entry)?.trim();
        let link = feed_url.join(href).ok()?;
        matches!(link.scheme(), "http" | "https").then_some(link)
    }
}

#[derive(Clone, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Detect the format of `body` and parse at most `max_items` items.
    pub fn normalize(&self, feed_url: &Url, body: &[u8], max_items: usize) -> Result<Vec<FeedItem>> {
        let format = FeedFormat::detect(body)?;
        tracing::debug!("Detected {:?} feed at {}", format, feed_url);
        format.parse(feed_url, body, max_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <description>A test feed</description>
    <item>
      <title>Test Item 1</title>
      <link>https://example.com/item1</link>
      <guid>item-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <description>This is item 1</description>
    </item>
    <item>
      <title>Fish &amp; Chips</title>
      <link>/item2</link>
      <guid>item-2</guid>
      <description>This is item 2</description>
    </item>
    <item>
      <title>No link here</title>
      <guid>item-3</guid>
    </item>
    <item>
      <link>https://example.com/item4</link>
      <guid>item-4</guid>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Test Feed</title>
  <id>urn:feed</id>
  <updated>2024-01-02T00:00:00Z</updated>
  <entry>
    <title>Atom Entry 1</title>
    <link rel="self" href="https://example.com/api/atom1"/>
    <link rel="alternate" href="https://example.com/atom1"/>
    <id>atom-entry-1</id>
    <updated>2024-01-01T00:00:00Z</updated>
    <summary>This is Atom entry 1</summary>
  </entry>
  <entry>
    <title>Atom Entry 2</title>
    <link href="https://example.com/atom2"/>
    <id>atom-entry-2</id>
    <updated>2024-01-02T00:00:00Z</updated>
  </entry>
</feed>"#;

    fn feed_url() -> Url {
        Url::parse("https://example.com/feed.xml").unwrap()
    }

    #[test]
    fn test_detect_rss_and_atom() {
        assert_eq!(FeedFormat::detect(RSS_SAMPLE.as_bytes()).unwrap(), FeedFormat::Rss);
        assert_eq!(FeedFormat::detect(ATOM_SAMPLE.as_bytes()).unwrap(), FeedFormat::Atom);
    }

    #[test]
    fn test_detect_rdf_is_rss() {
        let rdf = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/"></rdf:RDF>"#;
        assert_eq!(FeedFormat::detect(rdf.as_bytes()).unwrap(), FeedFormat::Rss);
    }

    #[test]
    fn test_detect_rejects_unknown_roots() {
        assert!(matches!(FeedFormat::detect(b"<html><body/></html>"), Err(LaterError::Parse(_))));
        assert!(matches!(FeedFormat::detect(b""), Err(LaterError::Parse(_))));
        assert!(matches!(FeedFormat::detect(b"{\"version\": 1}"), Err(LaterError::Parse(_))));
    }

    #[test]
    fn test_parse_rss() {
        let items = Normalizer::new()
            .normalize(&feed_url(), RSS_SAMPLE.as_bytes(), 10)
            .unwrap();

        // The linkless entry is dropped; positions stay contiguous.
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Test Item 1");
        assert_eq!(items[0].link.as_str(), "https://example.com/item1");
        assert_eq!(items[0].guid, "item-1");
        assert!(items[0].published_at.is_some());
        assert_eq!(items[1].title, "Fish & Chips");
        assert_eq!(items[1].link.as_str(), "https://example.com/item2");
        assert_eq!(items[2].title, "Untitled");
        assert_eq!(
            items.iter().map(|i| i.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_rss_guid_falls_back_to_link() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>No guids</title>
    <item>
      <title>Without guid</title>
      <link>https://example.com/noguid</link>
    </item>
    <item>
      <title>With guid</title>
      <link>https://example.com/withguid</link>
      <guid isPermaLink="false">kept-guid</guid>
    </item>
  </channel>
</rss>"#;
        let items = Normalizer::new().normalize(&feed_url(), rss.as_bytes(), 10).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].guid, "https://example.com/noguid");
        assert_eq!(items[1].guid, "kept-guid");
    }

    #[test]
    fn test_atom_entry_without_id_falls_back_to_link() {
        let atom = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>No ids</title>
  <entry>
    <title>Idless</title>
    <link href="https://example.com/idless"/>
  </entry>
</feed>"#;
        let items = Normalizer::new().normalize(&feed_url(), atom.as_bytes(), 10).unwrap();
        assert_eq!(items[0].guid, "https://example.com/idless");
    }

    #[test]
    fn test_parse_atom_prefers_alternate_link() {
        let items = Normalizer::new()
            .normalize(&feed_url(), ATOM_SAMPLE.as_bytes(), 10)
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].link.as_str(), "https://example.com/atom1");
        assert_eq!(items[0].guid, "atom-entry-1");
        assert_eq!(items[1].link.as_str(), "https://example.com/atom2");
        assert!(items[1].published_at.is_some());
    }

    #[test]
    fn test_parse_truncates() {
        let items = Normalizer::new()
            .normalize(&feed_url(), RSS_SAMPLE.as_bytes(), 1)
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].guid, "item-1");
    }

    #[test]
    fn test_parse_zero_max_items_is_empty() {
        let items = Normalizer::new()
            .normalize(&feed_url(), RSS_SAMPLE.as_bytes(), 0)
            .unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_format_mismatch_is_parse_error() {
        let err = FeedFormat::Atom
            .parse(&feed_url(), RSS_SAMPLE.as_bytes(), 10)
            .unwrap_err();
        assert!(matches!(err, LaterError::Parse(_)));
    }
}
