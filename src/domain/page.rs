use std::borrow::Cow;

use chrono::{DateTime, Utc};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use url::Url;

/// How far into the document a `<meta>` charset declaration is looked for.
const META_SNIFF_LEN: usize = 1024;

/// A fetched article page, before extraction.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Final URL after redirects; relative links resolve against this.
    pub source_url: Url,
    pub html: Vec<u8>,
    /// Charset from the response `Content-Type`, when it named one.
    pub charset: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl RawPage {
    pub fn new(source_url: Url, html: Vec<u8>) -> Self {
        Self {
            source_url,
            html,
            charset: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn with_charset(mut self, charset: Option<String>) -> Self {
        self.charset = charset;
        self
    }

    /// Decode the page.
    ///
    /// A byte order mark wins, then the `Content-Type` charset, then a
    /// `<meta>` declaration near the top. Undeclared pages are read as UTF-8,
    /// falling back to windows-1252 when they are not valid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        let declared = self
            .charset
            .as_deref()
            .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
            .or_else(|| sniff_meta_charset(&self.html).and_then(Encoding::for_label));

        match declared {
            Some(encoding) => encoding.decode(&self.html).0,
            None => {
                let (text, _, malformed) = UTF_8.decode(&self.html);
                if malformed {
                    WINDOWS_1252.decode(&self.html).0
                } else {
                    text
                }
            }
        }
    }
}

/// The value of the first `charset=` in the head of the document. Covers both
/// `<meta charset="...">` and the `http-equiv` content form.
fn sniff_meta_charset(html: &[u8]) -> Option<&[u8]> {
    let head = &html[..html.len().min(META_SNIFF_LEN)];
    let start = head.windows(8).position(|w| w.eq_ignore_ascii_case(b"charset="))? + 8;

    let rest = &head[start..];
    let rest = rest
        .strip_prefix(b"\"")
        .or_else(|| rest.strip_prefix(b"'"))
        .unwrap_or(rest);
    let end = rest
        .iter()
        .position(|&b| matches!(b, b'"' | b'\'' | b';' | b'>' | b'/') || b.is_ascii_whitespace())
        .unwrap_or(rest.len());

    Some(&rest[..end]).filter(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &[u8]) -> RawPage {
        RawPage::new(Url::parse("https://example.com/a").unwrap(), html.to_vec())
    }

    #[test]
    fn test_meta_charset_is_honoured() {
        let raw = page(b"<html><head><meta charset=\"iso-8859-1\"></head><body><p>Caf\xe9 cr\xe8me br\xfbl\xe9e</p></body></html>");
        assert!(raw.text().contains("Caf\u{e9} cr\u{e8}me br\u{fb}l\u{e9}e"));
    }

    #[test]
    fn test_http_equiv_charset_is_honoured() {
        let raw = page(
            b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\"></head><body>\x93quoted\x94</body></html>",
        );
        assert!(raw.text().contains("\u{201c}quoted\u{201d}"));
    }

    #[test]
    fn test_header_charset_wins_over_meta() {
        let raw = page(b"<meta charset=\"utf-8\"><p>Stra\xdfe</p>").with_charset(Some("ISO-8859-1".into()));
        assert!(raw.text().contains("Stra\u{df}e"));
    }

    #[test]
    fn test_utf8_is_the_default() {
        let raw = page("<p>Grüße</p>".as_bytes());
        assert_eq!(raw.text(), "<p>Grüße</p>");
    }

    #[test]
    fn test_undeclared_invalid_utf8_falls_back_to_windows_1252() {
        let raw = page(b"<p>na\xefve</p>");
        assert_eq!(raw.text(), "<p>na\u{ef}ve</p>");
    }

    #[test]
    fn test_sniff_meta_charset_forms() {
        assert_eq!(sniff_meta_charset(b"<meta charset=utf-8>"), Some(&b"utf-8"[..]));
        assert_eq!(sniff_meta_charset(b"<meta charset='koi8-r'/>"), Some(&b"koi8-r"[..]));
        assert_eq!(sniff_meta_charset(b"<meta charset=\"\">"), None);
        assert_eq!(sniff_meta_charset(b"<p>no declaration</p>"), None);
    }
}
