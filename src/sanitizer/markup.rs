//! Rewrites an extracted subtree into self-contained XHTML.

use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{ElementRef, Node};
use url::Url;

use crate::sanitizer::extractor::{ContentExtractor, MAX_DEPTH};

/// Elements kept as-is (with filtered attributes).
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "caption", "cite", "code", "dd", "del", "dfn", "dl", "dt",
    "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "ins", "kbd",
    "li", "mark", "ol", "p", "pre", "q", "s", "samp", "small", "strong", "sub", "sup", "table",
    "tbody", "td", "tfoot", "th", "thead", "time", "tr", "u", "ul", "var",
];

/// Elements dropped with their subtree even when not junk for scoring.
const DROP_TAGS: &[&str] = &["audio", "video", "source", "track", "picture", "map", "area", "dialog", "menu"];

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

const UNSAFE_SCHEMES: &[&str] = &["javascript", "vbscript", "data", "file"];

/// Output of a rewrite pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Markup {
    pub html: String,
    pub has_remote_resources: bool,
}

pub struct MarkupWriter<'a> {
    extractor: &'a ContentExtractor,
    base: &'a Url,
    /// Title already rendered by the chapter template; a first heading that
    /// repeats it is skipped.
    title: Option<String>,
    seen_heading: bool,
    out: Markup,
}

impl<'a> MarkupWriter<'a> {
    pub fn new(extractor: &'a ContentExtractor, base: &'a Url) -> Self {
        Self {
            extractor,
            base,
            title: None,
            seen_heading: false,
            out: Markup::default(),
        }
    }

    pub fn skip_heading_matching(mut self, title: &str) -> Self {
        self.title = Some(normalize_heading(title));
        self
    }

    /// Write the children of `root` (the container itself is not emitted).
    pub fn write(mut self, root: ElementRef<'_>) -> Markup {
        self.write_children(root, 0);
        self.out
    }

    fn write_children(&mut self, element: ElementRef<'_>, depth: usize) {
        if depth >= MAX_DEPTH {
            return;
        }

        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.write_element(child, depth + 1);
                    }
                }
                _ => {}
            }
        }
    }

    fn write_element(&mut self, element: ElementRef<'_>, depth: usize) {
        let name = element.value().name();

        if self.extractor.is_junk(element) || DROP_TAGS.contains(&name) {
            return;
        }

        if is_heading(name) && !self.seen_heading {
            self.seen_heading = true;
            let text = normalize_heading(&element.text().collect::<String>());
            if self.title.as_deref() == Some(text.as_str()) {
                return;
            }
        }

        if !ALLOWED_TAGS.contains(&name) {
            // Unknown or layout-only element: keep its content.
            self.write_children(element, depth);
            return;
        }

        let attrs = match self.attributes(element) {
            Some(attrs) => attrs,
            // An image without a usable source is dropped entirely.
            None => return,
        };

        self.out.html.push('<');
        self.out.html.push_str(name);
        for (key, value) in &attrs {
            self.out.html.push(' ');
            self.out.html.push_str(key);
            self.out.html.push_str("=\"");
            self.out.html.push_str(&encode_double_quoted_attribute(&clean_xml_chars(value)));
            self.out.html.push('"');
        }

        if VOID_TAGS.contains(&name) {
            self.out.html.push_str("/>");
            return;
        }

        self.out.html.push('>');
        self.write_children(element, depth);
        self.out.html.push_str("</");
        self.out.html.push_str(name);
        self.out.html.push('>');
    }

    /// Allowed attributes for `element`, with URLs made absolute. Returns
    /// `None` when the element must be dropped.
    fn attributes(&mut self, element: ElementRef<'_>) -> Option<Vec<(&'static str, String)>> {
        let el = element.value();
        let mut attrs = Vec::new();

        match el.name() {
            "a" => {
                if let Some(href) = el.attr("href").and_then(|h| self.resolve(h)) {
                    attrs.push(("href", href));
                }
                push_plain(&mut attrs, el.attr("title"), "title");
            }
            "img" => {
                // Lazy-loading pages often park the real source in data-src.
                let src = el
                    .attr("src")
                    .and_then(|s| self.resolve(s))
                    .or_else(|| el.attr("data-src").and_then(|s| self.resolve(s)))?;
                attrs.push(("src", src));
                attrs.push(("alt", el.attr("alt").unwrap_or_default().to_string()));
                push_plain(&mut attrs, el.attr("title"), "title");
                self.out.has_remote_resources = true;
            }
            "blockquote" | "q" | "del" | "ins" => {
                if let Some(cite) = el.attr("cite").and_then(|c| self.resolve(c)) {
                    attrs.push(("cite", cite));
                }
            }
            "td" | "th" => {
                push_numeric(&mut attrs, el.attr("colspan"), "colspan");
                push_numeric(&mut attrs, el.attr("rowspan"), "rowspan");
            }
            "ol" => push_numeric(&mut attrs, el.attr("start"), "start"),
            "abbr" => push_plain(&mut attrs, el.attr("title"), "title"),
            "time" => push_plain(&mut attrs, el.attr("datetime"), "datetime"),
            _ => {}
        }

        Some(attrs)
    }

    /// Resolve `raw` against the page base. Executable and inline-data URLs
    /// are rejected.
    fn resolve(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let url = self.base.join(raw).ok()?;
        if UNSAFE_SCHEMES.contains(&url.scheme()) {
            return None;
        }
        Some(url.to_string())
    }

    fn push_text(&mut self, text: &str) {
        self.out.html.push_str(&encode_text(&clean_xml_chars(text)));
    }
}

fn push_plain(attrs: &mut Vec<(&'static str, String)>, value: Option<&str>, key: &'static str) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        attrs.push((key, value.to_string()));
    }
}

fn push_numeric(attrs: &mut Vec<(&'static str, String)>, value: Option<&str>, key: &'static str) {
    if let Some(n) = value.and_then(|v| v.trim().parse::<u32>().ok()) {
        attrs.push((key, n.to_string()));
    }
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn normalize_heading(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Drop characters XML 1.0 does not allow.
fn clean_xml_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}'))
        .collect()
}
