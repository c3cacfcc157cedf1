use scraper::{ElementRef, Html, Node, Selector};

use crate::sanitizer::SanitizerConfig;

/// Elements that never carry article content. Their whole subtree is ignored
/// for scoring and dropped from the output.
pub(crate) const JUNK_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "form", "aside", "iframe", "object",
    "embed", "svg", "canvas", "template", "button", "input", "select", "textarea", "link", "meta",
    "head", "title",
];

const CANDIDATE_TAGS: &[&str] = &["article", "main", "section", "div", "td", "body"];

const PARAGRAPH_TAGS: &[&str] = &["p", "pre", "blockquote", "li"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "dd", "div", "dl", "dt", "figure", "h1", "h2", "h3", "h4",
    "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Paragraph text shorter than this does not count as a paragraph.
const MIN_PARAGRAPH_CHARS: usize = 25;

/// Score multiplier for candidates matching a content selector hint.
const HINT_BONUS: f64 = 1.5;

/// Elements nested deeper than this are ignored, like junk. Traversal is
/// recursive, so this also bounds stack use on hostile pages.
pub(crate) const MAX_DEPTH: usize = 256;

/// Text volume and structural overhead of a subtree, with junk excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    pub text: usize,
    pub link_text: usize,
    pub blocks: usize,
    pub paragraphs: usize,
}

impl Stats {
    fn absorb(&mut self, other: Stats) {
        self.text += other.text;
        self.link_text += other.link_text;
        self.blocks += other.blocks;
        self.paragraphs += other.paragraphs;
    }

    /// Non-link text per block element, weighted by how many real paragraphs
    /// the subtree holds.
    pub fn density_score(&self) -> f64 {
        let readable = self.text.saturating_sub(self.link_text) as f64;
        readable / (1.0 + self.blocks as f64) * (1.0 + self.paragraphs as f64).ln()
    }
}

#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub element: ElementRef<'a>,
    pub stats: Stats,
    pub score: f64,
}

/// Locates the main readable region of a page.
pub struct ContentExtractor {
    remove: Vec<Selector>,
    hints: Vec<Selector>,
    min_content_length: usize,
}

impl ContentExtractor {
    pub fn new(config: &SanitizerConfig) -> Self {
        Self {
            remove: parse_selectors(&config.remove_selectors),
            hints: parse_selectors(&config.content_selectors),
            min_content_length: config.min_content_length,
        }
    }

    /// True when `element` and its subtree must be ignored.
    pub fn is_junk(&self, element: ElementRef<'_>) -> bool {
        JUNK_TAGS.contains(&element.value().name()) || self.remove.iter().any(|s| s.matches(&element))
    }

    fn is_hinted(&self, element: ElementRef<'_>) -> bool {
        self.hints.iter().any(|s| s.matches(&element))
    }

    /// Score every candidate container in the document, in document order.
    pub fn candidates<'a>(&self, document: &'a Html) -> Vec<Candidate<'a>> {
        let mut found = Vec::new();
        self.walk(document.root_element(), 0, false, &mut found);
        found
    }

    /// The highest scoring candidate with enough text, if any. Ties go to the
    /// candidate that appears first.
    pub fn best_candidate<'a>(&self, document: &'a Html) -> Option<Candidate<'a>> {
        let mut best: Option<Candidate<'a>> = None;
        for candidate in self.candidates(document) {
            if candidate.score <= 0.0 {
                continue;
            }
            if best.as_ref().is_none_or(|b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }

        best.filter(|b| b.stats.text.saturating_sub(b.stats.link_text) >= self.min_content_length)
    }

    fn walk<'a>(
        &self,
        element: ElementRef<'a>,
        depth: usize,
        in_link: bool,
        found: &mut Vec<Candidate<'a>>,
    ) -> Stats {
        let name = element.value().name();
        let in_link = in_link || name == "a";

        // Reserve the slot now so candidates stay in document order.
        let slot = CANDIDATE_TAGS.contains(&name).then(|| {
            found.push(Candidate {
                element,
                stats: Stats::default(),
                score: 0.0,
            });
            found.len() - 1
        });

        let mut stats = Stats::default();
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    let len = visible_len(text);
                    stats.text += len;
                    if in_link {
                        stats.link_text += len;
                    }
                }
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    if depth >= MAX_DEPTH || self.is_junk(child) {
                        continue;
                    }
                    let child_stats = self.walk(child, depth + 1, in_link, found);
                    let child_name = child.value().name();
                    stats.absorb(child_stats);
                    if BLOCK_TAGS.contains(&child_name) {
                        stats.blocks += 1;
                    }
                    if PARAGRAPH_TAGS.contains(&child_name)
                        && child_stats.text.saturating_sub(child_stats.link_text) >= MIN_PARAGRAPH_CHARS
                    {
                        stats.paragraphs += 1;
                    }
                }
                _ => {}
            }
        }

        if let Some(slot) = slot {
            let mut score = stats.density_score();
            if self.is_hinted(element) {
                score *= HINT_BONUS;
            }
            found[slot].stats = stats;
            found[slot].score = score;
        }

        stats
    }
}

/// Character count with whitespace runs collapsed to a single space.
fn visible_len(text: &str) -> usize {
    text.split_whitespace().map(|w| w.chars().count() + 1).sum::<usize>()
}

fn parse_selectors(raw: &[String]) -> Vec<Selector> {
    raw.iter()
        .filter_map(|s| match Selector::parse(s) {
            Ok(selector) => Some(selector),
            Err(e) => {
                tracing::warn!("Ignoring invalid selector '{}': {:?}", s, e);
                None
            }
        })
        .collect()
}
