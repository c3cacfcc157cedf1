//! EPUB package model and serialization.
//!
//! ```text
//! Chapter slots → EpubDocument (manifest + spine) → zip archive
//! ```
//!
//! Archive layout:
//!
//! ```text
//! mimetype                      (first, stored)
//! META-INF/container.xml
//! OEBPS/content.opf
//! OEBPS/nav.xhtml
//! OEBPS/toc.ncx
//! OEBPS/styles/book.css
//! OEBPS/text/chapter-NNN.xhtml
//! ```

mod assembler;
mod package;
mod writer;

pub use assembler::EpubAssembler;
pub use writer::{write_archive, write_epub};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use url::Url;

use crate::app::AssemblyError;
use crate::domain::Chapter;

pub const MIMETYPE: &str = "application/epub+zip";
pub const CONTAINER_PATH: &str = "META-INF/container.xml";
/// Directory holding every resource listed in the package document.
pub const CONTENT_DIR: &str = "OEBPS";

pub const MEDIA_XHTML: &str = "application/xhtml+xml";
pub const MEDIA_NCX: &str = "application/x-dtbncx+xml";
pub const MEDIA_CSS: &str = "text/css";
pub const MEDIA_OPF: &str = "application/oebps-package+xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Package,
    Navigation,
    Ncx,
    Stylesheet,
    Chapter,
}

/// One resource of the package. `href` is relative to [`CONTENT_DIR`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub id: String,
    pub href: String,
    pub media_type: &'static str,
    pub kind: ResourceKind,
    pub properties: Option<&'static str>,
}

impl ManifestEntry {
    fn new(id: &str, href: &str, media_type: &'static str, kind: ResourceKind) -> Self {
        Self {
            id: id.to_string(),
            href: href.to_string(),
            media_type,
            kind,
            properties: None,
        }
    }

    /// Path inside the zip archive.
    pub fn archive_path(&self) -> String {
        format!("{}/{}", CONTENT_DIR, self.href)
    }

    /// Whether the entry appears in the package document's `<manifest>`. The
    /// package document never lists itself.
    pub fn is_listed(&self) -> bool {
        self.kind != ResourceKind::Package
    }
}

pub fn chapter_href(chapter: &Chapter) -> String {
    format!("text/{}", chapter.file_name())
}

/// Book-level metadata written to the package document.
#[derive(Debug, Clone, PartialEq)]
pub struct BookMeta {
    /// `urn:uuid:` identifier.
    pub identifier: String,
    pub title: String,
    pub language: String,
    pub modified: DateTime<Utc>,
}

/// The book being built. Chapters can only be appended, in increasing order.
#[derive(Debug, Clone)]
pub struct EpubDocument {
    pub meta: BookMeta,
    chapters: Vec<Chapter>,
}

impl EpubDocument {
    pub fn new(meta: BookMeta) -> Self {
        Self {
            meta,
            chapters: Vec::new(),
        }
    }

    pub fn push_chapter(&mut self, chapter: Chapter) -> Result<(), AssemblyError> {
        if let Some(last) = self.chapters.last() {
            if chapter.order <= last.order {
                return Err(AssemblyError::OutOfOrder {
                    order: chapter.order,
                    previous: last.order,
                });
            }
        }
        self.chapters.push(chapter);
        Ok(())
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Every resource in the archive: package, navigation, NCX, stylesheet,
    /// then one entry per chapter in spine order.
    pub fn manifest(&self) -> Vec<ManifestEntry> {
        let mut entries = vec![
            ManifestEntry::new("opf", "content.opf", MEDIA_OPF, ResourceKind::Package),
            ManifestEntry {
                properties: Some("nav"),
                ..ManifestEntry::new("nav", "nav.xhtml", MEDIA_XHTML, ResourceKind::Navigation)
            },
            ManifestEntry::new("ncx", "toc.ncx", MEDIA_NCX, ResourceKind::Ncx),
            ManifestEntry::new("css", "styles/book.css", MEDIA_CSS, ResourceKind::Stylesheet),
        ];

        entries.extend(self.chapters.iter().map(|chapter| ManifestEntry {
            properties: chapter.has_remote_resources.then_some("remote-resources"),
            ..ManifestEntry::new(&chapter.id, &chapter_href(chapter), MEDIA_XHTML, ResourceKind::Chapter)
        }));

        entries
    }

    /// Chapter ids in reading order.
    pub fn spine(&self) -> Vec<&str> {
        self.chapters.iter().map(|c| c.id.as_str()).collect()
    }
}

/// UUID-shaped identifier derived from the run seed, the feed and the
/// included entries. Same inputs give the same identifier.
pub fn book_identifier<'a>(
    seed: &DateTime<Utc>,
    feed_url: &Url,
    guids: impl IntoIterator<Item = &'a str>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_rfc3339().as_bytes());
    hasher.update(feed_url.as_str().as_bytes());
    for guid in guids {
        hasher.update([0u8]);
        hasher.update(guid.as_bytes());
    }
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    // Name-based (v5-style) version and RFC 4122 variant bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x50;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex = hex::encode(bytes);
    format!(
        "urn:uuid:{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}
