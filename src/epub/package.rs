//! Text of the structural files: container descriptor, package document,
//! navigation documents and chapter pages.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::domain::Chapter;
use crate::epub::{chapter_href, EpubDocument, MEDIA_OPF};

pub const PACKAGE_PATH: &str = "OEBPS/content.opf";

pub fn container_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{PACKAGE_PATH}" media-type="{MEDIA_OPF}"/>
  </rootfiles>
</container>
"#
    )
}

pub const STYLESHEET: &str = r#"body { margin: 0 4%; line-height: 1.5; font-family: serif; }
h1 { font-size: 1.6em; margin: 1em 0 0.3em; }
p.source { font-size: 0.8em; color: #555; margin-top: 0; word-wrap: break-word; }
img { max-width: 100%; height: auto; }
pre { white-space: pre-wrap; font-size: 0.85em; }
blockquote { margin: 1em 1.5em; font-style: italic; }
table { border-collapse: collapse; }
td, th { border: 1px solid #999; padding: 0.2em 0.4em; }
"#;

fn timestamp(doc: &EpubDocument) -> String {
    doc.meta.modified.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// EPUB 3 package document.
pub fn package_opf(doc: &EpubDocument) -> String {
    let meta = &doc.meta;
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
"#,
    );
    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
        text(&meta.identifier)
    ));
    opf.push_str(&format!("    <dc:title>{}</dc:title>\n", text(&meta.title)));
    opf.push_str(&format!("    <dc:language>{}</dc:language>\n", text(&meta.language)));
    opf.push_str(&format!("    <dc:date>{}</dc:date>\n", timestamp(doc)));
    opf.push_str(&format!(
        "    <meta property=\"dcterms:modified\">{}</meta>\n",
        timestamp(doc)
    ));
    opf.push_str("  </metadata>\n");

    opf.push_str("  <manifest>\n");
    for entry in doc.manifest().iter().filter(|e| e.is_listed()) {
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"",
            attr(&entry.id),
            attr(&entry.href),
            entry.media_type
        ));
        if let Some(properties) = entry.properties {
            opf.push_str(&format!(" properties=\"{}\"", properties));
        }
        opf.push_str("/>\n");
    }
    opf.push_str("  </manifest>\n");

    opf.push_str("  <spine toc=\"ncx\">\n");
    for id in doc.spine() {
        opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", attr(id)));
    }
    opf.push_str("  </spine>\n");
    opf.push_str("</package>\n");
    opf
}

/// EPUB 3 navigation document.
pub fn nav_xhtml(doc: &EpubDocument) -> String {
    let mut nav = String::new();
    nav.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="{lang}" lang="{lang}">
<head>
  <title>{title}</title>
</head>
<body>
  <nav epub:type="toc" id="toc">
    <h1>{title}</h1>
    <ol>
"#,
        lang = attr(&doc.meta.language),
        title = text(&doc.meta.title)
    ));
    for chapter in doc.chapters() {
        nav.push_str(&format!(
            "      <li><a href=\"{}\">{}</a></li>\n",
            attr(&chapter_href(chapter)),
            text(&chapter.title)
        ));
    }
    nav.push_str("    </ol>\n  </nav>\n</body>\n</html>\n");
    nav
}

/// EPUB 2 NCX table of contents, for older readers.
pub fn toc_ncx(doc: &EpubDocument) -> String {
    let mut ncx = String::new();
    ncx.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{uid}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle><text>{title}</text></docTitle>
  <navMap>
"#,
        uid = attr(&doc.meta.identifier),
        title = text(&doc.meta.title)
    ));
    for (i, chapter) in doc.chapters().iter().enumerate() {
        ncx.push_str(&format!(
            r#"    <navPoint id="nav-{id}" playOrder="{order}">
      <navLabel><text>{title}</text></navLabel>
      <content src="{src}"/>
    </navPoint>
"#,
            id = attr(&chapter.id),
            order = i + 1,
            title = text(&chapter.title),
            src = attr(&chapter_href(chapter))
        ));
    }
    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

/// Standalone XHTML page for one chapter.
pub fn chapter_xhtml(chapter: &Chapter, language: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{lang}" lang="{lang}">
<head>
  <title>{title}</title>
  <link rel="stylesheet" type="text/css" href="../styles/book.css"/>
</head>
<body>
  <h1>{title}</h1>
  <p class="source"><a href="{source}">{source_text}</a></p>
  <div class="article">{body}</div>
</body>
</html>
"#,
        lang = attr(language),
        title = text(&chapter.title),
        source = attr(chapter.source_url.as_str()),
        source_text = text(chapter.source_url.as_str()),
        body = chapter.body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::tests::{chapter, meta};

    fn doc() -> EpubDocument {
        let mut doc = EpubDocument::new(meta());
        doc.push_chapter(chapter(0, "First & Foremost")).unwrap();
        doc.push_chapter(chapter(4, "Second <Take>")).unwrap();
        doc
    }

    #[test]
    fn test_container_points_at_package() {
        assert!(container_xml().contains("full-path=\"OEBPS/content.opf\""));
    }

    #[test]
    fn test_opf_lists_manifest_and_spine_in_order() {
        let opf = package_opf(&doc());

        assert!(opf.contains("<dc:identifier id=\"BookId\">urn:uuid:"));
        assert!(opf.contains("<meta property=\"dcterms:modified\">2024-01-01T00:00:00Z</meta>"));
        assert!(opf.contains(
            "<item id=\"nav\" href=\"nav.xhtml\" media-type=\"application/xhtml+xml\" properties=\"nav\"/>"
        ));
        assert!(opf.contains(
            "<item id=\"chapter-005\" href=\"text/chapter-005.xhtml\" media-type=\"application/xhtml+xml\"/>"
        ));
        assert!(!opf.contains("content.opf"));

        let first = opf.find("<itemref idref=\"chapter-001\"/>").unwrap();
        let second = opf.find("<itemref idref=\"chapter-005\"/>").unwrap();
        assert!(first < second);
        assert_eq!(opf.matches("<itemref ").count(), 2);
    }

    #[test]
    fn test_nav_escapes_titles_and_keeps_order() {
        let nav = nav_xhtml(&doc());
        let first = nav.find("First &amp; Foremost").unwrap();
        let second = nav.find("Second &lt;Take&gt;").unwrap();
        assert!(first < second);
        assert!(nav.contains("href=\"text/chapter-001.xhtml\""));
    }

    #[test]
    fn test_ncx_play_order() {
        let ncx = toc_ncx(&doc());
        assert!(ncx.contains("<navPoint id=\"nav-chapter-001\" playOrder=\"1\">"));
        assert!(ncx.contains("<navPoint id=\"nav-chapter-005\" playOrder=\"2\">"));
    }

    #[test]
    fn test_chapter_page_wraps_body() {
        let page = chapter_xhtml(&chapter(0, "Tea & Biscuits"), "en");
        assert!(page.contains("<h1>Tea &amp; Biscuits</h1>"));
        assert!(page.contains("<div class=\"article\"><p>Body of Tea & Biscuits</p></div>"));
        assert!(page.contains("href=\"https://example.com/0\""));
    }
}
