use std::io::{self, Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::app::AssemblyError;
use crate::epub::package;
use crate::epub::{EpubDocument, ResourceKind, CONTAINER_PATH, MIMETYPE};

const COMPRESSION_LEVEL: i64 = 6;

/// Serialize `doc` into `writer`. Entry order and timestamps are fixed so the
/// same document always produces the same bytes.
pub fn write_archive<W: Write + Seek>(doc: &EpubDocument, writer: W) -> Result<W, AssemblyError> {
    let mut zip = ZipWriter::new(writer);

    // Fixed timestamp keeps output reproducible.
    let stored = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(DateTime::default());
    let deflated = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL))
        .last_modified_time(DateTime::default());

    // 1. mimetype (must be first, uncompressed)
    zip.start_file("mimetype", stored)?;
    zip.write_all(MIMETYPE.as_bytes())?;

    // 2. container.xml
    zip.start_file(CONTAINER_PATH, deflated)?;
    zip.write_all(package::container_xml().as_bytes())?;

    // 3. Every manifest resource, in manifest order
    for entry in doc.manifest() {
        let content = match entry.kind {
            ResourceKind::Package => package::package_opf(doc),
            ResourceKind::Navigation => package::nav_xhtml(doc),
            ResourceKind::Ncx => package::toc_ncx(doc),
            ResourceKind::Stylesheet => package::STYLESHEET.to_string(),
            ResourceKind::Chapter => {
                let chapter = doc
                    .chapters()
                    .iter()
                    .find(|c| c.id == entry.id)
                    .ok_or_else(|| io::Error::other(format!("no chapter for manifest id {}", entry.id)))?;
                package::chapter_xhtml(chapter, &doc.meta.language)
            }
        };

        let path = entry.archive_path();
        zip.start_file(path, deflated)?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?)
}

/// Write `doc` to `output` atomically: the archive is built in a temporary
/// file next to the destination and renamed into place only when complete.
/// On any failure nothing is left at `output`.
pub fn write_epub(doc: &EpubDocument, output: &Path) -> Result<(), AssemblyError> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    write_archive(doc, tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;

    tmp.persist(output).map_err(|e| AssemblyError::Persist {
        path: output.to_path_buf(),
        source: e.error,
    })?;

    tracing::info!("Wrote {} chapters to {}", doc.chapters().len(), output.display());
    Ok(())
}
