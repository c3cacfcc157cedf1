use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::app::AssemblyError;
use crate::config::RunConfig;
use crate::domain::Chapter;
use crate::epub::{book_identifier, write_epub, BookMeta, EpubDocument};

/// Collects chapters from concurrent workers and finalizes the book.
///
/// Each chapter lands in the slot matching its feed position, so completion
/// order has no effect on the result.
pub struct EpubAssembler {
    slots: Mutex<Vec<Option<Chapter>>>,
}

impl EpubAssembler {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(vec![None; capacity]),
        }
    }

    /// Place `chapter` in slot `chapter.order`.
    pub fn add_chapter(&self, chapter: Chapter) -> Result<(), AssemblyError> {
        let mut slots = self.lock();
        let capacity = slots.len();
        let slot = slots
            .get_mut(chapter.order)
            .ok_or(AssemblyError::SlotOutOfRange {
                slot: chapter.order,
                capacity,
            })?;

        if slot.is_some() {
            return Err(AssemblyError::SlotOccupied(chapter.order));
        }
        *slot = Some(chapter);
        Ok(())
    }

    /// Build the document from the filled slots, in feed order.
    pub fn into_document(self, config: &RunConfig) -> Result<EpubDocument, AssemblyError> {
        let chapters: Vec<Chapter> = self
            .slots
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .flatten()
            .collect();

        let identifier = book_identifier(
            &config.started_at,
            &config.url,
            chapters.iter().map(|c| c.guid.as_str()),
        );

        let mut doc = EpubDocument::new(BookMeta {
            identifier,
            title: config.title.clone(),
            language: config.language.clone(),
            modified: config.started_at,
        });
        for chapter in chapters {
            doc.push_chapter(chapter)?;
        }
        Ok(doc)
    }

    /// Build the document and write it to `output`.
    pub fn finalize(self, config: &RunConfig, output: &Path) -> Result<EpubDocument, AssemblyError> {
        let doc = self.into_document(config)?;
        write_epub(&doc, output)?;
        Ok(doc)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Option<Chapter>>> {
        // Slots hold plain data; a panicked writer cannot leave them half-updated.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
