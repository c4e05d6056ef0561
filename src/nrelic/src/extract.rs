//! End-to-end relic extraction
//!
//! Ties the stages together: container decode, entry decryption, image
//! assembly and the per-section relic scan.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bnd4::{self, FormatError};
use crate::crypto::SAVE_KEY;
use crate::entry;
use crate::image::MemoryImage;
use crate::layout::Layout;
use crate::relic::CharacterRelicSet;
use crate::scanner;
use crate::section::{self, SectionError};
use crate::storage::{EntryStore, StorageError};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid save container: {0}")]
    Format(#[from] FormatError),

    #[error("Expected {expected} decrypted entries, got {found}")]
    EntryCount { expected: usize, found: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Section(#[from] SectionError),
}

/// Runs extraction against one layout and key
#[derive(Debug, Clone)]
pub struct Extractor {
    layout: Layout,
    key: [u8; 16],
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor::new(Layout::default())
    }
}

impl Extractor {
    /// Extractor using the standard save key
    pub fn new(layout: Layout) -> Self {
        Extractor {
            layout,
            key: SAVE_KEY,
        }
    }

    pub fn with_key(mut self, key: [u8; 16]) -> Self {
        self.key = key;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Decrypt an archive and assemble its memory image
    ///
    /// Every decrypted entry is handed to `store`, followed by the image if
    /// the entry count matches the layout.
    pub fn decrypt(
        &self,
        archive: &[u8],
        store: &mut dyn EntryStore,
    ) -> Result<MemoryImage, ExtractError> {
        let encrypted = bnd4::decode(archive)?;
        let decrypted = entry::decrypt_all(&encrypted, &self.key);
        info!(
            entries = encrypted.len(),
            decrypted = decrypted.len(),
            "Decrypted save container"
        );

        store.reset()?;
        for e in &decrypted {
            store.put_entry(e)?;
        }

        if decrypted.len() != self.layout.expected_entries {
            return Err(ExtractError::EntryCount {
                expected: self.layout.expected_entries,
                found: decrypted.len(),
            });
        }

        let image = MemoryImage::assemble(&decrypted);
        store.put_image(&image)?;
        debug!(bytes = image.len(), "Assembled memory image");

        Ok(image)
    }

    /// Recover every character's relics from an archive
    pub fn extract(
        &self,
        archive: &[u8],
        store: &mut dyn EntryStore,
    ) -> Result<Vec<CharacterRelicSet>, ExtractError> {
        let image = self.decrypt(archive, store)?;
        Ok(self.extract_image(image.as_bytes()))
    }

    /// Recover relics from an already assembled image
    ///
    /// Sections that fail or hold no relics are logged and left out; the
    /// rest come back in section order.
    pub fn extract_image(&self, image: &[u8]) -> Vec<CharacterRelicSet> {
        let mut sets = Vec::new();

        for number in self.layout.section_numbers() {
            match self.extract_section(image, number) {
                Ok(set) if set.relics.is_empty() => {
                    debug!(section = number, name = %set.character_name, "No relics in section");
                }
                Ok(set) => {
                    info!(
                        section = number,
                        name = %set.character_name,
                        relics = set.relics.len(),
                        "Recovered relics"
                    );
                    sets.push(set);
                }
                Err(e) => warn!(section = number, "Skipping section: {}", e),
            }
        }

        sets
    }

    /// Recover the relics of one section
    ///
    /// An empty relic list is not an error here.
    pub fn extract_section(
        &self,
        image: &[u8],
        number: u8,
    ) -> Result<CharacterRelicSet, SectionError> {
        let layout = &self.layout;
        let view = section::locate(image, layout, number)?;

        let anchor = section::resolve_anchor(image, view.anchor_offset, &layout.anchor_lengths)
            .ok_or(SectionError::AnchorNotFound {
                number,
                offset: view.anchor_offset,
            })?;
        let found = section::find_in_window(view.bytes, anchor)
            .ok_or(SectionError::AnchorNotInWindow(number))?;
        if found.saturating_add(layout.trailing_guard) >= view.bytes.len() {
            return Err(SectionError::GuardOutOfRange {
                number,
                found,
                guard: layout.trailing_guard,
            });
        }

        let character_name =
            section::decode_character_name(view.bytes, found, layout.name_bytes);
        let start = view.start.saturating_add(layout.scan_start_skip);
        let end = view.start + found.saturating_sub(layout.scan_end_guard);
        debug!(
            section = number,
            anchor = view.anchor_offset,
            found = view.start + found,
            start,
            end,
            "Scanning section"
        );

        Ok(CharacterRelicSet {
            section_number: number,
            character_name,
            relics: scanner::scan(image, start, end),
        })
    }
}
