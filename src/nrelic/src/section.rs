//! Character section lookup
//!
//! Each character's inventory sits somewhere inside a fixed window of the
//! memory image, directly in front of the character's name. The name is
//! copied to a second, predictable place (the anchor), so we read it there
//! and search for the same bytes inside the window to find where the
//! inventory ends.

use thiserror::Error;

use crate::layout::Layout;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SectionError {
    #[error("Section {0} is not defined by the layout")]
    Range(u8),

    #[error("Section {number} window ends at {end:#x} but the image is only {len:#x} bytes")]
    WindowOutOfBounds { number: u8, end: usize, len: usize },

    #[error("No character name at {offset:#x} for section {number}")]
    AnchorNotFound { number: u8, offset: usize },

    #[error("Character name for section {0} not found in its window")]
    AnchorNotInWindow(u8),

    #[error("Section {number} name at {found:#x} leaves no room for the {guard}-byte trailer")]
    GuardOutOfRange {
        number: u8,
        found: usize,
        guard: usize,
    },
}

/// One section window sliced out of the image
#[derive(Debug, Clone, Copy)]
pub struct SectionView<'a> {
    pub number: u8,
    /// Image offset of the window's first byte
    pub start: usize,
    pub bytes: &'a [u8],
    /// Image offset where this section's name anchor should be
    pub anchor_offset: usize,
}

/// Slice a section window out of the memory image
pub fn locate<'a>(
    image: &'a [u8],
    layout: &Layout,
    number: u8,
) -> Result<SectionView<'a>, SectionError> {
    let window = layout.section(number).ok_or(SectionError::Range(number))?;
    if window.is_empty() {
        return Err(SectionError::Range(number));
    }
    if window.end >= image.len() {
        return Err(SectionError::WindowOutOfBounds {
            number,
            end: window.end,
            len: image.len(),
        });
    }

    Ok(SectionView {
        number,
        start: window.start,
        bytes: &image[window.start..=window.end],
        anchor_offset: layout.anchor_offset(number),
    })
}

/// Read the name anchor at `offset`, trying each length in turn
///
/// A read of only zero bytes means "no anchor of this length". Reads past
/// the end of the image are shortened to what is available.
pub fn resolve_anchor<'a>(image: &'a [u8], offset: usize, lengths: &[usize]) -> Option<&'a [u8]> {
    lengths.iter().find_map(|&len| {
        let end = offset.saturating_add(len).min(image.len());
        let bytes = image.get(offset..end)?;
        if bytes.is_empty() || bytes.iter().all(|&b| b == 0) {
            None
        } else {
            Some(bytes)
        }
    })
}

/// Offset of the first occurrence of `anchor` inside `window`
pub fn find_in_window(window: &[u8], anchor: &[u8]) -> Option<usize> {
    memchr::memmem::find(window, anchor)
}

/// Decode a character name stored as UTF-16LE
///
/// Only the low byte of each code unit is used. Decoding stops at the first
/// zero byte; non-printable bytes are shown as `.`.
pub fn decode_character_name(window: &[u8], offset: usize, len: usize) -> String {
    let end = offset.saturating_add(len).min(window.len());
    let Some(bytes) = window.get(offset..end) else {
        return String::new();
    };

    bytes
        .iter()
        .step_by(2)
        .take_while(|&&b| b != 0)
        .map(|&b| if (32..=126).contains(&b) { b as char } else { '.' })
        .collect()
}
