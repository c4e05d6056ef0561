//! Memory image layout
//!
//! The positions of the character sections, the name anchor formula and the
//! scan guards were recovered from one game version and will move when the
//! save format changes. They live here as data so a new layout can be
//! supplied without touching the scanner.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Layout defines no sections")]
    NoSections,

    #[error("Section numbers must run 1..=N in order: expected {expected}, found {found}")]
    NonContiguous { expected: u8, found: u8 },

    #[error("Section {0} ends before it starts")]
    InvertedWindow(u8),

    #[error("Layout defines no anchor lengths")]
    NoAnchorLengths,

    #[error("Layout defines {0} sections; at most 255 are supported")]
    TooManySections(usize),
}

/// One character profile window over the memory image (end inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionWindow {
    pub number: u8,
    pub start: usize,
    pub end: usize,
}

impl SectionWindow {
    pub const fn new(number: u8, start: usize, end: usize) -> Self {
        SectionWindow { number, start, end }
    }

    /// Number of bytes covered, counting the inclusive end
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).saturating_add(1)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Section windows of the current Nightreign save layout
pub const NIGHTREIGN_SECTIONS: [SectionWindow; 10] = [
    SectionWindow::new(1, 0x0000_0004, 0x0010_0003),
    SectionWindow::new(2, 0x0010_0024, 0x0020_0023),
    SectionWindow::new(3, 0x0020_0044, 0x0030_0043),
    SectionWindow::new(4, 0x0030_0064, 0x0040_0063),
    SectionWindow::new(5, 0x0040_0084, 0x0050_0083),
    SectionWindow::new(6, 0x0050_00A4, 0x0060_00A3),
    SectionWindow::new(7, 0x0060_00C4, 0x0070_00C3),
    SectionWindow::new(8, 0x0070_00E4, 0x0080_00E3),
    SectionWindow::new(9, 0x0080_0104, 0x0090_0103),
    SectionWindow::new(10, 0x0090_0124, 0x00A0_0123),
];

/// Where things live in the decrypted memory image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Free-form label for the save version this layout describes
    pub name: String,
    /// Decrypted entries a complete save must produce
    pub expected_entries: usize,
    /// Image offset of section 1's name anchor
    pub anchor_base: usize,
    /// Distance between consecutive sections' anchors
    pub anchor_stride: usize,
    /// Anchor read lengths, in order of preference
    pub anchor_lengths: Vec<usize>,
    /// Bytes decoded for the character name
    pub name_bytes: usize,
    /// Bytes skipped at the start of a window before scanning
    pub scan_start_skip: usize,
    /// Bytes left unscanned in front of the name anchor
    pub scan_end_guard: usize,
    /// Bytes that must follow the anchor inside the window
    pub trailing_guard: usize,
    pub sections: Vec<SectionWindow>,
}

impl Default for Layout {
    fn default() -> Self {
        Layout::nightreign()
    }
}

impl Layout {
    /// Layout of current Nightreign `.sl2` saves
    pub fn nightreign() -> Self {
        Layout {
            name: "nightreign".to_string(),
            expected_entries: 14,
            anchor_base: 0x00A0_1AA2,
            anchor_stride: 0x290,
            anchor_lengths: vec![10, 5, 3],
            name_bytes: 32,
            scan_start_skip: 32,
            scan_end_guard: 100,
            trailing_guard: 1000,
            sections: NIGHTREIGN_SECTIONS.to_vec(),
        }
    }

    /// Look up a section window by its 1-based number
    pub fn section(&self, number: u8) -> Option<&SectionWindow> {
        self.sections.iter().find(|s| s.number == number)
    }

    /// Section numbers in order
    pub fn section_numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.sections.iter().map(|s| s.number)
    }

    /// Expected image offset of a section's name anchor
    pub fn anchor_offset(&self, number: u8) -> usize {
        let steps = usize::from(number.max(1) - 1);
        self.anchor_base
            .saturating_add(steps.saturating_mul(self.anchor_stride))
    }

    /// Check that the layout is usable
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.sections.is_empty() {
            return Err(LayoutError::NoSections);
        }
        if self.sections.len() > usize::from(u8::MAX) {
            return Err(LayoutError::TooManySections(self.sections.len()));
        }
        for (expected, window) in (1..=u8::MAX).zip(&self.sections) {
            if window.number != expected {
                return Err(LayoutError::NonContiguous {
                    expected,
                    found: window.number,
                });
            }
            if window.is_empty() {
                return Err(LayoutError::InvertedWindow(window.number));
            }
        }
        if self.anchor_lengths.is_empty() {
            return Err(LayoutError::NoAnchorLengths);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_nightreign() {
        let layout = Layout::default();
        assert_eq!(layout, Layout::nightreign());
        assert_eq!(layout.expected_entries, 14);
        assert_eq!(layout.sections.len(), 10);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_windows_do_not_overlap() {
        for pair in NIGHTREIGN_SECTIONS.windows(2) {
            assert!(pair[0].end < pair[1].start);
            assert_eq!(pair[0].len(), 0x10_0000);
        }
    }

    #[test]
    fn test_anchor_offsets() {
        let layout = Layout::nightreign();
        assert_eq!(layout.anchor_offset(1), 0xA01AA2);
        assert_eq!(layout.anchor_offset(2), 0xA01AA2 + 0x290);
        assert_eq!(layout.anchor_offset(10), 0xA01AA2 + 9 * 0x290);
    }

    #[test]
    fn test_anchor_offset_saturates() {
        let layout = Layout {
            anchor_base: usize::MAX - 1,
            ..Layout::nightreign()
        };
        assert_eq!(layout.anchor_offset(1), usize::MAX - 1);
        assert_eq!(layout.anchor_offset(10), usize::MAX);
    }

    #[test]
    fn test_section_lookup() {
        let layout = Layout::nightreign();
        assert_eq!(layout.section(3).map(|s| s.start), Some(0x0020_0044));
        assert!(layout.section(0).is_none());
        assert!(layout.section(11).is_none());
        assert_eq!(layout.section_numbers().collect::<Vec<_>>(), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        let mut layout = Layout::nightreign();
        layout.sections.swap(0, 1);
        assert_eq!(
            layout.validate(),
            Err(LayoutError::NonContiguous {
                expected: 1,
                found: 2
            })
        );

        let mut layout = Layout::nightreign();
        layout.sections[4].end = 0;
        assert_eq!(layout.validate(), Err(LayoutError::InvertedWindow(5)));

        let mut layout = Layout::nightreign();
        layout.sections.clear();
        assert_eq!(layout.validate(), Err(LayoutError::NoSections));

        let mut layout = Layout::nightreign();
        layout.anchor_lengths.clear();
        assert_eq!(layout.validate(), Err(LayoutError::NoAnchorLengths));
    }

    #[test]
    fn test_window_len_at_address_limit() {
        let window = SectionWindow::new(1, usize::MAX - 9, usize::MAX);
        assert_eq!(window.len(), 10);
        assert!(!window.is_empty());
    }

    #[test]
    fn test_validate_rejects_too_many_sections() {
        let mut layout = Layout::nightreign();
        layout.sections = (0..256usize)
            .map(|i| SectionWindow::new((i as u8).wrapping_add(1), i * 16, i * 16 + 15))
            .collect();
        assert_eq!(layout.validate(), Err(LayoutError::TooManySections(256)));

        layout.sections.truncate(255);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_overrides_defaults() {
        let layout: Layout = toml::from_str(
            r#"
            name = "patched"
            trailing_guard = 500

            [[sections]]
            number = 1
            start = 16
            end = 1023
            "#,
        )
        .unwrap();

        assert_eq!(layout.name, "patched");
        assert_eq!(layout.trailing_guard, 500);
        assert_eq!(layout.sections, vec![SectionWindow::new(1, 16, 1023)]);
        assert_eq!(layout.anchor_base, 0xA01AA2);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let layout = Layout::nightreign();
        let text = toml::to_string(&layout).unwrap();
        let parsed: Layout = toml::from_str(&text).unwrap();
        assert_eq!(parsed, layout);
    }
}
