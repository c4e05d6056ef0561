//! Inventory slot scanning
//!
//! A character's inventory is a run of variable-size slot records with no
//! count or index in front of it. Each record is tagged by two bytes at
//! offset 2 and 3: a kind byte (`0x80..=0x85`) and a size class
//! (`0x80` = 80 bytes, `0x90` = 16 bytes, `0xC0` = 72 bytes). Unused slots
//! are written as the 8-byte sentinel `00 00 00 00 FF FF FF FF`.
//!
//! Only 72-byte records hold relics. Everything else is stepped over.
//!
//! Scanning runs in two phases:
//! 1. Alignment: find the first position that frames a record *and* is
//!    followed by another record or an empty slot.
//! 2. Walk: from there, consume a record, an empty slot, or a single byte.
//!
//! Every step advances at least one byte, so a scan over `n` bytes takes at
//! most `n` steps no matter what the region contains.

use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;

use crate::relic::RelicSlot;

/// Marker written into unused inventory slots
pub const EMPTY_SENTINEL: [u8; 8] = [0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];

/// Kind bytes (offset 2) that tag a slot record
pub const SLOT_KINDS: [u8; 6] = [0x80, 0x81, 0x82, 0x83, 0x84, 0x85];

/// Length of a relic record
pub const RELIC_SIZE: usize = 72;

/// Size class byte (offset 3) of a slot record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    /// 80-byte record
    Large,
    /// 16-byte record
    Small,
    /// 72-byte relic record
    Relic,
}

impl SizeClass {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x80 => Some(SizeClass::Large),
            0x90 => Some(SizeClass::Small),
            0xC0 => Some(SizeClass::Relic),
            _ => None,
        }
    }

    /// Record length in bytes
    pub fn size(self) -> usize {
        match self {
            SizeClass::Large => 80,
            SizeClass::Small => 16,
            SizeClass::Relic => RELIC_SIZE,
        }
    }
}

/// What the walk does at one position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Record(SizeClass),
    Empty,
    Resync,
}

impl Step {
    fn at(data: &[u8], pos: usize) -> Self {
        if let Some(class) = frame_at(data, pos) {
            Step::Record(class)
        } else if is_empty_slot(data, pos) {
            Step::Empty
        } else {
            Step::Resync
        }
    }

    fn advance(self) -> usize {
        match self {
            Step::Record(class) => class.size(),
            Step::Empty => EMPTY_SENTINEL.len(),
            Step::Resync => 1,
        }
    }
}

/// Size class of the record starting at `pos`, if one fits there
pub fn frame_at(data: &[u8], pos: usize) -> Option<SizeClass> {
    if pos + 4 > data.len() {
        return None;
    }
    if !SLOT_KINDS.contains(&data[pos + 2]) {
        return None;
    }
    let class = SizeClass::from_byte(data[pos + 3])?;
    if pos + class.size() > data.len() {
        return None;
    }
    Some(class)
}

/// Whether an empty-slot sentinel starts at `pos`
pub fn is_empty_slot(data: &[u8], pos: usize) -> bool {
    data.get(pos..pos + EMPTY_SENTINEL.len()) == Some(&EMPTY_SENTINEL[..])
}

/// Find the first position where a record is followed by a record or an
/// empty slot
pub fn find_alignment(data: &[u8]) -> Option<usize> {
    let limit = data.len().saturating_sub(EMPTY_SENTINEL.len());
    (0..limit).find(|&pos| match frame_at(data, pos) {
        Some(class) => {
            let next = pos + class.size();
            frame_at(data, next).is_some() || is_empty_slot(data, next)
        }
        None => false,
    })
}

/// Decode a 72-byte relic record; `offset` is recorded as-is
pub fn decode_relic(record: &[u8; RELIC_SIZE], offset: usize) -> RelicSlot {
    RelicSlot {
        offset,
        size: RELIC_SIZE,
        sorting: LittleEndian::read_u16(&record[0..2]),
        item_id: LittleEndian::read_u24(&record[4..7]),
        effect1_id: LittleEndian::read_u32(&record[16..20]),
        effect2_id: LittleEndian::read_u32(&record[20..24]),
        effect3_id: LittleEndian::read_u32(&record[24..28]),
        sec_effect1_id: LittleEndian::read_u32(&record[56..60]),
        sec_effect2_id: LittleEndian::read_u32(&record[60..64]),
        sec_effect3_id: LittleEndian::read_u32(&record[64..68]),
    }
}

/// Scan `image[start..end]` for relic records
///
/// The range is clamped to the image. Reported offsets are absolute.
pub fn scan(image: &[u8], start: usize, end: usize) -> Vec<RelicSlot> {
    let end = end.min(image.len());
    if start >= end {
        return Vec::new();
    }
    scan_region(&image[start..end], start)
}

/// Scan a region whose first byte sits at absolute offset `base`
pub fn scan_region(data: &[u8], base: usize) -> Vec<RelicSlot> {
    let Some(origin) = find_alignment(data) else {
        trace!(base, len = data.len(), "No slot alignment found");
        return Vec::new();
    };
    trace!(base, origin, "Slot alignment found");

    let mut relics = Vec::new();
    let mut pos = origin;
    while pos + 4 < data.len() {
        let step = Step::at(data, pos);
        if step == Step::Record(SizeClass::Relic) {
            if let Ok(record) = <&[u8; RELIC_SIZE]>::try_from(&data[pos..pos + RELIC_SIZE]) {
                relics.push(decode_relic(record, base + pos));
            }
        }
        pos += step.advance();
    }

    relics
}
