//! BND4 container parsing
//!
//! A `.sl2` save is a BND4 archive: a 64-byte archive header followed by a
//! table of 32-byte entry headers. Each entry header points at an encrypted
//! blob inside the archive whose first 16 bytes are the AES IV.
//!
//! Entry headers that fail validation are skipped rather than failing the
//! whole archive, so a partially damaged save still yields its good entries.

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;
use tracing::{debug, warn};

/// Magic bytes at the start of every BND4 archive
pub const BND4_MAGIC: &[u8; 4] = b"BND4";

/// Size of the archive header preceding the entry table
pub const BND4_HEADER_LEN: usize = 64;

/// Stride of one entry header in the entry table
pub const BND4_ENTRY_HEADER_LEN: usize = 32;

/// Marker that opens every valid entry header
pub const ENTRY_MAGIC: [u8; 8] = [0x40, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];

/// Upper bound on a plausible entry size
pub const MAX_ENTRY_SIZE: i32 = 1_000_000_000;

const ENTRY_COUNT_OFFSET: usize = 12;
const MAX_NAME_UNITS: usize = 64;

/// Errors that reject the archive as a whole
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("'BND4' header not found")]
    BadMagic,

    #[error("File of {0} bytes is too small to hold a BND4 header")]
    Truncated(usize),

    #[error("Negative entry count: {0}")]
    NegativeCount(i32),
}

/// Reasons a single entry header is skipped
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry header does not match expected magic value")]
    BadMagic,

    #[error("invalid size: {0}")]
    InvalidSize(i32),

    #[error("invalid data offset: {0}")]
    InvalidDataOffset(i32),

    #[error("invalid name offset: {0}")]
    InvalidNameOffset(i32),
}

/// Fixed fields of the archive header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub entry_count: i32,
}

impl ArchiveHeader {
    /// Read the archive header, checking magic and size
    pub fn parse(archive: &[u8]) -> Result<Self, FormatError> {
        if archive.len() < BND4_MAGIC.len() || &archive[..4] != BND4_MAGIC {
            return Err(FormatError::BadMagic);
        }
        if archive.len() < BND4_HEADER_LEN {
            return Err(FormatError::Truncated(archive.len()));
        }

        let entry_count = LittleEndian::read_i32(&archive[ENTRY_COUNT_OFFSET..]);
        if entry_count < 0 {
            return Err(FormatError::NegativeCount(entry_count));
        }

        Ok(ArchiveHeader { entry_count })
    }
}

/// One 32-byte entry header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHeader {
    pub magic: [u8; 8],
    pub size: i32,
    /// Bytes 12..16, meaning unknown
    pub unknown: i32,
    pub data_offset: i32,
    pub name_offset: i32,
    /// Parsed for completeness; not used by decryption
    pub footer_length: i32,
    /// Bytes 28..32, meaning unknown
    pub trailer: i32,
}

impl EntryHeader {
    /// Decode a header from exactly [`BND4_ENTRY_HEADER_LEN`] bytes
    pub fn parse(raw: &[u8]) -> Self {
        let mut magic = [0u8; 8];
        magic.copy_from_slice(&raw[0..8]);

        EntryHeader {
            magic,
            size: LittleEndian::read_i32(&raw[8..12]),
            unknown: LittleEndian::read_i32(&raw[12..16]),
            data_offset: LittleEndian::read_i32(&raw[16..20]),
            name_offset: LittleEndian::read_i32(&raw[20..24]),
            footer_length: LittleEndian::read_i32(&raw[24..28]),
            trailer: LittleEndian::read_i32(&raw[28..32]),
        }
    }

    /// Check the header against an archive of `archive_len` bytes
    pub fn validate(&self, archive_len: usize) -> Result<(), EntryError> {
        if self.magic != ENTRY_MAGIC {
            return Err(EntryError::BadMagic);
        }
        if self.size <= 0 || self.size > MAX_ENTRY_SIZE {
            return Err(EntryError::InvalidSize(self.size));
        }
        if self.data_offset <= 0 || self.data_offset as usize + self.size as usize > archive_len {
            return Err(EntryError::InvalidDataOffset(self.data_offset));
        }
        if self.name_offset <= 0 || self.name_offset as usize >= archive_len {
            return Err(EntryError::InvalidNameOffset(self.name_offset));
        }
        Ok(())
    }
}

/// A validated entry, borrowing its encrypted bytes from the archive
#[derive(Debug, Clone)]
pub struct EncryptedEntry<'a> {
    pub index: usize,
    pub header: EntryHeader,
    /// Name stored in the archive's name table, if readable
    pub stored_name: Option<String>,
    /// IV followed by ciphertext
    pub data: &'a [u8],
}

impl EncryptedEntry<'_> {
    /// Canonical name used when persisting the decrypted entry
    pub fn name(&self) -> String {
        entry_name(self.index)
    }
}

/// Name given to the decrypted entry at `index`
pub fn entry_name(index: usize) -> String {
    format!("USERDATA_{:02}", index)
}

/// Split an archive into its valid encrypted entries
///
/// Entries are returned in ascending index order. Invalid entries are
/// logged and left out; a header table that runs off the end of the file
/// ends the walk early.
pub fn decode(archive: &[u8]) -> Result<Vec<EncryptedEntry<'_>>, FormatError> {
    let header = ArchiveHeader::parse(archive)?;
    let count = header.entry_count as usize;
    debug!(count, len = archive.len(), "Parsing BND4 entry table");

    let mut entries = Vec::with_capacity(count.min(64));
    for index in 0..count {
        let pos = BND4_HEADER_LEN + BND4_ENTRY_HEADER_LEN * index;
        if pos + BND4_ENTRY_HEADER_LEN > archive.len() {
            warn!(index, "File too small to read entry header");
            break;
        }

        let entry_header = EntryHeader::parse(&archive[pos..pos + BND4_ENTRY_HEADER_LEN]);
        if let Err(e) = entry_header.validate(archive.len()) {
            warn!(index, "Skipping entry: {}", e);
            continue;
        }

        let start = entry_header.data_offset as usize;
        let end = start + entry_header.size as usize;
        entries.push(EncryptedEntry {
            index,
            header: entry_header,
            stored_name: read_entry_name(archive, entry_header.name_offset as usize),
            data: &archive[start..end],
        });
    }

    Ok(entries)
}

/// Read a zero-terminated name from the archive's name table
///
/// Names are normally UTF-16LE; single-byte names are accepted as well.
fn read_entry_name(archive: &[u8], offset: usize) -> Option<String> {
    let bytes = archive.get(offset..)?;
    let wide = bytes.len() >= 2 && bytes[0] != 0 && bytes[1] == 0;

    let name = if wide {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .take(MAX_NAME_UNITS)
            .map(LittleEndian::read_u16)
            .take_while(|&u| u != 0)
            .collect();
        String::from_utf16(&units).ok()?
    } else {
        let end = bytes
            .iter()
            .take(MAX_NAME_UNITS)
            .position(|&b| b == 0)
            .unwrap_or(bytes.len().min(MAX_NAME_UNITS));
        String::from_utf8(bytes[..end].to_vec()).ok()?
    };

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ArchiveBuilder;

    #[test]
    fn test_rejects_bad_magic() {
        let mut archive = ArchiveBuilder::new().entries(2, 32).build();
        archive[0..4].copy_from_slice(b"BND3");

        assert!(matches!(decode(&archive), Err(FormatError::BadMagic)));
        assert!(matches!(decode(b"BN"), Err(FormatError::BadMagic)));
    }

    #[test]
    fn test_rejects_truncated_header() {
        let mut archive = b"BND4".to_vec();
        archive.resize(20, 0);

        assert!(matches!(decode(&archive), Err(FormatError::Truncated(20))));
    }

    #[test]
    fn test_rejects_negative_count() {
        let mut archive = ArchiveBuilder::new().build();
        archive[12..16].copy_from_slice(&(-1i32).to_le_bytes());

        assert!(matches!(decode(&archive), Err(FormatError::NegativeCount(-1))));
    }

    #[test]
    fn test_decode_entries_in_order() {
        let archive = ArchiveBuilder::new().entries(3, 48).build();
        let entries = decode(&archive).unwrap();

        assert_eq!(entries.len(), 3);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.index, i);
            assert_eq!(entry.data.len(), 16 + 48);
            assert_eq!(entry.name(), format!("USERDATA_{:02}", i));
            assert_eq!(entry.stored_name.as_deref(), Some(entry.name().as_str()));
        }
    }

    #[test]
    fn test_skips_bad_entry_magic() {
        let mut builder = ArchiveBuilder::new().entries(3, 32);
        builder.corrupt_header(1, 0, 0x50);
        let archive = builder.build();

        let entries = decode(&archive).unwrap();
        let indices: Vec<usize> = entries.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_skips_out_of_range_entries() {
        let mut builder = ArchiveBuilder::new().entries(4, 32);
        // size = 0
        builder.patch_header_i32(0, 8, 0);
        // data offset past end of file
        builder.patch_header_i32(1, 16, i32::MAX / 2);
        // name offset negative
        builder.patch_header_i32(2, 20, -4);
        let archive = builder.build();

        let entries = decode(&archive).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].index, 3);
    }

    #[test]
    fn test_validate_reports_reason() {
        let mut header = EntryHeader {
            magic: ENTRY_MAGIC,
            size: 64,
            unknown: 0,
            data_offset: 100,
            name_offset: 10,
            footer_length: 0,
            trailer: 0,
        };
        assert_eq!(header.validate(200), Ok(()));
        assert_eq!(header.validate(150), Err(EntryError::InvalidDataOffset(100)));

        header.size = MAX_ENTRY_SIZE + 1;
        assert_eq!(header.validate(200), Err(EntryError::InvalidSize(MAX_ENTRY_SIZE + 1)));

        header.size = 64;
        header.name_offset = 200;
        assert_eq!(header.validate(200), Err(EntryError::InvalidNameOffset(200)));
    }

    #[test]
    fn test_stops_when_header_table_truncated() {
        let mut archive = ArchiveBuilder::new().entries(2, 16).build();
        // Claim far more entries than the file can describe
        archive[12..16].copy_from_slice(&1000i32.to_le_bytes());

        let entries = decode(&archive).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_footer_length_is_preserved() {
        let mut builder = ArchiveBuilder::new().entries(1, 16);
        builder.patch_header_i32(0, 24, 0x1C);
        let archive = builder.build();

        let entries = decode(&archive).unwrap();
        assert_eq!(entries[0].header.footer_length, 0x1C);
    }

    #[test]
    fn test_read_entry_name_ascii() {
        let mut archive = vec![0u8; 8];
        archive.extend_from_slice(b"USERDATA_07\0");

        assert_eq!(read_entry_name(&archive, 8).as_deref(), Some("USERDATA_07"));
        assert_eq!(read_entry_name(&archive, 0), None);
        assert_eq!(read_entry_name(&archive, 999), None);
    }
}
