//! Builders for synthetic containers and slot regions used in tests

use crate::bnd4::{BND4_ENTRY_HEADER_LEN, BND4_HEADER_LEN, BND4_MAGIC, ENTRY_MAGIC};
use crate::crypto::{self, SAVE_KEY};
use crate::scanner::EMPTY_SENTINEL;

enum Payload {
    /// Plaintext, encrypted on build
    Plain(Vec<u8>),
    /// Stored after the IV untouched
    Raw(Vec<u8>),
}

/// Assembles a BND4 archive with encrypted entries
pub(crate) struct ArchiveBuilder {
    payloads: Vec<Payload>,
    patches: Vec<(usize, usize, Vec<u8>)>,
}

impl ArchiveBuilder {
    pub(crate) fn new() -> Self {
        ArchiveBuilder {
            payloads: Vec::new(),
            patches: Vec::new(),
        }
    }

    /// Add `count` entries with `size` bytes of patterned plaintext each
    pub(crate) fn entries(mut self, count: usize, size: usize) -> Self {
        for i in 0..count {
            let data = (0..size).map(|j| (i * 31 + j) as u8).collect();
            self.payloads.push(Payload::Plain(data));
        }
        self
    }

    /// Add one entry with the given (block-aligned) plaintext
    pub(crate) fn plaintext(mut self, data: Vec<u8>) -> Self {
        self.payloads.push(Payload::Plain(data));
        self
    }

    /// Add one entry whose ciphertext is stored as given
    pub(crate) fn raw(mut self, data: Vec<u8>) -> Self {
        self.payloads.push(Payload::Raw(data));
        self
    }

    /// Overwrite one byte of an entry header after layout
    pub(crate) fn corrupt_header(&mut self, index: usize, offset: usize, value: u8) {
        self.patches.push((index, offset, vec![value]));
    }

    /// Overwrite an i32 field of an entry header after layout
    pub(crate) fn patch_header_i32(&mut self, index: usize, offset: usize, value: i32) {
        self.patches.push((index, offset, value.to_le_bytes().to_vec()));
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let count = self.payloads.len();
        let table_end = BND4_HEADER_LEN + BND4_ENTRY_HEADER_LEN * count;

        let mut names = Vec::new();
        let mut name_offsets = Vec::with_capacity(count);
        for i in 0..count {
            name_offsets.push(table_end + names.len());
            for unit in format!("USERDATA_{:02}", i).encode_utf16() {
                names.extend_from_slice(&unit.to_le_bytes());
            }
            names.extend_from_slice(&[0, 0]);
        }

        let mut data = Vec::new();
        let mut data_ranges = Vec::with_capacity(count);
        let data_start = table_end + names.len();
        for (i, payload) in self.payloads.iter().enumerate() {
            let iv = entry_iv(i);
            let body = match payload {
                Payload::Plain(plain) => crypto::encrypt(&SAVE_KEY, &iv, plain)
                    .expect("test plaintext must be block aligned"),
                Payload::Raw(raw) => raw.clone(),
            };
            data_ranges.push((data_start + data.len(), iv.len() + body.len()));
            data.extend_from_slice(&iv);
            data.extend_from_slice(&body);
        }

        let mut out = vec![0u8; BND4_HEADER_LEN];
        out[0..4].copy_from_slice(BND4_MAGIC);
        out[12..16].copy_from_slice(&(count as i32).to_le_bytes());

        for i in 0..count {
            let mut header = [0u8; BND4_ENTRY_HEADER_LEN];
            let (offset, size) = data_ranges[i];
            header[0..8].copy_from_slice(&ENTRY_MAGIC);
            header[8..12].copy_from_slice(&(size as i32).to_le_bytes());
            header[16..20].copy_from_slice(&(offset as i32).to_le_bytes());
            header[20..24].copy_from_slice(&(name_offsets[i] as i32).to_le_bytes());
            out.extend_from_slice(&header);
        }
        out.extend_from_slice(&names);
        out.extend_from_slice(&data);

        for (index, offset, bytes) in &self.patches {
            let pos = BND4_HEADER_LEN + BND4_ENTRY_HEADER_LEN * index + offset;
            out[pos..pos + bytes.len()].copy_from_slice(bytes);
        }

        out
    }
}

/// Deterministic IV for entry `index`
pub(crate) fn entry_iv(index: usize) -> [u8; 16] {
    let mut iv = [0u8; 16];
    for (j, b) in iv.iter_mut().enumerate() {
        *b = (index as u8).wrapping_mul(17).wrapping_add(j as u8 * 3 + 1);
    }
    iv
}

/// A 72-byte relic record with kind byte 0x80
pub(crate) fn relic_record(
    sorting: u16,
    item_id: u32,
    effects: [u32; 3],
    sec: [u32; 3],
) -> Vec<u8> {
    let mut rec = vec![0u8; 72];
    rec[0..2].copy_from_slice(&sorting.to_le_bytes());
    rec[2] = 0x80;
    rec[3] = 0xC0;
    rec[4..7].copy_from_slice(&item_id.to_le_bytes()[..3]);
    for (k, e) in effects.iter().enumerate() {
        rec[16 + 4 * k..20 + 4 * k].copy_from_slice(&e.to_le_bytes());
    }
    for (k, e) in sec.iter().enumerate() {
        rec[56 + 4 * k..60 + 4 * k].copy_from_slice(&e.to_le_bytes());
    }
    rec
}

/// A non-relic record of the given size class
pub(crate) fn other_record(kind: u8, class: u8, size: usize) -> Vec<u8> {
    let mut rec = vec![0x11u8; size];
    rec[2] = kind;
    rec[3] = class;
    rec
}

/// `len` bytes of repeated empty-slot sentinels (`len` must be a multiple of 8)
pub(crate) fn sentinel_fill(len: usize) -> Vec<u8> {
    EMPTY_SENTINEL.iter().copied().cycle().take(len).collect()
}
