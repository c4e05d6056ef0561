//! Reassembled memory image

use crate::entry::DecryptedEntry;

/// All decrypted entries concatenated in container order
///
/// The size of each entry is kept so the image can be split back into its
/// entries later.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryImage {
    data: Vec<u8>,
    sizes: Vec<usize>,
}

impl MemoryImage {
    /// Concatenate entries in the order given
    pub fn assemble(entries: &[DecryptedEntry]) -> Self {
        let total = entries.iter().map(|e| e.data.len()).sum();
        let mut data = Vec::with_capacity(total);
        let mut sizes = Vec::with_capacity(entries.len());

        for entry in entries {
            data.extend_from_slice(&entry.data);
            sizes.push(entry.data.len());
        }

        MemoryImage { data, sizes }
    }

    /// Rebuild an image from bytes and entry sizes
    ///
    /// Returns `None` if the sizes don't add up to the data length.
    pub fn from_parts(data: Vec<u8>, sizes: Vec<usize>) -> Option<Self> {
        if sizes.iter().sum::<usize>() != data.len() {
            return None;
        }
        Some(MemoryImage { data, sizes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Sizes of the constituent entries, in order
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Split the image back into per-entry slices
    pub fn entries(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.sizes.iter().scan(0usize, move |offset, &size| {
            let start = *offset;
            *offset += size;
            Some(&self.data[start..start + size])
        })
    }
}

impl AsRef<[u8]> for MemoryImage {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
