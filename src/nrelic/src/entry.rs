//! Entry decryption

use tracing::{debug, warn};

use crate::bnd4::EncryptedEntry;
use crate::crypto::{self, CryptoError};

/// Plaintext of one container entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedEntry {
    /// Index of the entry in the container's header table
    pub index: usize,
    /// `USERDATA_NN`
    pub name: String,
    pub data: Vec<u8>,
}

/// Decrypt one entry; its first 16 bytes are the IV
pub fn decrypt_entry(
    entry: &EncryptedEntry<'_>,
    key: &[u8; 16],
) -> Result<DecryptedEntry, CryptoError> {
    let (iv, ciphertext) = crypto::split_iv(entry.data)?;
    let data = crypto::decrypt(key, &iv, ciphertext)?;

    Ok(DecryptedEntry {
        index: entry.index,
        name: entry.name(),
        data,
    })
}

/// Decrypt every entry, keeping container order
///
/// Entries that fail to decrypt are logged and dropped; the caller decides
/// whether what is left is enough.
pub fn decrypt_all(entries: &[EncryptedEntry<'_>], key: &[u8; 16]) -> Vec<DecryptedEntry> {
    entries
        .iter()
        .filter_map(|entry| match decrypt_entry(entry, key) {
            Ok(decrypted) => {
                debug!(
                    index = entry.index,
                    stored_name = entry.stored_name.as_deref().unwrap_or("?"),
                    size = decrypted.data.len(),
                    "Decrypted entry"
                );
                Some(decrypted)
            }
            Err(e) => {
                warn!(index = entry.index, "Error decrypting entry: {}", e);
                None
            }
        })
        .collect()
}
