//! Save container entry encryption and decryption
//!
//! Every entry of a `.sl2` container is AES-128-CBC encrypted with one
//! key shared by all saves. The IV is stored in front of each entry's
//! ciphertext. No padding is applied: the full decrypted length is payload.

use aes::Aes128;
use cbc::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes128CbcEnc = cbc::Encryptor<Aes128>;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Length of the per-entry initialization vector
pub const IV_SIZE: usize = 16;

/// Key used for every entry of a Nightreign `.sl2` container
pub const SAVE_KEY: [u8; 16] = [
    0x18, 0xF6, 0x32, 0x66, 0x05, 0xBD, 0x17, 0x8A, 0x55, 0x24, 0x52, 0x3A, 0xC0, 0xA0, 0xC6, 0x09,
];

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Ciphertext size {0} is not a multiple of 16 bytes")]
    InvalidSize(usize),

    #[error("Entry of {0} bytes is too short to hold an IV")]
    MissingIv(usize),
}

/// Decrypt AES-128-CBC data without removing padding
pub fn decrypt(key: &[u8; 16], iv: &[u8; 16], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidSize(ciphertext.len()));
    }

    let mut buf = ciphertext.to_vec();
    Aes128CbcDec::new(&(*key).into(), &(*iv).into())
        .decrypt_padded_mut::<NoPadding>(&mut buf)
        .map_err(|_| CryptoError::InvalidSize(ciphertext.len()))?;

    Ok(buf)
}

/// Encrypt block-aligned plaintext with AES-128-CBC, no padding
pub fn encrypt(key: &[u8; 16], iv: &[u8; 16], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if plaintext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidSize(plaintext.len()));
    }

    let len = plaintext.len();
    let mut buf = plaintext.to_vec();
    Aes128CbcEnc::new(&(*key).into(), &(*iv).into())
        .encrypt_padded_mut::<NoPadding>(&mut buf, len)
        .map_err(|_| CryptoError::InvalidSize(len))?;

    Ok(buf)
}

/// Split an encrypted entry into its IV and ciphertext
pub fn split_iv(data: &[u8]) -> Result<([u8; IV_SIZE], &[u8]), CryptoError> {
    if data.len() < IV_SIZE {
        return Err(CryptoError::MissingIv(data.len()));
    }

    let (iv, ciphertext) = data.split_at(IV_SIZE);
    let mut out = [0u8; IV_SIZE];
    out.copy_from_slice(iv);
    Ok((out, ciphertext))
}
