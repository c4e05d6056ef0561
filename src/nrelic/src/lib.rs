//! # nrelic
//!
//! Elden Ring Nightreign relic recovery - save decryption and relic scanning.
//!
//! This library provides functionality to:
//! - Split a BND4 `.sl2` save container into its encrypted entries
//! - Decrypt the entries and assemble them into one memory image
//! - Locate each character's section in the image by its name anchor
//! - Scan the section's slot records and decode every relic
//!
//! ## Example
//!
//! ```no_run
//! use std::fs;
//! use nrelic::{Extractor, Layout, NullStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = fs::read("NR0000.sl2")?;
//!
//! let extractor = Extractor::new(Layout::nightreign());
//! for set in extractor.extract(&archive, &mut NullStore)? {
//!     println!("{}: {} relics", set.character_name, set.relics.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod bnd4;
pub mod crypto;
pub mod entry;
pub mod extract;
pub mod image;
pub mod layout;
pub mod relic;
pub mod scanner;
pub mod section;
pub mod storage;

#[cfg(test)]
mod testutil;

// Re-export commonly used items
#[doc(inline)]
pub use bnd4::{EncryptedEntry, EntryError, FormatError};
#[doc(inline)]
pub use crypto::{CryptoError, SAVE_KEY};
#[doc(inline)]
pub use entry::DecryptedEntry;
#[doc(inline)]
pub use extract::{ExtractError, Extractor};
#[doc(inline)]
pub use image::MemoryImage;
#[doc(inline)]
pub use layout::{Layout, LayoutError, SectionWindow};
#[doc(inline)]
pub use relic::{CharacterRelicSet, RelicSlot};
#[doc(inline)]
pub use section::SectionError;
#[doc(inline)]
pub use storage::{DirectoryStore, EntryStore, MemoryStore, NullStore, StorageError};
