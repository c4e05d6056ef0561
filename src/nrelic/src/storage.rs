//! Persistence of decrypted entries and the memory image
//!
//! Extraction hands its intermediate results to an [`EntryStore`]. What the
//! store does with them is up to the caller: nothing, keep them in memory, or
//! write them to a dump directory that can be scanned again later.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::entry::DecryptedEntry;
use crate::image::MemoryImage;

/// File name of the concatenated image inside a dump directory
pub const MEMORY_FILE: &str = "memory.sl2";

/// File name of the JSON array of entry sizes inside a dump directory
pub const SIZES_FILE: &str = "userdata_sizes.json";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Refusing to clear {path}: it contains {name}, which is not a dump file")]
    ForeignContents { path: PathBuf, name: String },

    #[error("Entry sizes add up to {expected} bytes but the image has {found}")]
    SizeMismatch { expected: usize, found: usize },
}

/// Receives the intermediate results of an extraction
pub trait EntryStore {
    /// Called once before anything is stored
    fn reset(&mut self) -> Result<(), StorageError>;

    fn put_entry(&mut self, entry: &DecryptedEntry) -> Result<(), StorageError>;

    fn put_image(&mut self, image: &MemoryImage) -> Result<(), StorageError>;
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl EntryStore for NullStore {
    fn reset(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn put_entry(&mut self, _entry: &DecryptedEntry) -> Result<(), StorageError> {
        Ok(())
    }

    fn put_image(&mut self, _image: &MemoryImage) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Keeps copies in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub entries: Vec<DecryptedEntry>,
    pub image: Option<MemoryImage>,
    pub resets: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryStore for MemoryStore {
    fn reset(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        self.image = None;
        self.resets += 1;
        Ok(())
    }

    fn put_entry(&mut self, entry: &DecryptedEntry) -> Result<(), StorageError> {
        self.entries.push(entry.clone());
        Ok(())
    }

    fn put_image(&mut self, image: &MemoryImage) -> Result<(), StorageError> {
        self.image = Some(image.clone());
        Ok(())
    }
}

/// Writes a dump directory
///
/// Layout of the directory:
/// - `USERDATA_00` .. `USERDATA_NN`: decrypted entries
/// - `memory.sl2`: the concatenated image
/// - `userdata_sizes.json`: entry sizes in image order
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: PathBuf,
}

impl DirectoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectoryStore { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Load the image and entry sizes written by an earlier run
    pub fn load_image(dir: &Path) -> Result<MemoryImage, StorageError> {
        let data = fs::read(dir.join(MEMORY_FILE))?;
        let sizes: Vec<usize> = serde_json::from_str(&fs::read_to_string(dir.join(SIZES_FILE))?)?;
        let expected = sizes.iter().sum();
        let found = data.len();

        MemoryImage::from_parts(data, sizes).ok_or(StorageError::SizeMismatch { expected, found })
    }

    /// Whether `name` is something this store writes
    fn is_dump_file(name: &str) -> bool {
        if name == MEMORY_FILE || name == SIZES_FILE {
            return true;
        }
        name.strip_prefix("USERDATA_")
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    }
}

impl EntryStore for DirectoryStore {
    fn reset(&mut self) -> Result<(), StorageError> {
        if self.dir.exists() {
            for dirent in fs::read_dir(&self.dir)? {
                let name = dirent?.file_name().to_string_lossy().into_owned();
                if !Self::is_dump_file(&name) {
                    return Err(StorageError::ForeignContents {
                        path: self.dir.clone(),
                        name,
                    });
                }
            }
            fs::remove_dir_all(&self.dir)?;
        }
        fs::create_dir_all(&self.dir)?;
        debug!(dir = %self.dir.display(), "Reset dump directory");
        Ok(())
    }

    fn put_entry(&mut self, entry: &DecryptedEntry) -> Result<(), StorageError> {
        fs::write(self.dir.join(&entry.name), &entry.data)?;
        Ok(())
    }

    fn put_image(&mut self, image: &MemoryImage) -> Result<(), StorageError> {
        fs::write(self.dir.join(MEMORY_FILE), image.as_bytes())?;
        let sizes = serde_json::to_string(image.sizes())?;
        fs::write(self.dir.join(SIZES_FILE), sizes)?;
        debug!(
            dir = %self.dir.display(),
            bytes = image.len(),
            entries = image.sizes().len(),
            "Wrote memory image"
        );
        Ok(())
    }
}
