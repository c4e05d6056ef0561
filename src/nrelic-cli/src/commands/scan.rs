//! Scan command handler
//!
//! Runs the section stage against a memory image written by `decrypt` or
//! `extract --dump-dir`.

use anyhow::{Context, Result};
use nrelic::{DirectoryStore, Extractor};
use std::path::{Path, PathBuf};

use super::common::{load_layout, render_sets};
use crate::config::Config;
use crate::file_io::{read_input, write_output};

/// Read the image from a dump directory or a bare memory.sl2 file
fn load_image(path: &Path) -> Result<Vec<u8>> {
    if path.is_dir() {
        let image = DirectoryStore::load_image(path)
            .with_context(|| format!("Failed to load memory image from {}", path.display()))?;
        return Ok(image.as_bytes().to_vec());
    }
    read_input(path)
}

/// Handle `scan`
pub fn handle(
    image: &Path,
    section: Option<u8>,
    layout: Option<PathBuf>,
    output: Option<&Path>,
) -> Result<()> {
    let config = Config::load()?;
    let extractor = Extractor::new(load_layout(config.layout_or(layout).as_deref())?);
    let bytes = load_image(image)?;

    let sets = match section {
        Some(number) => vec![extractor
            .extract_section(&bytes, number)
            .with_context(|| format!("Failed to scan section {}", number))?],
        None => extractor.extract_image(&bytes),
    };

    write_output(output, &render_sets(&sets, false)?)
}
