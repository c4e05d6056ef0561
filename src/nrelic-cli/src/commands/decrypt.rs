//! Decrypt command handler

use anyhow::{Context, Result};
use nrelic::{DirectoryStore, Extractor};
use std::path::{Path, PathBuf};

use super::common::load_layout;
use crate::config::Config;
use crate::file_io::read_input;

/// Handle `decrypt`: write entries, image and sizes to `output_dir`
pub fn handle(input: &Path, output_dir: &Path, layout: Option<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    let layout = load_layout(config.layout_or(layout).as_deref())?;
    let archive = read_input(input)?;

    let mut store = DirectoryStore::new(output_dir);
    let image = Extractor::new(layout)
        .decrypt(&archive, &mut store)
        .with_context(|| format!("Failed to decrypt {}", input.display()))?;

    eprintln!(
        "Wrote {} entries ({} bytes) to {}",
        image.sizes().len(),
        image.len(),
        output_dir.display()
    );

    Ok(())
}
