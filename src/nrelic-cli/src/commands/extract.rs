//! Extract command handler

use anyhow::{Context, Result};
use nrelic::{DirectoryStore, EntryStore, Extractor, NullStore};
use std::path::{Path, PathBuf};
use tracing::info;

use super::common::{load_layout, render_sets};
use crate::config::Config;
use crate::file_io::{read_input, write_output};

/// Handle `extract`
pub fn handle(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    dump_dir: Option<PathBuf>,
    layout: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load()?;
    let layout = load_layout(config.layout_or(layout).as_deref())?;
    let archive = read_input(input)?;

    let mut store: Box<dyn EntryStore> = match config.dump_dir_or(dump_dir) {
        Some(dir) => {
            info!(dir = %dir.display(), "Writing decrypted entries");
            Box::new(DirectoryStore::new(dir))
        }
        None => Box::new(NullStore),
    };

    let sets = Extractor::new(layout)
        .extract(&archive, store.as_mut())
        .with_context(|| format!("Failed to extract relics from {}", input.display()))?;

    let json = render_sets(&sets, compact)?;
    write_output(output, &json)?;

    let total: usize = sets.iter().map(|s| s.relics.len()).sum();
    eprintln!("Recovered {} relics from {} characters", total, sets.len());

    Ok(())
}
