//! Helpers shared by the extraction commands

use anyhow::{bail, Context, Result};
use nrelic::{CharacterRelicSet, Layout};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a layout file, or the built-in layout if none is given
pub fn load_layout(path: Option<&Path>) -> Result<Layout> {
    let Some(path) = path else {
        return Ok(Layout::nightreign());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout from {}", path.display()))?;
    let layout: Layout = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse layout {}", path.display()))?;
    layout
        .validate()
        .with_context(|| format!("Invalid layout {}", path.display()))?;

    debug!(name = %layout.name, sections = layout.sections.len(), "Loaded layout");
    Ok(layout)
}

/// Serialize relic sets as JSON, failing if there is nothing to report
pub fn render_sets(sets: &[CharacterRelicSet], compact: bool) -> Result<Vec<u8>> {
    if sets.iter().all(|s| s.relics.is_empty()) {
        bail!("No relic data found");
    }

    let mut json = if compact {
        serde_json::to_vec(sets)
    } else {
        serde_json::to_vec_pretty(sets)
    }
    .context("Failed to serialize relic data")?;
    json.push(b'\n');

    Ok(json)
}
