//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up nrelic CLI defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Handle the configure command
pub fn handle(layout: Option<PathBuf>, dump_dir: Option<PathBuf>, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if layout.is_none() && dump_dir.is_none() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, layout, dump_dir);
    config.save()?;

    show_config(&config);
    Ok(())
}

fn apply(config: &mut Config, layout: Option<PathBuf>, dump_dir: Option<PathBuf>) {
    if let Some(path) = layout {
        config.layout = Some(path);
    }
    if let Some(dir) = dump_dir {
        config.dump_dir = Some(dir);
    }
}

/// Display current configuration
fn show_config(config: &Config) {
    match &config.layout {
        Some(path) => println!("Layout: {}", path.display()),
        None => println!("Layout: built-in (nightreign)"),
    }
    match &config.dump_dir {
        Some(dir) => println!("Dump directory: {}", dir.display()),
        None => println!("No dump directory configured"),
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: nrelic configure --layout LAYOUT.toml");
    println!("   or: nrelic configure --dump-dir DIR");
    println!("   or: nrelic configure --show");
}
