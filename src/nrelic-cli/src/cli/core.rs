//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nrelic")]
#[command(about = "Nightreign relic extractor", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract every character's relics from a save file as JSON
    #[command(visible_alias = "x")]
    Extract {
        /// Path to the .sl2 save file ("-" reads stdin)
        input: PathBuf,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,

        /// Also write decrypted entries and the memory image here
        #[arg(long)]
        dump_dir: Option<PathBuf>,

        /// Layout file (TOML) describing section windows and anchors
        #[arg(long, env = "NRELIC_LAYOUT")]
        layout: Option<PathBuf>,
    },

    /// Decrypt a save file into a dump directory
    #[command(visible_alias = "d")]
    Decrypt {
        /// Path to the .sl2 save file ("-" reads stdin)
        input: PathBuf,

        /// Directory for USERDATA_NN, memory.sl2 and userdata_sizes.json
        output_dir: PathBuf,

        /// Layout file (TOML) describing section windows and anchors
        #[arg(long, env = "NRELIC_LAYOUT")]
        layout: Option<PathBuf>,
    },

    /// Scan a previously decrypted memory image
    #[command(visible_alias = "s")]
    Scan {
        /// memory.sl2 file, or the dump directory holding it
        image: PathBuf,

        /// Only scan this section
        #[arg(short, long)]
        section: Option<u8>,

        /// Layout file (TOML) describing section windows and anchors
        #[arg(long, env = "NRELIC_LAYOUT")]
        layout: Option<PathBuf>,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set the default layout file
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Set the default dump directory for extract
        #[arg(long)]
        dump_dir: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
