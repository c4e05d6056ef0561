mod cli;
mod commands;
mod config;
mod file_io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn main() -> Result<()> {
    // Logs go to stderr so JSON on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nrelic=info,nrelic_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            output,
            compact,
            dump_dir,
            layout,
        } => {
            commands::extract::handle(&input, output.as_deref(), compact, dump_dir, layout)?;
        }

        Commands::Decrypt {
            input,
            output_dir,
            layout,
        } => {
            commands::decrypt::handle(&input, &output_dir, layout)?;
        }

        Commands::Scan {
            image,
            section,
            layout,
            output,
        } => {
            commands::scan::handle(&image, section, layout, output.as_deref())?;
        }

        Commands::Configure {
            layout,
            dump_dir,
            show,
        } => {
            commands::configure::handle(layout, dump_dir, show)?;
        }
    }

    Ok(())
}
