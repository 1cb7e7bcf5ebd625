//! Logging initialisation driven by the global CLI flags.

use std::fs::File;
use std::sync::Arc;

use anyhow::Result;
use tracing::level_filters::LevelFilter;

use crate::cli::Cli;

/// Initialise the tracing subscriber.
///
/// Verbosity maps `-v` to info and `-vv` (or more) to debug; the default only
/// shows warnings so that the machine-readable stdout output stays clean.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_writer(Arc::new(file)).with_ansi(false).init();
        }
        None => {
            builder.with_writer(std::io::stderr).init();
        }
    }

    Ok(())
}
