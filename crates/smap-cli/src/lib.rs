//! smap CLI - discover and list a website's sitemap tree.
//!
//! Command implementations live in [`commands`]; argument definitions in
//! [`cli`]; plain-text rendering in [`output`].

use anyhow::Result;
use clap::Parser;

pub mod cli;
mod commands;
mod logging;
mod output;

use cli::{Cli, Commands};

/// Execute the smap CLI with the current process arguments.
///
/// # Errors
///
/// Returns an error if logging initialisation or the selected command fails.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize_logging(&cli)?;

    match &cli.command {
        Commands::Ls(args) => commands::ls::run(args).await,
    }
}
