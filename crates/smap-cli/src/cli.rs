//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Discover and list website sitemaps.
#[derive(Debug, Parser)]
#[command(name = "smap", version, about = "Sitemap discovery and parsing")]
pub struct Cli {
    /// Increase log verbosity (-v: info, -vv: debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to a file instead of stderr
    #[arg(short = 'l', long = "log-file", global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download, parse and list the sitemap structure of a site
    Ls(LsArgs),
}

/// Arguments of the `ls` subcommand.
#[derive(Debug, Args)]
pub struct LsArgs {
    /// URL of the site including protocol
    pub url: String,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "tabtree")]
    pub format: LsFormat,

    /// Don't discover sitemaps through robots.txt
    #[arg(short = 'r', long = "no-robots")]
    pub no_robots: bool,

    /// Don't discover sitemaps through well-known URLs
    #[arg(short = 'k', long = "no-known")]
    pub no_known: bool,

    /// Strip the supplied URL from each page and sitemap URL
    #[arg(short = 'u', long = "strip-url")]
    pub strip_url: bool,
}

/// Output formats of the `ls` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LsFormat {
    /// Sitemaps and pages, nested with tab indentation
    Tabtree,
    /// Flat list of pages, one per line
    Pages,
}
