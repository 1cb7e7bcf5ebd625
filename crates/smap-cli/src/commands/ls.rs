//! The `ls` command: download, parse and list the sitemap structure.

use anyhow::Result;
use smap_core::{sitemap_tree_for_homepage, FetchOptions};

use crate::cli::{LsArgs, LsFormat};
use crate::output;

/// Fetch the sitemap tree for the given URL and print it to stdout.
pub async fn run(args: &LsArgs) -> Result<()> {
    let mut options = FetchOptions::new();
    options.use_robots = !args.no_robots;
    options.use_known_paths = !args.no_known;

    let tree = sitemap_tree_for_homepage(&args.url, &options).await?;
    tracing::debug!(
        sitemaps = tree.all_sitemaps().count(),
        "Finished fetching sitemap tree"
    );

    let strip_prefix = if args.strip_url {
        tree.url().to_string()
    } else {
        String::new()
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        LsFormat::Tabtree => output::write_tabtree(&mut out, &tree, &strip_prefix)?,
        LsFormat::Pages => output::write_pages(&mut out, &tree, &strip_prefix)?,
    }

    Ok(())
}
