//! Plain-text rendering of a sitemap tree.

use std::io::{self, Write};

use smap_core::Sitemap;

/// Write the tree with tab indentation: each sitemap on its own line, pages
/// one level below the sitemap they came from.
pub fn write_tabtree(out: &mut impl Write, sitemap: &Sitemap, strip_prefix: &str) -> io::Result<()> {
    write_tabtree_node(out, sitemap, strip_prefix, 0)
}

fn write_tabtree_node(
    out: &mut impl Write,
    node: &Sitemap,
    strip_prefix: &str,
    depth: usize,
) -> io::Result<()> {
    // The root keeps its full URL; everything below it can be stripped.
    let url = if depth == 0 {
        node.url().to_string()
    } else {
        strip_url(node.url(), strip_prefix)
    };
    writeln!(out, "{}{}", "\t".repeat(depth), url)?;

    for sub_sitemap in node.sub_sitemaps() {
        write_tabtree_node(out, sub_sitemap, strip_prefix, depth + 1)?;
    }

    for page in node.pages() {
        writeln!(out, "{}{}", "\t".repeat(depth + 1), strip_url(&page.url, strip_prefix))?;
    }

    Ok(())
}

/// Write a flat list of page URLs, one per line.
pub fn write_pages(out: &mut impl Write, sitemap: &Sitemap, strip_prefix: &str) -> io::Result<()> {
    for page in sitemap.all_pages() {
        writeln!(out, "{}", strip_url(&page.url, strip_prefix))?;
    }
    Ok(())
}

/// Remove `prefix` from `url`, keeping the result rooted at `/`.
fn strip_url(url: &str, prefix: &str) -> String {
    let stripped = url.strip_prefix(prefix).unwrap_or(url);
    if prefix.is_empty() || stripped.starts_with('/') {
        stripped.to_string()
    } else {
        format!("/{stripped}")
    }
}
