//! Plain-text sitemap parsing: one page URL per line.

use std::collections::HashSet;

use crate::page::Page;
use crate::util::is_http_url;

/// Parse a plain-text sitemap into page records.
///
/// Lines are trimmed; empty and non-HTTP lines are skipped; duplicates keep
/// the first occurrence.
pub(crate) fn parse_plain_text(content: &str) -> Vec<Page> {
    let mut seen = HashSet::new();
    let mut pages = Vec::new();

    for line in content.lines() {
        let url = line.trim();
        if url.is_empty() {
            continue;
        }

        if !is_http_url(url) {
            tracing::warn!(url = %url, "Story URL doesn't look like an URL, skipping");
            continue;
        }

        if seen.insert(url.to_string()) {
            pages.push(Page::with_url(url));
        }
    }

    pages
}
