//! robots.txt parsing, limited to the `Sitemap:` directive.
//!
//! Everything else in the file (user agents, `Disallow` rules, comments) is
//! ignored. Matching is case-insensitive and tolerates the `Site-map:`
//! spelling, which Google's own parser accepts.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::util::is_http_url;

#[allow(clippy::expect_used)]
static SITEMAP_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*site-?map:\s*(.+?)\s*$").expect("directive regex compiles"));

/// Extract sitemap URLs from robots.txt content.
///
/// First-seen order is preserved and duplicates are dropped. Directive URLs
/// that are not HTTP(s) are logged and skipped.
pub(crate) fn parse_robots_txt(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for line in content.lines() {
        let Some(captures) = SITEMAP_DIRECTIVE.captures(line) else {
            continue;
        };
        let Some(url) = captures.get(1).map(|m| m.as_str().trim().to_string()) else {
            continue;
        };

        if !is_http_url(&url) {
            tracing::warn!(url = %url, "Sitemap URL doesn't look like an URL, skipping");
            continue;
        }

        if seen.insert(url.clone()) {
            urls.push(url);
        }
    }

    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_directives_in_order() {
        let content = "User-agent: *\n\
                       Disallow: /whatever\n\
                       \n\
                       Sitemap: http://x/sitemap_pages.xml\n\
                       Site-map: http://x/sitemap_news.xml\n";

        assert_eq!(
            parse_robots_txt(content),
            vec!["http://x/sitemap_pages.xml", "http://x/sitemap_news.xml"]
        );
    }

    #[test]
    fn test_case_insensitive_and_weird_spacing() {
        let content = "  sitemap:    http://x/a.xml   \n\
                       SITEMAP: http://x/b.xml\n\
                       SiTe-MaP:http://x/c.xml\n";

        assert_eq!(
            parse_robots_txt(content),
            vec!["http://x/a.xml", "http://x/b.xml", "http://x/c.xml"]
        );
    }

    #[test]
    fn test_deduplicates_preserving_first_seen() {
        let content = "Sitemap: http://x/a.xml\n\
                       Sitemap: http://x/b.xml\n\
                       Sitemap: http://x/a.xml\n";

        assert_eq!(
            parse_robots_txt(content),
            vec!["http://x/a.xml", "http://x/b.xml"]
        );
    }

    #[test]
    fn test_skips_non_http_urls() {
        let content = "Sitemap: ftp://x/a.xml\n\
                       Sitemap: not a url\n\
                       Sitemap: http://x/ok.xml\n";

        assert_eq!(parse_robots_txt(content), vec!["http://x/ok.xml"]);
    }

    #[test]
    fn test_ignores_other_directives() {
        let content = "User-agent: *\nDisallow: /\nCrawl-delay: 10\n";
        assert!(parse_robots_txt(content).is_empty());
    }

    #[test]
    fn test_empty_content() {
        assert!(parse_robots_txt("").is_empty());
    }
}
