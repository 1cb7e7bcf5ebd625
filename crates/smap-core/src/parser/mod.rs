//! Format detection and dispatch for fetched sitemap documents.
//!
//! MIME types returned in `Content-Type` are unpredictable, so the dispatcher
//! peeks into the decoded content instead: anything that starts with `<` goes
//! down the XML path (the concrete dialect is decided from the root element),
//! a non-XML body fetched from a `/robots.txt` path is parsed for `Sitemap:`
//! directives, and everything else is treated as a plain-text URL list.
//!
//! Parsers here are pure: they consume a decoded string and return data.
//! All fetching and recursion stays in [`crate::tree`].

pub(crate) mod robots;
pub(crate) mod text;
pub(crate) mod xml;

use url::Url;

use crate::page::Page;

/// Concrete format of a pages-bearing sitemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PagesFormat {
    Xml,
    Text,
    Rss,
    Atom,
}

/// Outcome of parsing one fetched document.
#[derive(Debug)]
pub(crate) enum ParsedDocument {
    /// robots.txt: the URLs named by `Sitemap:` directives, in first-seen
    /// order.
    RobotsIndex { child_urls: Vec<String> },
    /// `<sitemapindex>`: the referenced sitemap URLs, in first-seen order.
    XmlIndex { child_urls: Vec<String> },
    /// A pages-bearing document.
    Pages {
        format: PagesFormat,
        pages: Vec<Page>,
    },
    /// The document could not be dispatched or its root is unsupported.
    Invalid { reason: String },
}

/// Detect the format of `content` and parse it.
pub(crate) fn parse_document(url: &str, content: &str) -> ParsedDocument {
    let head: String = content.chars().take(20).collect();

    if head.trim().starts_with('<') {
        match xml::parse_xml_document(url, content) {
            xml::XmlDocument::Pages { format, pages } => ParsedDocument::Pages { format, pages },
            xml::XmlDocument::Index { child_urls } => ParsedDocument::XmlIndex { child_urls },
            xml::XmlDocument::Invalid { reason } => ParsedDocument::Invalid { reason },
        }
    } else if url_path_is_robots_txt(url) {
        ParsedDocument::RobotsIndex {
            child_urls: robots::parse_robots_txt(content),
        }
    } else {
        ParsedDocument::Pages {
            format: PagesFormat::Text,
            pages: text::parse_plain_text(content),
        }
    }
}

fn url_path_is_robots_txt(url: &str) -> bool {
    Url::parse(url).map_or_else(|_| url.ends_with("/robots.txt"), |parsed| {
        parsed.path().ends_with("/robots.txt")
    })
}
