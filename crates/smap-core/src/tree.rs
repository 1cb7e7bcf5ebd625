//! Sitemap tree discovery: the recursive fetch/parse pipeline and the public
//! entry points.
//!
//! Discovery starts from a homepage URL, consults robots.txt and a fixed set
//! of well-known paths, and recursively expands every index-shaped sitemap it
//! finds. Recursion is guarded two ways: a depth limit, and a per-branch
//! ancestor URL set that catches direct and redirect cycles. A failure
//! anywhere isolates to one `Invalid` sibling; the rest of the tree is
//! unaffected.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::client::{HttpClient, WebClient};
use crate::fetch::fetch_url_document;
use crate::options::{CancelFlag, FetchOptions, RecurseCallback, RecurseListCallback};
use crate::page::Page;
use crate::parser::{parse_document, PagesFormat, ParsedDocument};
use crate::sitemap::{PageStore, Sitemap};
use crate::util::{is_http_url, strip_url_to_homepage};
use crate::{Error, Result};

/// Max. uncompressed sitemap size.
///
/// sitemaps.org allows up to 50 MB; go for the full 100 MB here.
const MAX_SITEMAP_SIZE: usize = 100 * 1024 * 1024;

/// Max. recursion level when iterating over sub-sitemaps, counting the
/// robots.txt or initial fetch as level 0.
const MAX_RECURSION_LEVEL: usize = 11;

/// Paths which are not exposed in robots.txt but might still contain a
/// sitemap.
const KNOWN_SITEMAP_PATHS: &[&str] = &[
    "sitemap.xml",
    "sitemap.xml.gz",
    "sitemap_index.xml",
    "sitemap-index.xml",
    "sitemap_index.xml.gz",
    "sitemap-index.xml.gz",
    ".sitemap.xml",
    "sitemap",
    "admin/config/search/xmlsitemap",
    "sitemap/sitemap-index.xml",
    "sitemap_news.xml",
    "sitemap-news.xml",
    "sitemap_news.xml.gz",
    "sitemap-news.xml.gz",
];

/// Per-branch state threaded through every recursive fetch.
#[derive(Clone)]
struct FetchContext {
    client: Arc<dyn WebClient>,
    recursion_level: usize,
    /// URLs currently being expanded along the branch leading here, both as
    /// requested and as resolved after redirects.
    ancestor_urls: HashSet<String>,
    recurse_callback: Option<RecurseCallback>,
    recurse_list_callback: Option<RecurseListCallback>,
    cancel: CancelFlag,
}

/// Using a homepage URL, fetch the tree of sitemaps and pages listed in them.
///
/// The returned root is a [`Sitemap::WebsiteIndex`] whose `url` is the
/// normalized homepage; its children are the sitemaps discovered through
/// robots.txt and the well-known paths, in discovery order.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] if `homepage_url` is not an HTTP(s) URL, and
/// [`Error::Network`] if the built-in web client cannot be constructed.
/// Failures of individual sitemaps never error; they become `Invalid` nodes
/// (or are skipped entirely for the speculative well-known paths).
pub async fn sitemap_tree_for_homepage(
    homepage_url: &str,
    options: &FetchOptions,
) -> Result<Sitemap> {
    if !is_http_url(homepage_url) {
        return Err(Error::InvalidUrl(format!(
            "URL {homepage_url} is not a HTTP(s) URL"
        )));
    }

    let homepage = if options.normalize_homepage_url {
        let stripped = strip_url_to_homepage(homepage_url)?;
        if stripped != homepage_url {
            tracing::warn!("Assuming that the homepage of {homepage_url} is {stripped}");
        }
        stripped
    } else {
        // Preserve the provided path; robots.txt and known paths resolve
        // relative to it with single-slash joins.
        let mut url = homepage_url.to_string();
        if !url.ends_with('/') {
            url.push('/');
        }
        url
    };

    let client: Arc<dyn WebClient> = match &options.web_client {
        Some(client) => Arc::clone(client),
        None => {
            let mut client = HttpClient::new()?;
            client.set_max_response_data_length(Some(MAX_SITEMAP_SIZE));
            Arc::new(client)
        }
    };

    let ctx = FetchContext {
        client,
        recursion_level: 0,
        ancestor_urls: HashSet::new(),
        recurse_callback: options.recurse_callback.clone(),
        recurse_list_callback: options.recurse_list_callback.clone(),
        cancel: options.cancel.clone(),
    };

    let mut sitemaps = Vec::new();
    let mut urls_found_in_robots_txt: HashSet<String> = HashSet::new();

    if options.use_robots {
        let robots_url = format!("{homepage}robots.txt");
        let robots_sitemap = fetch_and_parse(robots_url, ctx.clone()).await;

        if matches!(robots_sitemap, Sitemap::RobotsIndex { .. }) {
            for sub_sitemap in robots_sitemap.all_sitemaps() {
                urls_found_in_robots_txt.insert(sub_sitemap.url().to_string());
            }
        }

        if robots_sitemap.is_invalid() {
            tracing::info!(
                reason = %robots_sitemap.invalid_reason().unwrap_or_default(),
                "No usable robots.txt"
            );
        } else {
            sitemaps.push(robots_sitemap);
        }
    }

    if options.use_known_paths {
        let mut paths: Vec<String> = KNOWN_SITEMAP_PATHS
            .iter()
            .map(ToString::to_string)
            .collect();
        for extra in &options.extra_known_paths {
            if !paths.contains(extra) {
                paths.push(extra.clone());
            }
        }

        for path in paths {
            let candidate_url = format!("{homepage}{path}");

            // Don't refetch URLs already found in robots.txt
            if urls_found_in_robots_txt.contains(&candidate_url) {
                tracing::debug!(url = %candidate_url, "Known path already found in robots.txt");
                continue;
            }

            let node = fetch_and_parse(candidate_url, ctx.clone()).await;

            // Skip the ones that weren't found
            if node.is_invalid() {
                continue;
            }

            // A known path can 301 back to a sitemap discovered through
            // robots.txt; drop the duplicate silently.
            if urls_found_in_robots_txt.contains(node.url()) {
                tracing::debug!(
                    url = %node.url(),
                    "Known path redirected to a sitemap already found in robots.txt"
                );
                continue;
            }

            sitemaps.push(node);
        }
    }

    Ok(Sitemap::WebsiteIndex {
        url: homepage,
        sub_sitemaps: sitemaps,
    })
}

/// Parse a sitemap from a string.
///
/// Returns the parsed sitemap; since there is no web client to fetch with,
/// any sub-sitemaps of an index become [`Sitemap::Invalid`]. The returned
/// node's `url` is empty.
#[must_use]
pub fn sitemap_from_str(content: &str) -> Sitemap {
    match parse_document("", content) {
        ParsedDocument::Pages { format, pages } => build_pages_node(String::new(), format, &pages),
        ParsedDocument::XmlIndex { child_urls } => Sitemap::XmlIndex {
            url: String::new(),
            sub_sitemaps: unfetchable_children(child_urls),
        },
        ParsedDocument::RobotsIndex { child_urls } => Sitemap::RobotsIndex {
            url: String::new(),
            sub_sitemaps: unfetchable_children(child_urls),
        },
        ParsedDocument::Invalid { reason } => Sitemap::invalid("", reason),
    }
}

fn unfetchable_children(child_urls: Vec<String>) -> Vec<Sitemap> {
    child_urls
        .into_iter()
        .map(|url| {
            let reason = format!(
                "Unable to add sub-sitemap from URL {url}: no web client is available for recursive fetching"
            );
            Sitemap::invalid(url, reason)
        })
        .collect()
}

/// Fetch one sitemap URL and parse it, recursing into index children.
///
/// Owned arguments and a boxed future keep the recursion `Send`-compatible.
fn fetch_and_parse(url: String, ctx: FetchContext) -> BoxFuture<'static, Sitemap> {
    Box::pin(async move {
        if ctx.cancel.is_cancelled() {
            return Sitemap::invalid(url.clone(), format!("Fetch of {url} was cancelled"));
        }

        if ctx.recursion_level > MAX_RECURSION_LEVEL {
            return Sitemap::invalid(
                url.clone(),
                format!("Recursion level exceeded {MAX_RECURSION_LEVEL} for URL {url}"),
            );
        }

        if !is_http_url(&url) {
            return Sitemap::invalid(url.clone(), format!("URL {url} is not a HTTP(s) URL"));
        }

        if ctx.ancestor_urls.contains(&url) {
            return Sitemap::invalid(url.clone(), format!("Recursion detected in URL {url}"));
        }

        tracing::info!(url = %url, level = ctx.recursion_level, "Fetching sitemap");

        let document = match fetch_url_document(&url, ctx.client.as_ref(), &ctx.cancel).await {
            Ok(document) => document,
            Err(e) => {
                return Sitemap::invalid(
                    url.clone(),
                    format!("Unable to fetch sitemap from {url}: {}", e.message()),
                );
            }
        };

        // The fetch may have been redirected; the node anchors at the final
        // URL, and a redirect landing on an ancestor is a cycle.
        let final_url = document.final_url.unwrap_or_else(|| url.clone());
        if final_url != url && ctx.ancestor_urls.contains(&final_url) {
            return Sitemap::invalid(
                url.clone(),
                format!("Recursion detected when {url} redirected to {final_url}"),
            );
        }

        tracing::info!(url = %final_url, "Parsing sitemap");

        match parse_document(&final_url, &document.content) {
            ParsedDocument::Pages { format, pages } => build_pages_node(final_url, format, &pages),
            ParsedDocument::RobotsIndex { child_urls } => {
                // robots.txt children stay at the same recursion level; only
                // XML-index hops deepen the recursion.
                let sub_sitemaps = fetch_children(child_urls, &url, &final_url, &ctx, false).await;
                Sitemap::RobotsIndex {
                    url: final_url,
                    sub_sitemaps,
                }
            }
            ParsedDocument::XmlIndex { child_urls } => {
                let sub_sitemaps = fetch_children(child_urls, &url, &final_url, &ctx, true).await;
                Sitemap::XmlIndex {
                    url: final_url,
                    sub_sitemaps,
                }
            }
            ParsedDocument::Invalid { reason } => Sitemap::invalid(final_url, reason),
        }
    })
}

/// Recursively fetch the children of an index-shaped sitemap, one at a time,
/// under the branch's ancestor-set discipline and the caller's recursion
/// filters.
async fn fetch_children(
    child_urls: Vec<String>,
    parent_requested_url: &str,
    parent_final_url: &str,
    ctx: &FetchContext,
    deepen: bool,
) -> Vec<Sitemap> {
    let child_level = if deepen {
        ctx.recursion_level + 1
    } else {
        ctx.recursion_level
    };

    let mut ancestor_urls = ctx.ancestor_urls.clone();
    ancestor_urls.insert(parent_requested_url.to_string());
    ancestor_urls.insert(parent_final_url.to_string());

    let child_urls = match &ctx.recurse_list_callback {
        Some(callback) => callback(child_urls, child_level, &ancestor_urls),
        None => child_urls,
    };

    let mut children = Vec::new();
    for child_url in child_urls {
        if let Some(callback) = &ctx.recurse_callback {
            if !callback(&child_url, child_level, &ancestor_urls) {
                tracing::debug!(url = %child_url, "Sub-sitemap skipped by recurse callback");
                continue;
            }
        }

        let child_ctx = FetchContext {
            client: Arc::clone(&ctx.client),
            recursion_level: child_level,
            ancestor_urls: ancestor_urls.clone(),
            recurse_callback: ctx.recurse_callback.clone(),
            recurse_list_callback: ctx.recurse_list_callback.clone(),
            cancel: ctx.cancel.clone(),
        };
        children.push(fetch_and_parse(child_url, child_ctx).await);
    }
    children
}

fn build_pages_node(url: String, format: PagesFormat, pages: &[Page]) -> Sitemap {
    let store = match PageStore::new(pages) {
        Ok(store) => store,
        Err(e) => {
            return Sitemap::invalid(
                url.clone(),
                format!("Unable to store pages of sitemap {url}: {e}"),
            );
        }
    };

    match format {
        PagesFormat::Xml => Sitemap::PagesXml { url, pages: store },
        PagesFormat::Text => Sitemap::PagesText { url, pages: store },
        PagesFormat::Rss => Sitemap::PagesRss { url, pages: store },
        PagesFormat::Atom => Sitemap::PagesAtom { url, pages: store },
    }
}
