//! # smap-core
//!
//! Sitemap discovery and parsing for websites that publish their URL
//! inventory in any of the real-world sitemap dialects: robots.txt `Sitemap:`
//! directives, XML sitemaps and sitemap indexes (with the Google News, image
//! and hreflang extensions), plain-text URL lists, RSS 2.0 and Atom 0.3/1.0
//! feeds.
//!
//! Given a homepage URL, the engine locates candidate sitemaps via robots.txt
//! and a set of well-known paths, fetches each one (transparently handling
//! gzip, whether advertised honestly or not), detects its dialect, and builds
//! a uniform tree of sitemap nodes and page records. Real-world sitemaps are
//! malformed in every way imaginable; the engine's job is to tolerate that
//! and still produce a deterministic, testable model.
//!
//! ## Quick Start
//!
//! ```no_run
//! use smap_core::{sitemap_tree_for_homepage, FetchOptions};
//!
//! # async fn example() -> smap_core::Result<()> {
//! let tree = sitemap_tree_for_homepage("https://example.com/", &FetchOptions::new()).await?;
//!
//! for page in tree.all_pages() {
//!     println!("{}", page.url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Single documents can be parsed without any fetching:
//!
//! ```
//! use smap_core::sitemap_from_str;
//!
//! let node = sitemap_from_str(
//!     r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!         <url><loc>https://example.com/page</loc></url>
//!     </urlset>"#,
//! );
//! assert_eq!(node.all_pages().count(), 1);
//! ```
//!
//! ## Error handling
//!
//! A broken sitemap never fails the run: fetch and parse failures become
//! [`Sitemap::Invalid`] nodes carrying a reason string, isolated from their
//! siblings. Only caller mistakes (a non-HTTP homepage URL) surface as
//! [`Error`] values from the entry point.

/// Web client contract and the default `reqwest` implementation
pub mod client;
/// Error types and result alias
pub mod error;
/// Fetch helper: retries, gzip, BOM-tolerant decoding
mod fetch;
/// Discovery options, recursion callbacks and cancellation
pub mod options;
/// Page, news story, image and alternate records
pub mod page;
/// Format detection and the concrete document parsers
mod parser;
/// The sitemap tree model and its traversals
pub mod sitemap;
/// Tree discovery entry points and the recursion guard
mod tree;
/// Date and URL helpers
pub mod util;

pub use client::{HttpClient, WebClient, WebError, WebResponse, WebSuccess};
pub use error::{Error, Result};
pub use options::{CancelFlag, FetchOptions, RecurseCallback, RecurseListCallback};
pub use page::{Alternate, ChangeFrequency, Image, NewsStory, Page, DEFAULT_PRIORITY};
pub use sitemap::{AllPages, AllSitemaps, PageIter, PageStore, Sitemap};
pub use tree::{sitemap_from_str, sitemap_tree_for_homepage};
