//! The sitemap tree model.
//!
//! Every discovered document becomes one [`Sitemap`] node: indexes carry
//! child nodes, pages-bearing sitemaps carry page records, and anything that
//! could not be fetched or parsed becomes an [`Invalid`](Sitemap::Invalid)
//! node with a reason string. Nodes are immutable once built.
//!
//! Pages-bearing nodes spill their page list to a temp file at construction
//! and rehydrate it on every read, which keeps resident memory bounded while
//! traversing very large sitemaps. Serialization bundles the page content
//! in-band, so a deserialized tree works without the original temp file.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::page::Page;
use crate::Result;

/// Out-of-core storage for one sitemap's page list.
///
/// Pages are written to a [`NamedTempFile`] as JSON lines when the store is
/// created; every [`iter`](PageStore::iter) call reopens the file and
/// deserializes lazily. The temp file is removed when the store is dropped.
#[derive(Debug)]
pub struct PageStore {
    file: NamedTempFile,
    len: usize,
}

impl PageStore {
    /// Spill `pages` to a fresh temp file.
    pub fn new(pages: &[Page]) -> Result<Self> {
        let mut file = NamedTempFile::new()?;
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            for page in pages {
                serde_json::to_writer(&mut writer, page)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        Ok(Self {
            file,
            len: pages.len(),
        })
    }

    /// Number of pages in the store.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the store holds no pages.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Lazily iterate over the stored pages, in insertion order.
    ///
    /// Each call opens an independent read handle, so concurrent iterations
    /// do not disturb each other. If the backing file cannot be reopened the
    /// error is logged and the iterator is empty.
    #[must_use]
    pub fn iter(&self) -> PageIter {
        match self.file.reopen() {
            Ok(file) => PageIter {
                lines: Some(BufReader::new(file).lines()),
            },
            Err(e) => {
                tracing::error!(error = %e, "Unable to reopen page store temp file");
                PageIter::empty()
            }
        }
    }

    /// Collect all stored pages into a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Page> {
        self.iter().collect()
    }
}

impl PartialEq for PageStore {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.to_vec() == other.to_vec()
    }
}

impl Serialize for PageStore {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for PageStore {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let pages = Vec::<Page>::deserialize(deserializer)?;
        Self::new(&pages).map_err(serde::de::Error::custom)
    }
}

/// Iterator over pages rehydrated from a [`PageStore`].
#[derive(Debug)]
pub struct PageIter {
    lines: Option<std::io::Lines<BufReader<File>>>,
}

impl PageIter {
    pub(crate) const fn empty() -> Self {
        Self { lines: None }
    }
}

impl Iterator for PageIter {
    type Item = Page;

    fn next(&mut self) -> Option<Page> {
        let lines = self.lines.as_mut()?;
        loop {
            match lines.next()? {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str(&line) {
                        Ok(page) => return Some(page),
                        Err(e) => {
                            tracing::error!(error = %e, "Corrupt page store entry");
                            self.lines = None;
                            return None;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Unable to read page store temp file");
                    self.lines = None;
                    return None;
                }
            }
        }
    }
}

/// One node of the sitemap tree.
///
/// Exactly one of `sub_sitemaps`, `pages` or `reason` is present per node;
/// the traversal helpers treat the absent collections as empty.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Sitemap {
    /// Synthetic root wrapping all sitemaps discovered for a website. Its
    /// `url` is the normalized homepage.
    WebsiteIndex {
        /// Normalized homepage URL, ending in `/`.
        url: String,
        /// Discovered top-level sitemaps, in discovery order.
        sub_sitemaps: Vec<Sitemap>,
    },
    /// robots.txt with its `Sitemap:` directives expanded.
    RobotsIndex {
        /// URL the robots.txt was fetched from.
        url: String,
        /// Sitemaps named by `Sitemap:` directives, in first-seen order.
        sub_sitemaps: Vec<Sitemap>,
    },
    /// `<sitemapindex>` document referencing other sitemaps.
    XmlIndex {
        /// URL the index was fetched from (post-redirect).
        url: String,
        /// Referenced sitemaps, in first-seen order.
        sub_sitemaps: Vec<Sitemap>,
    },
    /// `<urlset>` document with page entries.
    PagesXml {
        /// URL the sitemap was fetched from (post-redirect).
        url: String,
        /// Page records, in document order.
        pages: PageStore,
    },
    /// Plain-text sitemap, one page URL per line.
    PagesText {
        /// URL the sitemap was fetched from (post-redirect).
        url: String,
        /// Page records, in document order.
        pages: PageStore,
    },
    /// RSS 2.0 feed treated as a sitemap.
    PagesRss {
        /// URL the feed was fetched from (post-redirect).
        url: String,
        /// Page records, in document order.
        pages: PageStore,
    },
    /// Atom 0.3 / 1.0 feed treated as a sitemap.
    PagesAtom {
        /// URL the feed was fetched from (post-redirect).
        url: String,
        /// Page records, in document order.
        pages: PageStore,
    },
    /// A sitemap that could not be fetched or parsed.
    Invalid {
        /// URL that was attempted.
        url: String,
        /// Why the sitemap is deemed invalid.
        reason: String,
    },
}

impl Sitemap {
    /// Shorthand for building an [`Invalid`](Sitemap::Invalid) node.
    #[must_use]
    pub fn invalid(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// The URL this node was fetched from (the normalized homepage for the
    /// synthetic website index).
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::WebsiteIndex { url, .. }
            | Self::RobotsIndex { url, .. }
            | Self::XmlIndex { url, .. }
            | Self::PagesXml { url, .. }
            | Self::PagesText { url, .. }
            | Self::PagesRss { url, .. }
            | Self::PagesAtom { url, .. }
            | Self::Invalid { url, .. } => url,
        }
    }

    /// Whether this node is [`Invalid`](Sitemap::Invalid).
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }

    /// The invalidity reason, for [`Invalid`](Sitemap::Invalid) nodes.
    #[must_use]
    pub fn invalid_reason(&self) -> Option<&str> {
        match self {
            Self::Invalid { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Child sitemaps of this node; empty for non-index nodes.
    #[must_use]
    pub fn sub_sitemaps(&self) -> &[Self] {
        match self {
            Self::WebsiteIndex { sub_sitemaps, .. }
            | Self::RobotsIndex { sub_sitemaps, .. }
            | Self::XmlIndex { sub_sitemaps, .. } => sub_sitemaps,
            _ => &[],
        }
    }

    /// This node's own page store, for pages-bearing nodes.
    #[must_use]
    pub fn page_store(&self) -> Option<&PageStore> {
        match self {
            Self::PagesXml { pages, .. }
            | Self::PagesText { pages, .. }
            | Self::PagesRss { pages, .. }
            | Self::PagesAtom { pages, .. } => Some(pages),
            _ => None,
        }
    }

    /// Lazily iterate over this node's own pages; empty for non-pages nodes.
    #[must_use]
    pub fn pages(&self) -> PageIter {
        self.page_store().map_or_else(PageIter::empty, PageStore::iter)
    }

    /// Lazily iterate over every page reachable from this node.
    ///
    /// Depth-first, pre-order, children left-to-right; pages appear in
    /// document order. Intermediate page lists are never materialized.
    #[must_use]
    pub fn all_pages(&self) -> AllPages<'_> {
        AllPages {
            stack: vec![self],
            current: None,
        }
    }

    /// Lazily iterate over every descendant sitemap node, excluding `self`.
    ///
    /// Same depth-first pre-order as [`all_pages`](Self::all_pages).
    #[must_use]
    pub fn all_sitemaps(&self) -> AllSitemaps<'_> {
        AllSitemaps {
            stack: self.sub_sitemaps().iter().rev().collect(),
        }
    }

    /// Deterministic serializable form of the tree.
    ///
    /// With `with_pages` the result round-trips through
    /// [`serde_json::from_value`] back into an equivalent tree; without it the
    /// page lists are omitted (index structure and reasons only).
    pub fn to_value(&self, with_pages: bool) -> Result<serde_json::Value> {
        if with_pages {
            return Ok(serde_json::to_value(self)?);
        }

        let mut map = serde_json::Map::new();
        map.insert("type".to_string(), self.type_name().into());
        map.insert("url".to_string(), self.url().into());
        match self {
            Self::WebsiteIndex { sub_sitemaps, .. }
            | Self::RobotsIndex { sub_sitemaps, .. }
            | Self::XmlIndex { sub_sitemaps, .. } => {
                let children = sub_sitemaps
                    .iter()
                    .map(|child| child.to_value(false))
                    .collect::<Result<Vec<_>>>()?;
                map.insert("sub_sitemaps".to_string(), children.into());
            }
            Self::Invalid { reason, .. } => {
                map.insert("reason".to_string(), reason.as_str().into());
            }
            _ => {}
        }
        Ok(serde_json::Value::Object(map))
    }

    const fn type_name(&self) -> &'static str {
        match self {
            Self::WebsiteIndex { .. } => "website_index",
            Self::RobotsIndex { .. } => "robots_index",
            Self::XmlIndex { .. } => "xml_index",
            Self::PagesXml { .. } => "pages_xml",
            Self::PagesText { .. } => "pages_text",
            Self::PagesRss { .. } => "pages_rss",
            Self::PagesAtom { .. } => "pages_atom",
            Self::Invalid { .. } => "invalid",
        }
    }
}

/// Lazy depth-first iterator over every page under a node.
#[derive(Debug)]
pub struct AllPages<'a> {
    stack: Vec<&'a Sitemap>,
    current: Option<PageIter>,
}

impl Iterator for AllPages<'_> {
    type Item = Page;

    fn next(&mut self) -> Option<Page> {
        loop {
            if let Some(iter) = &mut self.current {
                if let Some(page) = iter.next() {
                    return Some(page);
                }
                self.current = None;
            }

            let node = self.stack.pop()?;
            if let Some(store) = node.page_store() {
                self.current = Some(store.iter());
            } else {
                self.stack.extend(node.sub_sitemaps().iter().rev());
            }
        }
    }
}

/// Lazy depth-first pre-order iterator over descendant sitemap nodes.
#[derive(Debug)]
pub struct AllSitemaps<'a> {
    stack: Vec<&'a Sitemap>,
}

impl<'a> Iterator for AllSitemaps<'a> {
    type Item = &'a Sitemap;

    fn next(&mut self) -> Option<&'a Sitemap> {
        let node = self.stack.pop()?;
        self.stack.extend(node.sub_sitemaps().iter().rev());
        Some(node)
    }
}
