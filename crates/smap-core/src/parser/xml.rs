//! Streaming XML sitemap parsers.
//!
//! One event loop drives four concrete state machines, picked from the root
//! element: `<urlset>` (pages, with Google News / image / hreflang
//! extensions), `<sitemapindex>` (index), `<rss>` (RSS 2.0) and `<feed>`
//! (Atom 0.3 / 1.0).
//!
//! Element names are normalized to logical namespace prefixes derived from
//! the namespace URI (`sitemap:`, `news:`, `image:`, `video:`); elements in
//! unknown namespaces keep their bare local name. A `<urlset>` or
//! `<sitemapindex>` without the expected xmlns is accepted leniently, with
//! its children treated as sitemap-namespace elements.
//!
//! Parse errors never discard already-parsed entries: some webservers time
//! out while generating huge sitemaps and truncate the document mid-element,
//! so whatever completed before the error is kept.

use std::collections::HashSet;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};

use crate::page::{Alternate, ChangeFrequency, Image, NewsStory, Page, DEFAULT_PRIORITY};
use crate::parser::PagesFormat;
use crate::util::{is_http_url, parse_iso8601_date, parse_rfc2822_date};

/// Outcome of parsing one XML document.
#[derive(Debug)]
pub(crate) enum XmlDocument {
    /// A pages-bearing document (urlset, RSS or Atom).
    Pages {
        format: PagesFormat,
        pages: Vec<Page>,
    },
    /// A `<sitemapindex>`; children are returned as URLs for the caller to
    /// fetch.
    Index { child_urls: Vec<String> },
    /// The root element is unsupported or was never seen.
    Invalid { reason: String },
}

/// Parse an XML sitemap document of any supported dialect.
pub(crate) fn parse_xml_document(url: &str, content: &str) -> XmlDocument {
    let mut reader = NsReader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut machine: Option<Machine> = None;
    // Last encountered character data; successive text/CDATA events are
    // concatenated because entities can split what is logically one string.
    let mut text = String::new();

    loop {
        match reader.read_resolved_event() {
            Ok((resolution, Event::Start(e))) => {
                text.clear();
                let name = normalize_element_name(
                    &resolution,
                    e.local_name().as_ref(),
                    bare_as_sitemap(machine.as_ref()),
                );
                match &mut machine {
                    Some(m) => m.handle_start(&name, &e),
                    None => match machine_for_root(&name) {
                        Ok(m) => machine = Some(m),
                        Err(reason) => return XmlDocument::Invalid { reason },
                    },
                }
            }
            Ok((resolution, Event::Empty(e))) => {
                text.clear();
                let name = normalize_element_name(
                    &resolution,
                    e.local_name().as_ref(),
                    bare_as_sitemap(machine.as_ref()),
                );
                match &mut machine {
                    Some(m) => {
                        m.handle_start(&name, &e);
                        m.handle_end(&name, "");
                    }
                    None => match machine_for_root(&name) {
                        Ok(m) => machine = Some(m),
                        Err(reason) => return XmlDocument::Invalid { reason },
                    },
                }
            }
            Ok((resolution, Event::End(e))) => {
                let name = normalize_element_name(
                    &resolution,
                    e.local_name().as_ref(),
                    bare_as_sitemap(machine.as_ref()),
                );
                if let Some(m) = &mut machine {
                    m.handle_end(&name, &text);
                }
                text.clear();
            }
            Ok((_, Event::Text(e))) => match e.unescape() {
                Ok(chunk) => text.push_str(&chunk),
                Err(e) => {
                    tracing::warn!("Parsing sitemap from URL {url} failed: {e}");
                    break;
                }
            },
            Ok((_, Event::CData(e))) => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Parsing sitemap from URL {url} failed: {e}");
                break;
            }
        }
    }

    machine.map_or_else(
        || XmlDocument::Invalid {
            reason: format!("No parsers support sitemap from {url}"),
        },
        Machine::finish,
    )
}

fn bare_as_sitemap(machine: Option<&Machine>) -> bool {
    machine.is_some_and(Machine::assumes_sitemap_namespace)
}

/// Map a namespace URI plus local name to a logical element name.
///
/// `http://www.sitemaps.org/schemas/sitemap/0.9 loc` becomes `sitemap:loc`,
/// the Google News and image extension namespaces become `news:` / `image:`,
/// video is recognized (and later ignored), and anything else keeps its bare
/// local name. With `bare_as_sitemap`, un-namespaced elements are promoted
/// into the sitemap namespace (the missing-xmlns leniency).
fn normalize_element_name(
    resolution: &ResolveResult<'_>,
    local_name: &[u8],
    bare_as_sitemap: bool,
) -> String {
    let local = String::from_utf8_lossy(local_name);

    if let ResolveResult::Bound(Namespace(uri)) = resolution {
        let uri = String::from_utf8_lossy(uri);
        if uri.contains("/sitemap/") {
            return format!("sitemap:{local}");
        }
        if uri.contains("/sitemap-news/") {
            return format!("news:{local}");
        }
        if uri.contains("/sitemap-image/") {
            return format!("image:{local}");
        }
        if uri.contains("/sitemap-video/") {
            return format!("video:{local}");
        }
        return local.into_owned();
    }

    if bare_as_sitemap {
        format!("sitemap:{local}")
    } else {
        local.into_owned()
    }
}

fn machine_for_root(name: &str) -> Result<Machine, String> {
    match name {
        "sitemap:urlset" => Ok(Machine::Urlset(UrlsetParser::new(false))),
        "urlset" => {
            tracing::debug!("<urlset> detected without expected xmlns");
            Ok(Machine::Urlset(UrlsetParser::new(true)))
        }
        "sitemap:sitemapindex" => Ok(Machine::Index(IndexParser::new(false))),
        "sitemapindex" => {
            tracing::debug!("<sitemapindex> detected without expected xmlns");
            Ok(Machine::Index(IndexParser::new(true)))
        }
        "rss" => Ok(Machine::Rss(RssParser::new())),
        "feed" => Ok(Machine::Atom(AtomParser::new())),
        other => Err(format!("Unsupported root element '{other}'.")),
    }
}

/// Trim character data and decode nothing further (entities were handled by
/// the reader); empty strings become `None` so that present-but-empty
/// elements leave their field unset.
fn clean(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn attr_value(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == name {
            if let Ok(value) = attr.unescape_value() {
                return Some(value.into_owned());
            }
        }
    }
    None
}

fn split_comma_list(value: Option<&str>) -> Vec<String> {
    value.map_or_else(Vec::new, |s| {
        s.split(',').map(|item| item.trim().to_string()).collect()
    })
}

/// The concrete parser picked from the root element.
enum Machine {
    Urlset(UrlsetParser),
    Index(IndexParser),
    Rss(RssParser),
    Atom(AtomParser),
}

impl Machine {
    const fn assumes_sitemap_namespace(&self) -> bool {
        match self {
            Self::Urlset(p) => p.bare_as_sitemap,
            Self::Index(p) => p.bare_as_sitemap,
            _ => false,
        }
    }

    fn handle_start(&mut self, name: &str, e: &BytesStart<'_>) {
        match self {
            Self::Urlset(p) => p.handle_start(name, e),
            Self::Index(_) => {}
            Self::Rss(p) => p.handle_start(name),
            Self::Atom(p) => p.handle_start(name, e),
        }
    }

    fn handle_end(&mut self, name: &str, text: &str) {
        match self {
            Self::Urlset(p) => p.handle_end(name, text),
            Self::Index(p) => p.handle_end(name, text),
            Self::Rss(p) => p.handle_end(name, text),
            Self::Atom(p) => p.handle_end(name, text),
        }
    }

    fn finish(self) -> XmlDocument {
        match self {
            Self::Urlset(p) => XmlDocument::Pages {
                format: PagesFormat::Xml,
                pages: p.pages,
            },
            Self::Index(p) => XmlDocument::Index { child_urls: p.urls },
            Self::Rss(p) => XmlDocument::Pages {
                format: PagesFormat::Rss,
                pages: p.pages,
            },
            Self::Atom(p) => XmlDocument::Pages {
                format: PagesFormat::Atom,
                pages: p.pages,
            },
        }
    }
}

// --- <urlset> ---------------------------------------------------------------

#[derive(Default)]
struct ImageBuilder {
    loc: Option<String>,
    caption: Option<String>,
    geo_location: Option<String>,
    title: Option<String>,
    license: Option<String>,
}

impl ImageBuilder {
    fn build(self) -> Option<Image> {
        let Some(loc) = self.loc else {
            tracing::warn!("Image location is unset, dropping image");
            return None;
        };
        Some(Image {
            loc,
            caption: self.caption,
            geo_location: self.geo_location,
            title: self.title,
            license: self.license,
        })
    }
}

/// Accumulates one `<url>` entry while parsing.
#[derive(Default)]
struct PageBuilder {
    loc: Option<String>,
    last_modified: Option<String>,
    change_frequency: Option<String>,
    priority: Option<String>,
    news_title: Option<String>,
    news_publish_date: Option<String>,
    news_publication_name: Option<String>,
    news_publication_language: Option<String>,
    news_access: Option<String>,
    news_genres: Option<String>,
    news_keywords: Option<String>,
    news_stock_tickers: Option<String>,
    images: Vec<Image>,
    current_image: Option<ImageBuilder>,
    alternates: Vec<Alternate>,
}

impl PageBuilder {
    /// Return the constructed page if the entry was complete, otherwise None.
    fn build(self) -> Option<Page> {
        let Some(url) = self.loc else {
            tracing::error!("URL is unset");
            return None;
        };

        let last_modified = self.last_modified.as_deref().and_then(parse_iso8601_date);

        let change_frequency = self.change_frequency.map(|value| {
            value.parse::<ChangeFrequency>().unwrap_or_else(|_| {
                tracing::warn!(value = %value, "Invalid change frequency, defaulting to 'always'");
                ChangeFrequency::Always
            })
        });

        let priority = match self.priority {
            None => DEFAULT_PRIORITY,
            Some(value) => match value.parse::<f64>() {
                Ok(p) if (0.0..=1.0).contains(&p) => p,
                Ok(p) => {
                    tracing::warn!("Priority is not within 0 and 1: {p}");
                    DEFAULT_PRIORITY
                }
                Err(_) => {
                    tracing::warn!(value = %value, "Unparseable priority");
                    DEFAULT_PRIORITY
                }
            },
        };

        let publish_date = self.news_publish_date.as_deref().and_then(parse_iso8601_date);
        let news_story = match (self.news_title, publish_date) {
            (Some(title), Some(publish_date)) => Some(NewsStory {
                title,
                publish_date,
                publication_name: self.news_publication_name,
                publication_language: self.news_publication_language,
                access: self.news_access,
                genres: split_comma_list(self.news_genres.as_deref()),
                keywords: split_comma_list(self.news_keywords.as_deref()),
                stock_tickers: split_comma_list(self.news_stock_tickers.as_deref()),
            }),
            _ => None,
        };

        Some(Page {
            url,
            priority,
            last_modified,
            change_frequency,
            news_story,
            images: if self.images.is_empty() {
                None
            } else {
                Some(self.images)
            },
            alternates: if self.alternates.is_empty() {
                None
            } else {
                Some(self.alternates)
            },
        })
    }
}

struct UrlsetParser {
    bare_as_sitemap: bool,
    pages: Vec<Page>,
    seen_urls: HashSet<String>,
    current: Option<PageBuilder>,
    unknown_logged: HashSet<String>,
}

impl UrlsetParser {
    fn new(bare_as_sitemap: bool) -> Self {
        Self {
            bare_as_sitemap,
            pages: Vec::new(),
            seen_urls: HashSet::new(),
            current: None,
            unknown_logged: HashSet::new(),
        }
    }

    fn handle_start(&mut self, name: &str, e: &BytesStart<'_>) {
        match name {
            "sitemap:url" => {
                self.current = Some(PageBuilder::default());
            }
            "image:image" => {
                if let Some(page) = &mut self.current {
                    page.current_image = Some(ImageBuilder::default());
                }
            }
            // <xhtml:link rel="alternate" hreflang=".." href=".."/>; the
            // xhtml namespace is not one of ours, so the name comes through
            // bare. All three attributes are required for an alternate.
            "link" => {
                if let Some(page) = &mut self.current {
                    let rel = attr_value(e, b"rel");
                    if rel.as_deref().is_some_and(|r| r.eq_ignore_ascii_case("alternate")) {
                        if let (Some(hreflang), Some(href)) =
                            (attr_value(e, b"hreflang"), attr_value(e, b"href"))
                        {
                            page.alternates.push(Alternate { hreflang, href });
                        }
                    }
                }
            }
            "sitemap:urlset" | "news:news" | "news:publication" => {}
            other if other.starts_with("sitemap:")
                || other.starts_with("news:")
                || other.starts_with("image:") => {}
            other => {
                if self.current.is_some() && self.unknown_logged.insert(other.to_string()) {
                    tracing::debug!(element = %other, "Ignoring unknown element in <url>");
                }
            }
        }
    }

    fn handle_end(&mut self, name: &str, text: &str) {
        if name == "sitemap:url" {
            if let Some(builder) = self.current.take() {
                if let Some(page) = builder.build() {
                    if self.seen_urls.insert(page.url.clone()) {
                        self.pages.push(page);
                    }
                }
            }
            return;
        }

        let Some(page) = &mut self.current else {
            return;
        };

        match name {
            "sitemap:loc" => page.loc = clean(text),
            "sitemap:lastmod" => page.last_modified = clean(text),
            "sitemap:changefreq" => page.change_frequency = clean(text),
            "sitemap:priority" => page.priority = clean(text),
            // news:publication/name and news:publication/language
            "news:name" => page.news_publication_name = clean(text),
            "news:language" => page.news_publication_language = clean(text),
            "news:publication_date" => page.news_publish_date = clean(text),
            "news:title" => page.news_title = clean(text),
            "news:access" => page.news_access = clean(text),
            "news:genres" => page.news_genres = clean(text),
            "news:keywords" => page.news_keywords = clean(text),
            "news:stock_tickers" => page.news_stock_tickers = clean(text),
            "image:image" => {
                if let Some(image) = page.current_image.take() {
                    if let Some(image) = image.build() {
                        page.images.push(image);
                    }
                }
            }
            "image:loc" => {
                if let Some(image) = &mut page.current_image {
                    image.loc = clean(text);
                }
            }
            "image:caption" => {
                if let Some(image) = &mut page.current_image {
                    image.caption = clean(text);
                }
            }
            "image:geo_location" => {
                if let Some(image) = &mut page.current_image {
                    image.geo_location = clean(text);
                }
            }
            "image:title" => {
                if let Some(image) = &mut page.current_image {
                    image.title = clean(text);
                }
            }
            "image:license" => {
                if let Some(image) = &mut page.current_image {
                    image.license = clean(text);
                }
            }
            _ => {}
        }
    }
}

// --- <sitemapindex> ---------------------------------------------------------

struct IndexParser {
    bare_as_sitemap: bool,
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl IndexParser {
    fn new(bare_as_sitemap: bool) -> Self {
        Self {
            bare_as_sitemap,
            urls: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn handle_end(&mut self, name: &str, text: &str) {
        if name != "sitemap:loc" {
            return;
        }

        let Some(url) = clean(text) else {
            return;
        };

        if !is_http_url(&url) {
            tracing::warn!(url = %url, "Sub-sitemap URL does not look like one");
            return;
        }

        if self.seen.insert(url.clone()) {
            self.urls.push(url);
        }
    }
}

// --- RSS 2.0 and Atom 0.3 / 1.0 ---------------------------------------------

/// Accumulates one `<item>` / `<entry>` while parsing; shared between the RSS
/// and Atom parsers since their shapes only differ in element names.
#[derive(Default)]
struct FeedItemBuilder {
    link: Option<String>,
    title: Option<String>,
    description: Option<String>,
    publication_date: Option<String>,
}

impl FeedItemBuilder {
    /// Return the constructed page if the entry was complete, otherwise None.
    ///
    /// The news story's title falls back to the description; the story only
    /// materializes when the publication date parses, but the page survives
    /// either way.
    fn build(self) -> Option<Page> {
        let Some(link) = self.link else {
            tracing::error!("Link is unset");
            return None;
        };

        let Some(title) = self.title.or(self.description) else {
            tracing::error!("Both title and description are unset");
            return None;
        };

        let mut page = Page::with_url(link);
        match self.publication_date.as_deref().and_then(parse_rfc2822_date) {
            Some(publish_date) => {
                page.news_story = Some(NewsStory {
                    title,
                    publish_date,
                    publication_name: None,
                    publication_language: None,
                    access: None,
                    genres: Vec::new(),
                    keywords: Vec::new(),
                    stock_tickers: Vec::new(),
                });
            }
            None => {
                tracing::warn!(url = %page.url, "No parseable publication date, dropping story");
            }
        }
        Some(page)
    }
}

struct RssParser {
    pages: Vec<Page>,
    seen: HashSet<String>,
    current: Option<FeedItemBuilder>,
}

impl RssParser {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            seen: HashSet::new(),
            current: None,
        }
    }

    fn handle_start(&mut self, name: &str) {
        if name == "item" {
            self.current = Some(FeedItemBuilder::default());
        }
    }

    fn handle_end(&mut self, name: &str, text: &str) {
        if name == "item" {
            if let Some(builder) = self.current.take() {
                if let Some(page) = builder.build() {
                    if self.seen.insert(page.url.clone()) {
                        self.pages.push(page);
                    }
                }
            }
            return;
        }

        let Some(item) = &mut self.current else {
            return;
        };

        match name {
            "link" => item.link = clean(text),
            "title" => item.title = clean(text),
            "description" => item.description = clean(text),
            "pubDate" => item.publication_date = clean(text),
            _ => {}
        }
    }
}

struct AtomParser {
    pages: Vec<Page>,
    seen: HashSet<String>,
    current: Option<FeedItemBuilder>,
    /// `href` of the entry's `<link rel="self">`, or the first `<link>` seen.
    link_candidate: Option<String>,
}

impl AtomParser {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            seen: HashSet::new(),
            current: None,
            link_candidate: None,
        }
    }

    fn handle_start(&mut self, name: &str, e: &BytesStart<'_>) {
        match name {
            "entry" => {
                self.current = Some(FeedItemBuilder::default());
                self.link_candidate = None;
            }
            "link" if self.current.is_some() => {
                // A link without rel counts as the self link.
                let rel = attr_value(e, b"rel").unwrap_or_else(|| "self".to_string());
                if rel.eq_ignore_ascii_case("self") || self.link_candidate.is_none() {
                    if let Some(href) = attr_value(e, b"href") {
                        self.link_candidate = Some(href);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_end(&mut self, name: &str, text: &str) {
        if name == "entry" {
            if let Some(mut builder) = self.current.take() {
                builder.link = self.link_candidate.take();
                if let Some(page) = builder.build() {
                    if self.seen.insert(page.url.clone()) {
                        self.pages.push(page);
                    }
                }
            }
            return;
        }

        let Some(item) = &mut self.current else {
            return;
        };

        match name {
            "title" => item.title = clean(text),
            // Atom 0.3 <tagline>, Atom 1.0 <summary>
            "tagline" | "summary" => item.description = clean(text),
            "issued" | "published" => item.publication_date = clean(text),
            "updated" => {
                if item.publication_date.is_none() {
                    item.publication_date = clean(text);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::too_many_lines)]
mod tests {
    use super::*;

    const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
    const NEWS_NS: &str = "http://www.google.com/schemas/sitemap-news/0.9";
    const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";
    const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

    fn parse(content: &str) -> XmlDocument {
        parse_xml_document("http://x/sitemap.xml", content)
    }

    fn expect_pages(doc: XmlDocument, format: PagesFormat) -> Vec<Page> {
        match doc {
            XmlDocument::Pages {
                format: actual,
                pages,
            } => {
                assert_eq!(actual, format);
                pages
            }
            other => panic!("expected pages document, got {other:?}"),
        }
    }

    #[test]
    fn test_urlset_basic_fields() {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="{SITEMAP_NS}">
                <url>
                    <loc>http://x/about.html</loc>
                    <lastmod>2009-12-17T12:04:56+02:00</lastmod>
                    <changefreq>monthly</changefreq>
                    <priority>0.8</priority>
                </url>
                <url>
                    <loc>http://x/contact.html</loc>
                    <lastmod>2009-12-17T12:04:56+02:00</lastmod>
                    <changefreq>when we feel like it</changefreq>
                    <priority>1.1</priority>
                </url>
            </urlset>"#
        );

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        assert_eq!(pages.len(), 2);

        assert_eq!(pages[0].url, "http://x/about.html");
        assert_eq!(pages[0].priority, 0.8);
        assert_eq!(pages[0].change_frequency, Some(ChangeFrequency::Monthly));
        assert!(pages[0].last_modified.is_some());

        // Invalid changefreq falls back to always, invalid priority to 0.5
        assert_eq!(pages[1].priority, DEFAULT_PRIORITY);
        assert_eq!(pages[1].change_frequency, Some(ChangeFrequency::Always));
    }

    #[test]
    fn test_urlset_entities_and_cdata() {
        let xml = format!(
            r#"<urlset xmlns="{SITEMAP_NS}" xmlns:news="{NEWS_NS}">
                <url>
                    <loc>http://x/page?foo=1&amp;bar=2</loc>
                    <news:news>
                        <news:publication>
                            <news:name>Test publication</news:name>
                            <news:language>en</news:language>
                        </news:publication>
                        <news:publication_date>2009-12-17T12:04:56+02:00</news:publication_date>
                        <news:title>Foo &lt;foo&gt;</news:title>
                    </news:news>
                </url>
                <url>
                    <loc>http://x/news/baz.html</loc>
                    <news:news>
                        <news:publication_date>2009-12-17T12:04:56+02:00</news:publication_date>
                        <news:title><![CDATA[Bąž]]></news:title>
                    </news:news>
                </url>
            </urlset>"#
        );

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        assert_eq!(pages[0].url, "http://x/page?foo=1&bar=2");

        let story = pages[0].news_story.as_ref().unwrap();
        assert_eq!(story.title, "Foo <foo>");
        assert_eq!(story.publication_name.as_deref(), Some("Test publication"));
        assert_eq!(story.publication_language.as_deref(), Some("en"));
        assert!(story.genres.is_empty());

        let story = pages[1].news_story.as_ref().unwrap();
        assert_eq!(story.title, "Bąž");
    }

    #[test]
    fn test_urlset_news_story_requires_title_and_date() {
        let xml = format!(
            r#"<urlset xmlns="{SITEMAP_NS}" xmlns:news="{NEWS_NS}">
                <url>
                    <loc>http://x/no-date.html</loc>
                    <news:news><news:title>Title only</news:title></news:news>
                </url>
                <url>
                    <loc>http://x/no-title.html</loc>
                    <news:news>
                        <news:publication_date>2009-12-17T12:04:56+02:00</news:publication_date>
                    </news:news>
                </url>
            </urlset>"#
        );

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        assert_eq!(pages.len(), 2);
        assert!(pages[0].news_story.is_none());
        assert!(pages[1].news_story.is_none());
    }

    #[test]
    fn test_urlset_news_comma_lists() {
        let xml = format!(
            r#"<urlset xmlns="{SITEMAP_NS}" xmlns:news="{NEWS_NS}">
                <url>
                    <loc>http://x/story.html</loc>
                    <news:news>
                        <news:publication_date>2009-12-17T12:04:56+02:00</news:publication_date>
                        <news:title>Story</news:title>
                        <news:genres>PressRelease, UserGenerated</news:genres>
                        <news:keywords>one ,two, three</news:keywords>
                        <news:stock_tickers>NASDAQ:AMAT</news:stock_tickers>
                    </news:news>
                </url>
            </urlset>"#
        );

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        let story = pages[0].news_story.as_ref().unwrap();
        assert_eq!(story.genres, vec!["PressRelease", "UserGenerated"]);
        assert_eq!(story.keywords, vec!["one", "two", "three"]);
        assert_eq!(story.stock_tickers, vec!["NASDAQ:AMAT"]);
    }

    #[test]
    fn test_urlset_images() {
        let xml = format!(
            r#"<urlset xmlns="{SITEMAP_NS}" xmlns:image="{IMAGE_NS}">
                <url>
                    <loc>http://x/sample1.html</loc>
                    <image:image>
                        <image:loc>http://x/image.jpg</image:loc>
                        <image:caption>Example Caption</image:caption>
                        <image:geo_location>Sheffield, UK</image:geo_location>
                        <image:title>Example Title</image:title>
                        <image:license>https://creativecommons.org/publicdomain/zero/1.0/</image:license>
                    </image:image>
                    <image:image>
                        <image:loc>http://x/photo.jpg</image:loc>
                    </image:image>
                </url>
                <url>
                    <loc>http://x/sample2.html</loc>
                </url>
            </urlset>"#
        );

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        let images = pages[0].images.as_ref().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].loc, "http://x/image.jpg");
        assert_eq!(images[0].caption.as_deref(), Some("Example Caption"));
        assert_eq!(images[0].geo_location.as_deref(), Some("Sheffield, UK"));
        assert_eq!(images[0].title.as_deref(), Some("Example Title"));
        assert_eq!(
            images[0].license.as_deref(),
            Some("https://creativecommons.org/publicdomain/zero/1.0/")
        );
        assert_eq!(images[1].loc, "http://x/photo.jpg");
        assert!(images[1].caption.is_none());

        assert!(pages[1].images.is_none());
    }

    #[test]
    fn test_urlset_hreflang_alternates() {
        let xml = format!(
            r#"<urlset xmlns="{SITEMAP_NS}" xmlns:xhtml="{XHTML_NS}">
                <url>
                    <loc>http://x/en/page</loc>
                    <xhtml:link rel="alternate" hreflang="fr-FR" href="http://x/fr/page"/>
                </url>
                <url>
                    <loc>http://x/en/page2</loc>
                    <xhtml:link rel="alternate" href="http://x/fr/page2"/>
                    <xhtml:link hreflang="fr-FR" href="http://x/fr/page2"/>
                    <xhtml:link rel="alternate" hreflang="fr-FR"/>
                </url>
            </urlset>"#
        );

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        assert_eq!(
            pages[0].alternates.as_ref().unwrap(),
            &vec![Alternate {
                hreflang: "fr-FR".to_string(),
                href: "http://x/fr/page".to_string(),
            }]
        );
        // rel, hreflang and href are all required
        assert!(pages[1].alternates.is_none());
    }

    #[test]
    fn test_urlset_mobile_link_is_not_an_alternate() {
        let xml = format!(
            r#"<urlset xmlns="{SITEMAP_NS}" xmlns:xhtml="{XHTML_NS}">
                <url>
                    <loc>http://x/news/foo.html</loc>
                    <xhtml:link rel="alternate"
                                media="only screen and (max-width: 640px)"
                                href="http://x/news/foo.html?mobile=1"/>
                </url>
            </urlset>"#
        );

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        assert!(pages[0].alternates.is_none());
    }

    #[test]
    fn test_urlset_empty_elements_tolerated() {
        let xml = format!(
            r#"<urlset xmlns="{SITEMAP_NS}">
                <url>
                    <loc>http://x/page.html</loc>
                    <lastmod/>
                    <changefreq></changefreq>
                    <priority> </priority>
                </url>
            </urlset>"#
        );

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].last_modified.is_none());
        assert!(pages[0].change_frequency.is_none());
        assert_eq!(pages[0].priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn test_urlset_entry_without_loc_is_dropped() {
        let xml = format!(
            r#"<urlset xmlns="{SITEMAP_NS}">
                <url><lastmod>2024-01-15</lastmod></url>
                <url><loc>http://x/page.html</loc></url>
            </urlset>"#
        );

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].url, "http://x/page.html");
    }

    #[test]
    fn test_urlset_duplicate_locs_collapse_to_first() {
        let xml = format!(
            r#"<urlset xmlns="{SITEMAP_NS}">
                <url><loc>http://x/a.html</loc><priority>0.8</priority></url>
                <url><loc>http://x/a.html</loc><priority>0.2</priority></url>
                <url><loc>http://x/b.html</loc></url>
            </urlset>"#
        );

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].priority, 0.8);
    }

    #[test]
    fn test_urlset_loc_whitespace_trimmed() {
        let xml = format!(
            r#"<urlset xmlns="{SITEMAP_NS}">
                <url><loc>  http://x/spaced.html  </loc></url>
            </urlset>"#
        );

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        assert_eq!(pages[0].url, "http://x/spaced.html");
    }

    #[test]
    fn test_urlset_truncated_mid_url_keeps_completed_entries() {
        let mut xml = format!(r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="{SITEMAP_NS}">"#);
        for i in 0..49 {
            xml.push_str(&format!("<url><loc>http://x/page_{i}.html</loc></url>"));
        }
        xml.push_str("<url><loc>http://x/page_");

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        assert_eq!(pages.len(), 49);
        assert!(pages[48].url.ends_with("page_48.html"));
    }

    #[test]
    fn test_urlset_missing_close_tag_keeps_entries() {
        let mut xml = format!(r#"<urlset xmlns="{SITEMAP_NS}">"#);
        for i in 0..50 {
            xml.push_str(&format!("<url><loc>http://x/page_{i}.html</loc></url>"));
        }
        // No closing </urlset>

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        assert_eq!(pages.len(), 50);
    }

    #[test]
    fn test_urlset_without_xmlns_is_accepted() {
        let xml = r"<urlset>
                <url>
                    <loc>http://x/about.html</loc>
                    <changefreq>monthly</changefreq>
                    <random_tag>random_value</random_tag>
                </url>
            </urlset>";

        let pages = expect_pages(parse(xml), PagesFormat::Xml);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].url, "http://x/about.html");
        assert_eq!(pages[0].change_frequency, Some(ChangeFrequency::Monthly));
    }

    #[test]
    fn test_index_without_xmlns_is_accepted() {
        let xml = r"<sitemapindex>
                <sitemap><loc>http://x/sitemap_pages.xml</loc></sitemap>
            </sitemapindex>";

        match parse(xml) {
            XmlDocument::Index { child_urls } => {
                assert_eq!(child_urls, vec!["http://x/sitemap_pages.xml"]);
            }
            other => panic!("expected index, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_root_element() {
        match parse("<html><body>hello</body></html>") {
            XmlDocument::Invalid { reason } => {
                assert!(reason.contains("Unsupported root element 'html'."));
            }
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_video_namespace_recognized_but_ignored() {
        let xml = format!(
            r#"<urlset xmlns="{SITEMAP_NS}"
                       xmlns:video="http://www.google.com/schemas/sitemap-video/1.1">
                <url>
                    <loc>http://x/clip.html</loc>
                    <video:video><video:title>Clip</video:title></video:video>
                </url>
            </urlset>"#
        );

        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].url, "http://x/clip.html");
    }

    #[test]
    fn test_index_extraction() {
        let xml = format!(
            r#"<sitemapindex xmlns="{SITEMAP_NS}">
                <sitemap>
                    <loc>  http://x/sitemap_1.xml  </loc>
                    <lastmod>2024-01-01</lastmod>
                </sitemap>
                <sitemap><loc>http://x/sitemap_2.xml</loc></sitemap>
                <sitemap><loc>http://x/sitemap_1.xml</loc></sitemap>
                <sitemap><loc>not a url</loc></sitemap>
            </sitemapindex>"#
        );

        match parse(&xml) {
            XmlDocument::Index { child_urls } => {
                assert_eq!(
                    child_urls,
                    vec!["http://x/sitemap_1.xml", "http://x/sitemap_2.xml"]
                );
            }
            other => panic!("expected index, got {other:?}"),
        }
    }

    #[test]
    fn test_rss_items() {
        let xml = r"<rss version='2.0'>
            <channel>
                <title>Test feed</title>
                <item>
                    <title>First story</title>
                    <link>http://x/news/first.html</link>
                    <pubDate>Thu, 17 Dec 2009 12:04:56 +0200</pubDate>
                </item>
                <item>
                    <description>Second story, description only</description>
                    <link>http://x/news/second.html</link>
                    <pubDate>Thu, 17 Dec 2009 12:04:56 +0200</pubDate>
                </item>
                <item>
                    <title>No link, dropped</title>
                </item>
            </channel>
        </rss>";

        let pages = expect_pages(parse(xml), PagesFormat::Rss);
        assert_eq!(pages.len(), 2);

        let story = pages[0].news_story.as_ref().unwrap();
        assert_eq!(story.title, "First story");
        assert!(story.publication_name.is_none());

        // Title falls back to description
        let story = pages[1].news_story.as_ref().unwrap();
        assert_eq!(story.title, "Second story, description only");
    }

    #[test]
    fn test_rss_item_without_title_and_description_is_dropped() {
        let xml = r"<rss version='2.0'><channel>
            <item><link>http://x/untitled.html</link></item>
        </channel></rss>";

        let pages = expect_pages(parse(xml), PagesFormat::Rss);
        assert!(pages.is_empty());
    }

    #[test]
    fn test_rss_unparseable_date_keeps_page_drops_story() {
        let xml = r"<rss version='2.0'><channel>
            <item>
                <title>Story</title>
                <link>http://x/story.html</link>
                <pubDate>sometime recently</pubDate>
            </item>
        </channel></rss>";

        let pages = expect_pages(parse(xml), PagesFormat::Rss);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].news_story.is_none());
    }

    #[test]
    fn test_atom_1_0_entries() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
            <title>Test feed</title>
            <entry>
                <title>First story</title>
                <link rel="alternate" href="http://x/alt/first.html"/>
                <link rel="self" href="http://x/news/first.html"/>
                <summary>The first story</summary>
                <published>2009-12-17T12:04:56+02:00</published>
                <updated>2010-01-01T00:00:00Z</updated>
            </entry>
            <entry>
                <title>Second story</title>
                <link href="http://x/news/second.html"/>
                <updated>2009-12-17T12:04:56+02:00</updated>
            </entry>
        </feed>"#;

        let pages = expect_pages(parse(xml), PagesFormat::Atom);
        assert_eq!(pages.len(), 2);

        // rel="self" wins over the earlier alternate link
        assert_eq!(pages[0].url, "http://x/news/first.html");
        let story = pages[0].news_story.as_ref().unwrap();
        assert_eq!(story.title, "First story");

        // <updated> is the publication date fallback
        assert_eq!(pages[1].url, "http://x/news/second.html");
        assert!(pages[1].news_story.is_some());
    }

    #[test]
    fn test_atom_0_3_entries() {
        let xml = r#"<feed version="0.3" xmlns="http://purl.org/atom/ns#">
            <title>Test feed</title>
            <entry>
                <title>First story</title>
                <link rel="alternate" type="text/html" href="http://x/news/first.html"/>
                <tagline>The tagline</tagline>
                <issued>2009-12-17T12:04:56+02:00</issued>
            </entry>
        </feed>"#;

        let pages = expect_pages(parse(xml), PagesFormat::Atom);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].url, "http://x/news/first.html");
        assert!(pages[0].news_story.is_some());
    }

    #[test]
    fn test_atom_entry_without_any_link_is_dropped() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
            <entry><title>No link</title></entry>
        </feed>"#;

        let pages = expect_pages(parse(xml), PagesFormat::Atom);
        assert!(pages.is_empty());
    }

    #[test]
    fn test_empty_urlset() {
        let xml = format!(r#"<urlset xmlns="{SITEMAP_NS}"></urlset>"#);
        let pages = expect_pages(parse(&xml), PagesFormat::Xml);
        assert!(pages.is_empty());
    }
}
