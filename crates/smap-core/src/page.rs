//! Page records produced by the sitemap parsers.
//!
//! A [`Page`] is one `<url>` entry (or plain-text line, RSS `<item>`, Atom
//! `<entry>`) together with the optional Google News story, image and
//! hreflang-alternate extensions attached to it. Records are immutable once
//! a parser has emitted them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Default page priority, as per the sitemaps.org spec.
pub const DEFAULT_PRIORITY: f64 = 0.5;

/// Change frequency hints from a sitemap `<changefreq>` element.
///
/// Invalid values encountered while parsing fall back to [`Always`], matching
/// how lenient consumers treat the field in the wild.
///
/// [`Always`]: ChangeFrequency::Always
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    /// The page changes every time it is accessed.
    Always,
    /// The page changes hourly.
    Hourly,
    /// The page changes daily.
    Daily,
    /// The page changes weekly.
    Weekly,
    /// The page changes monthly.
    Monthly,
    /// The page changes yearly.
    Yearly,
    /// The page is archived and will not change.
    Never,
}

impl std::str::FromStr for ChangeFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "never" => Ok(Self::Never),
            _ => Err(Error::Parse(format!("Invalid changefreq value: {s}"))),
        }
    }
}

/// Single story derived from the Google News sitemap extension.
///
/// Both `title` and `publish_date` are required for the story to materialize;
/// the remaining fields mirror what publishers actually provide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsStory {
    /// Story title.
    pub title: String,
    /// Story publication date.
    pub publish_date: DateTime<Utc>,
    /// Name of the news publication the article appears in.
    pub publication_name: Option<String>,
    /// Primary language of the news publication (ISO 639 code).
    pub publication_language: Option<String>,
    /// Accessibility of the article, e.g. "Subscription".
    pub access: Option<String>,
    /// Properties characterizing the content, e.g. "PressRelease".
    #[serde(default)]
    pub genres: Vec<String>,
    /// Keywords describing the topic of the article.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Stock tickers that are the main subject of the article.
    #[serde(default)]
    pub stock_tickers: Vec<String>,
}

/// Single image attached to a page via the sitemap image extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub loc: String,
    /// Caption of the image.
    pub caption: Option<String>,
    /// Geographic location of the image, e.g. "Sheffield, UK".
    pub geo_location: Option<String>,
    /// Title of the image.
    pub title: Option<String>,
    /// URL of the image's license.
    pub license: Option<String>,
}

impl Image {
    /// Create an image record with only the required location set.
    #[must_use]
    pub fn with_loc(loc: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            caption: None,
            geo_location: None,
            title: None,
            license: None,
        }
    }
}

/// Language alternate of a page, from `<xhtml:link rel="alternate">`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternate {
    /// Language (and optional region) tag, e.g. "fr-FR".
    pub hreflang: String,
    /// URL of the alternate-language version of the page.
    pub href: String,
}

/// Single sitemap-derived page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page URL.
    pub url: String,
    /// Priority of this URL relative to other URLs on the site, in
    /// `[0.0, 1.0]`. Defaults to 0.5; out-of-range and unparseable values
    /// are repaired to the default during parsing.
    #[serde(default = "default_priority")]
    pub priority: f64,
    /// Date of last modification of the URL.
    pub last_modified: Option<DateTime<Utc>>,
    /// Change frequency of the URL.
    pub change_frequency: Option<ChangeFrequency>,
    /// Google News story attached to the URL.
    pub news_story: Option<NewsStory>,
    /// Images attached to the URL, in document order.
    pub images: Option<Vec<Image>>,
    /// Language alternates of the URL, in document order.
    pub alternates: Option<Vec<Alternate>>,
}

fn default_priority() -> f64 {
    DEFAULT_PRIORITY
}

impl Page {
    /// Create a page with the given URL and all optional attributes unset.
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            priority: DEFAULT_PRIORITY,
            last_modified: None,
            change_frequency: None,
            news_story: None,
            images: None,
            alternates: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_changefreq_parsing() {
        let cases = [
            ("always", ChangeFrequency::Always),
            ("hourly", ChangeFrequency::Hourly),
            ("daily", ChangeFrequency::Daily),
            ("weekly", ChangeFrequency::Weekly),
            ("monthly", ChangeFrequency::Monthly),
            ("yearly", ChangeFrequency::Yearly),
            ("never", ChangeFrequency::Never),
            // Case insensitive
            ("WEEKLY", ChangeFrequency::Weekly),
            ("Weekly", ChangeFrequency::Weekly),
        ];

        for (value, expected) in cases {
            let parsed: ChangeFrequency = value.parse().unwrap();
            assert_eq!(parsed, expected, "failed for {value}");
        }
    }

    #[test]
    fn test_changefreq_invalid_value() {
        assert!("when we feel like it".parse::<ChangeFrequency>().is_err());
        assert!("".parse::<ChangeFrequency>().is_err());
    }

    #[test]
    fn test_page_defaults() {
        let page = Page::with_url("http://example.com/page.html");
        assert_eq!(page.priority, DEFAULT_PRIORITY);
        assert!(page.last_modified.is_none());
        assert!(page.change_frequency.is_none());
        assert!(page.news_story.is_none());
        assert!(page.images.is_none());
        assert!(page.alternates.is_none());
    }

    #[test]
    fn test_page_serde_round_trip() {
        let page = Page {
            url: "http://example.com/news/story.html".to_string(),
            priority: 0.8,
            last_modified: crate::util::parse_iso8601_date("2009-12-17T12:04:56+02:00"),
            change_frequency: Some(ChangeFrequency::Monthly),
            news_story: Some(NewsStory {
                title: "Foo <foo>".to_string(),
                publish_date: crate::util::parse_iso8601_date("2009-12-17T12:04:56+02:00")
                    .unwrap(),
                publication_name: Some("Test publication".to_string()),
                publication_language: Some("en".to_string()),
                access: None,
                genres: vec!["PressRelease".to_string()],
                keywords: vec!["a".to_string(), "b".to_string()],
                stock_tickers: vec![],
            }),
            images: Some(vec![Image::with_loc("http://example.com/image.jpg")]),
            alternates: Some(vec![Alternate {
                hreflang: "fr-FR".to_string(),
                href: "http://example.com/fr/story.html".to_string(),
            }]),
        };

        let json = serde_json::to_string(&page).unwrap();
        let restored: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, page);
    }

    #[test]
    fn test_priority_default_on_missing_field() {
        let page: Page = serde_json::from_str(r#"{"url": "http://example.com/"}"#).unwrap();
        assert_eq!(page.priority, DEFAULT_PRIORITY);
    }
}
