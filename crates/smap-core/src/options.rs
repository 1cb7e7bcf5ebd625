//! Options and callbacks for sitemap tree discovery.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::WebClient;

/// Per-URL recursion filter.
///
/// Called with the candidate sub-sitemap URL, the recursion level it would be
/// fetched at, and the ancestor URL set of the branch. Returning `false`
/// skips the URL entirely (no `Invalid` node is emitted for it).
pub type RecurseCallback = Arc<dyn Fn(&str, usize, &HashSet<String>) -> bool + Send + Sync>;

/// Batch recursion filter.
///
/// Receives the full candidate list produced by an index-shaped sitemap and
/// returns the list to actually fetch. When both callbacks are supplied, the
/// list callback runs first.
pub type RecurseListCallback =
    Arc<dyn Fn(Vec<String>, usize, &HashSet<String>) -> Vec<String> + Send + Sync>;

/// Cooperative cancellation flag shared between the caller and the fetch
/// pipeline.
///
/// Cloning is cheap; all clones observe the same flag. Once cancelled,
/// pending recursive fetches short-circuit into `Invalid` nodes and already
/// materialized nodes remain valid.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a flag in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for [`sitemap_tree_for_homepage`](crate::sitemap_tree_for_homepage).
///
/// The defaults match the common case: discover through robots.txt and the
/// well-known paths, normalizing the homepage URL to the site root, with the
/// built-in web client.
#[derive(Clone)]
pub struct FetchOptions {
    /// Custom web client. `None` uses the built-in `reqwest` client with the
    /// default sitemap size cap.
    pub web_client: Option<Arc<dyn WebClient>>,
    /// Discover sitemaps through robots.txt `Sitemap:` directives.
    pub use_robots: bool,
    /// Probe the fixed set of well-known sitemap paths.
    pub use_known_paths: bool,
    /// Strip the homepage URL to the site root before discovery. When false,
    /// robots.txt and known paths resolve relative to the provided URL.
    pub normalize_homepage_url: bool,
    /// Extra paths to probe in addition to the built-in well-known set.
    pub extra_known_paths: Vec<String>,
    /// Per-URL recursion filter.
    pub recurse_callback: Option<RecurseCallback>,
    /// Batch recursion filter.
    pub recurse_list_callback: Option<RecurseListCallback>,
    /// Cancellation flag checked before every fetch.
    pub cancel: CancelFlag,
}

impl FetchOptions {
    /// Options with all discovery mechanisms enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            web_client: None,
            use_robots: true,
            use_known_paths: true,
            normalize_homepage_url: true,
            extra_known_paths: Vec::new(),
            recurse_callback: None,
            recurse_list_callback: None,
            cancel: CancelFlag::new(),
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOptions")
            .field("web_client", &self.web_client.as_ref().map(|_| "<custom>"))
            .field("use_robots", &self.use_robots)
            .field("use_known_paths", &self.use_known_paths)
            .field("normalize_homepage_url", &self.normalize_homepage_url)
            .field("extra_known_paths", &self.extra_known_paths)
            .field(
                "recurse_callback",
                &self.recurse_callback.as_ref().map(|_| "<fn>"),
            )
            .field(
                "recurse_list_callback",
                &self.recurse_list_callback.as_ref().map(|_| "<fn>"),
            )
            .field("cancel", &self.cancel)
            .finish()
    }
}
