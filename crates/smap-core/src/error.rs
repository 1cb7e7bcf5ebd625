//! Error types and handling for smap-core operations.
//!
//! Most failures in this crate are deliberately *not* errors: a sitemap that
//! cannot be fetched or parsed becomes an [`Invalid`](crate::Sitemap::Invalid)
//! node in the tree so that one broken sibling never poisons the rest of the
//! discovery run. The `Error` type below covers the remaining cases where the
//! caller itself did something wrong (a non-HTTP homepage URL) or where the
//! local machine failed us (temp file I/O, serialization).

use thiserror::Error;

/// The main error type for smap-core operations.
///
/// All public fallible functions in smap-core return `Result<T, Error>`.
/// Transport-level failures during recursive fetching do not surface here;
/// they are folded into `Invalid` sitemap nodes instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers the page-store temp file: creation, spill and rehydration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network client could not be constructed.
    ///
    /// Building the underlying `reqwest` client can fail (TLS backend
    /// initialisation, malformed default headers). Failures of individual
    /// requests are reported through [`WebResponse`](crate::client::WebResponse)
    /// values, never through this variant.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL is malformed, or not in the http/https scheme.
    ///
    /// Raised by the tree entry point when the homepage URL fails validation.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Content could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Returns `true` for errors that are typically temporary, such as network
    /// timeouts and interrupted I/O. Invalid URLs and parse failures are
    /// permanent.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Useful for grouping errors in logs or metrics.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Parse(_) => "parse",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
