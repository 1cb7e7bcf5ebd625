//! Web client contract used by the sitemap fetcher, plus the default
//! `reqwest`-backed implementation.
//!
//! Implementations must never panic or return `Err` on transport problems;
//! every failure is reported as a [`WebResponse::Error`] value so that the
//! fetch pipeline can decide between retrying and materializing an `Invalid`
//! node.

use std::time::Duration;

use async_trait::async_trait;

use crate::{Error, Result};

/// HTTP status codes on which a request should be retried.
///
/// Mostly transient server-side and CDN conditions; 400 is included because
/// some servers answer "400 Bad Request" once and then start working again on
/// a retry.
pub const RETRYABLE_HTTP_STATUS_CODES: &[u16] = &[
    400, 408, 429, 499, 500, 502, 503, 504, 509, 520, 521, 522, 523, 524, 525, 526, 527, 530, 598,
];

/// Default HTTP request timeout.
///
/// Some webservers generate huge sitemaps on the fly, so this is rather big.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Successful response: status line, headers and (possibly capped) body.
#[derive(Debug, Clone)]
pub struct WebSuccess {
    status_code: u16,
    status_message: String,
    headers: Vec<(String, String)>,
    data: Vec<u8>,
    final_url: Option<String>,
}

impl WebSuccess {
    /// Create a success response.
    ///
    /// `final_url` is the URL actually fetched after any redirects, or `None`
    /// when the implementation cannot tell.
    #[must_use]
    pub fn new(
        status_code: u16,
        status_message: impl Into<String>,
        headers: Vec<(String, String)>,
        data: Vec<u8>,
        final_url: Option<String>,
    ) -> Self {
        Self {
            status_code,
            status_message: status_message.into(),
            headers,
            data,
            final_url,
        }
    }

    /// HTTP status code of the response, e.g. 200.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status_code
    }

    /// HTTP status message of the response, e.g. "OK".
    #[must_use]
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Header value for a case-insensitive name, or `None` if unset.
    #[must_use]
    pub fn header(&self, case_insensitive_name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(case_insensitive_name))
            .map(|(_, value)| value.as_str())
    }

    /// Raw (undecoded) body bytes.
    #[must_use]
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    /// The URL actually fetched, after any redirects.
    #[must_use]
    pub fn final_url(&self) -> Option<&str> {
        self.final_url.as_deref()
    }
}

/// Error response: a human-readable message and a retryability hint.
#[derive(Debug, Clone)]
pub struct WebError {
    message: String,
    retryable: bool,
}

impl WebError {
    /// Create an error response.
    #[must_use]
    pub fn new(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            message: message.into(),
            retryable,
        }
    }

    /// Message describing what went wrong.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True if the request should be retried.
    #[must_use]
    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

/// Outcome of a single GET issued through a [`WebClient`].
#[derive(Debug, Clone)]
pub enum WebResponse {
    /// The server answered with a 2xx status.
    Success(WebSuccess),
    /// Transport failure or non-2xx status.
    Error(WebError),
}

/// Abstract web client used by the sitemap fetcher.
///
/// The trait is intentionally tiny so that callers can plug in their own HTTP
/// stack (or a canned-response test double) without touching the rest of the
/// pipeline.
#[async_trait]
pub trait WebClient: Send + Sync {
    /// Bound the number of body bytes materialized by success responses, or
    /// `None` to fetch everything. Responses past the cap are truncated to the
    /// first `max_response_data_length` bytes.
    fn set_max_response_data_length(&mut self, max_response_data_length: Option<usize>);

    /// Fetch a URL.
    ///
    /// Must not fail on connection errors (including timeouts); such errors
    /// are reported via [`WebResponse::Error`].
    async fn get(&self, url: &str) -> WebResponse;
}

/// Default `reqwest`-backed web client.
///
/// Follows up to 5 redirects and reports the post-redirect URL on success.
/// Transport-level compression is deliberately left off: content-level gzip
/// handling (including servers that advertise gzip but serve plain text)
/// lives in the fetch helper, which needs to see the raw bytes.
pub struct HttpClient {
    client: reqwest::Client,
    max_response_data_length: Option<usize>,
}

impl HttpClient {
    /// Create a client with the default request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Create a client with a custom request timeout (primarily for tests).
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("smap/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(Error::Network)?;
        Ok(Self {
            client,
            max_response_data_length: None,
        })
    }
}

#[async_trait]
impl WebClient for HttpClient {
    fn set_max_response_data_length(&mut self, max_response_data_length: Option<usize>) {
        self.max_response_data_length = max_response_data_length;
    }

    async fn get(&self, url: &str) -> WebResponse {
        let mut response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                return WebResponse::Error(WebError::new(
                    e.to_string(),
                    e.is_timeout() || e.is_connect(),
                ));
            }
        };

        let status = response.status();
        let status_code = status.as_u16();
        let status_message = status.canonical_reason().unwrap_or("").to_string();

        if !status.is_success() {
            return WebResponse::Error(WebError::new(
                format!("{status_code} {status_message}"),
                RETRYABLE_HTTP_STATUS_CODES.contains(&status_code),
            ));
        }

        let final_url = Some(response.url().to_string());
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let mut data = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    data.extend_from_slice(&chunk);
                    if let Some(max) = self.max_response_data_length {
                        if data.len() >= max {
                            data.truncate(max);
                            tracing::debug!(url = %url, max, "Response truncated at byte cap");
                            break;
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    return WebResponse::Error(WebError::new(
                        format!("Error while reading body of {url}: {e}"),
                        e.is_timeout(),
                    ));
                }
            }
        }

        WebResponse::Success(WebSuccess::new(
            status_code,
            status_message,
            headers,
            data,
            final_url,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let success = WebSuccess::new(
            200,
            "OK",
            vec![("Content-Type".to_string(), "text/xml".to_string())],
            vec![],
            None,
        );

        assert_eq!(success.header("content-type"), Some("text/xml"));
        assert_eq!(success.header("CONTENT-TYPE"), Some("text/xml"));
        assert_eq!(success.header("content-encoding"), None);
    }

    #[tokio::test]
    async fn test_get_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<urlset/>", "application/xml"),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let url = format!("{}/sitemap.xml", mock_server.uri());

        match client.get(&url).await {
            WebResponse::Success(success) => {
                assert_eq!(success.status_code(), 200);
                assert_eq!(success.raw_data(), b"<urlset/>");
                assert_eq!(success.header("content-type"), Some("application/xml"));
                assert_eq!(success.final_url(), Some(url.as_str()));
            }
            WebResponse::Error(e) => panic!("expected success, got error: {}", e.message()),
        }
    }

    #[tokio::test]
    async fn test_get_404_is_non_retryable_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing.xml"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let url = format!("{}/missing.xml", mock_server.uri());

        match client.get(&url).await {
            WebResponse::Error(e) => {
                assert!(e.message().contains("404"));
                assert!(!e.retryable());
            }
            WebResponse::Success(_) => panic!("expected error for 404"),
        }
    }

    #[tokio::test]
    async fn test_get_503_is_retryable_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/busy.xml"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let url = format!("{}/busy.xml", mock_server.uri());

        match client.get(&url).await {
            WebResponse::Error(e) => {
                assert!(e.message().contains("503"));
                assert!(e.retryable());
            }
            WebResponse::Success(_) => panic!("expected error for 503"),
        }
    }

    #[tokio::test]
    async fn test_get_follows_redirects_and_reports_final_url() {
        let mock_server = MockServer::start().await;
        let target = format!("{}/sitemap.xml", mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/old.xml"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", target.as_str()))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<urlset/>"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let url = format!("{}/old.xml", mock_server.uri());

        match client.get(&url).await {
            WebResponse::Success(success) => {
                assert_eq!(success.final_url(), Some(target.as_str()));
            }
            WebResponse::Error(e) => panic!("expected success, got error: {}", e.message()),
        }
    }

    #[tokio::test]
    async fn test_get_connection_error_is_retryable() {
        // Nothing is listening on this port.
        let client = HttpClient::with_timeout(Duration::from_millis(500)).unwrap();

        match client.get("http://127.0.0.1:1/sitemap.xml").await {
            WebResponse::Error(e) => assert!(e.retryable()),
            WebResponse::Success(_) => panic!("expected connection error"),
        }
    }

    #[tokio::test]
    async fn test_max_response_data_length_caps_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/big.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a".repeat(4096)))
            .mount(&mock_server)
            .await;

        let mut client = HttpClient::new().unwrap();
        client.set_max_response_data_length(Some(100));
        let url = format!("{}/big.txt", mock_server.uri());

        match client.get(&url).await {
            WebResponse::Success(success) => {
                assert_eq!(success.raw_data().len(), 100);
            }
            WebResponse::Error(e) => panic!("expected success, got error: {}", e.message()),
        }
    }
}
