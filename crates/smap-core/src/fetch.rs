//! Fetch helper: retrying GET, gzip handling and BOM-tolerant decoding.
//!
//! Sits between the web client contract and the parsers. Retryable transport
//! errors are retried a bounded number of times with a short wait; gzip is
//! detected from the URL extension and the response headers (servers lie
//! about all three, so a failed gunzip logs and falls through to the raw
//! body); the decoded string is always produced, replacing invalid UTF-8
//! sequences rather than failing.

use std::io::Read;
use std::time::Duration;

use flate2::read::GzDecoder;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::client::{WebClient, WebError, WebResponse, WebSuccess};
use crate::options::CancelFlag;

/// How many times a retryable fetch is attempted before giving up.
const MAX_FETCH_ATTEMPTS: usize = 5;

/// Wait between attempts on retryable errors.
const SLEEP_BETWEEN_RETRIES: Duration = Duration::from_secs(1);

/// A fetched and decoded sitemap document.
#[derive(Debug)]
pub(crate) struct FetchedDocument {
    /// Decoded document body.
    pub content: String,
    /// URL actually fetched, after any redirects.
    pub final_url: Option<String>,
}

/// Fetch a URL, retrying on retryable errors, and decode the body.
///
/// On unrecoverable errors the last error response is returned unchanged so
/// the caller can materialize an `Invalid` node from its message.
pub(crate) async fn fetch_url_document(
    url: &str,
    client: &dyn WebClient,
    cancel: &CancelFlag,
) -> Result<FetchedDocument, WebError> {
    let mut last_error = WebError::new(format!("Retry count exhausted for URL {url}"), false);

    for attempt in 1..=MAX_FETCH_ATTEMPTS {
        tracing::info!(url = %url, attempt, "Fetching URL");

        match client.get(url).await {
            WebResponse::Success(success) => {
                let final_url = success.final_url().map(ToString::to_string);
                let content = decoded_response_content(url, &success);
                return Ok(FetchedDocument { content, final_url });
            }
            WebResponse::Error(e) => {
                tracing::warn!(url = %url, error = %e.message(), "Request failed");

                if e.retryable() && attempt < MAX_FETCH_ATTEMPTS && !cancel.is_cancelled() {
                    tracing::info!(
                        url = %url,
                        wait_s = SLEEP_BETWEEN_RETRIES.as_secs(),
                        "Retrying URL"
                    );
                    last_error = e;
                    tokio::time::sleep(SLEEP_BETWEEN_RETRIES).await;
                } else {
                    return Err(e);
                }
            }
        }
    }

    tracing::info!(url = %url, "Giving up on URL");
    Err(last_error)
}

/// Decode a response body, gunzipping it if necessary.
fn decoded_response_content(url: &str, response: &WebSuccess) -> String {
    let raw = response.raw_data();

    if looks_gzipped(url, response) {
        match gunzip(raw) {
            Ok(data) => return decode_utf8_with_bom(&data),
            Err(e) => {
                tracing::error!("Unable to gunzip response for {url}: {e}");
            }
        }
    }

    decode_utf8_with_bom(raw)
}

/// Whether the response looks like it carries gzipped data.
///
/// True if the percent-decoded URL path ends with `.gz`, or `Content-Type`
/// or `Content-Encoding` mention gzip.
fn looks_gzipped(url: &str, response: &WebSuccess) -> bool {
    let path_says_gz = Url::parse(url).is_ok_and(|parsed| {
        percent_decode_str(parsed.path())
            .decode_utf8_lossy()
            .to_lowercase()
            .ends_with(".gz")
    });

    let header_says_gzip = |name: &str| {
        response
            .header(name)
            .is_some_and(|value| value.to_lowercase().contains("gzip"))
    };

    path_says_gz || header_says_gzip("content-type") || header_says_gzip("content-encoding")
}

fn gunzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    if data.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "data is empty, not a valid gzip archive",
        ));
    }

    let mut decoder = GzDecoder::new(data);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded)?;
    Ok(decoded)
}

/// Decode bytes as UTF-8, stripping a leading BOM and replacing invalid
/// sequences.
fn decode_utf8_with_bom(data: &[u8]) -> String {
    let data = data.strip_prefix(b"\xef\xbb\xbf".as_slice()).unwrap_or(data);
    String::from_utf8_lossy(data).into_owned()
}
