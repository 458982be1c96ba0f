use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::util::{validate_url, UrlValidationError};

/// Default per-feed timeout, covering connect, headers and body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("feedreport/", env!("CARGO_PKG_VERSION"));

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while retrieving a feed.
///
/// None of these abort a run: the aggregation pipeline records them per URL
/// and carries on with the remaining feeds.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be used as a feed source
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request did not complete within the configured timeout
    #[error("Request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Builds the HTTP client shared by every fetch in a run.
///
/// Some feed servers refuse requests without a `User-Agent`, so one is
/// always set. Timeouts are applied per request by [`fetch`].
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
}

/// Fetches the raw bytes of one feed.
///
/// Makes exactly one attempt. The body is returned whatever the HTTP status;
/// deciding whether the content is usable is left to the parser.
///
/// # Errors
///
/// - [`FetchError::InvalidUrl`] - URL did not parse or is not http(s)
/// - [`FetchError::Network`] - Connection, TLS or body read failure
/// - [`FetchError::Timeout`] - The whole exchange exceeded `timeout`
/// - [`FetchError::ResponseTooLarge`] - Body exceeded 10MB
/// - [`FetchError::IncompleteResponse`] - Body shorter than Content-Length
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, FetchError> {
    let url = validate_url(url)?;

    tokio::time::timeout(timeout, get_body(client, &url))
        .await
        .map_err(|_| FetchError::Timeout(timeout))?
}

async fn get_body(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url.as_str()).send().await?;

    let status = response.status();
    if !status.is_success() {
        tracing::debug!(
            feed = %url,
            status = %status,
            "Non-success status, handing body to the parser anyway"
        );
    }

    read_limited_bytes(response, MAX_FEED_SIZE).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><guid>1</guid><title>Test</title></item>
</channel></rss>"#;

    fn client() -> reqwest::Client {
        build_client(DEFAULT_USER_AGENT).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success_returns_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .insert_header("Content-Type", "application/xml"),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/feed", mock_server.uri());
        let bytes = fetch(&client(), &url, DEFAULT_TIMEOUT).await.unwrap();
        assert_eq!(bytes, VALID_RSS.as_bytes());
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "feedreport-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = build_client("feedreport-test/1.0").unwrap();
        let url = format!("{}/feed", mock_server.uri());
        assert!(fetch(&client, &url, DEFAULT_TIMEOUT).await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/feed", mock_server.uri());
        let bytes = fetch(&client(), &url, DEFAULT_TIMEOUT).await.unwrap();
        assert_eq!(bytes, b"gone");
    }

    #[tokio::test]
    async fn test_fetch_single_attempt_on_server_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1) // No retries
            .mount(&mock_server)
            .await;

        let url = format!("{}/feed", mock_server.uri());
        let bytes = fetch(&client(), &url, DEFAULT_TIMEOUT).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/feed", mock_server.uri());
        let result = fetch(&client(), &url, Duration::from_millis(200)).await;
        match result {
            Err(FetchError::Timeout(d)) => assert_eq!(d, Duration::from_millis(200)),
            other => panic!("Expected Timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let result = fetch(&client(), "ftp://example.com/feed", DEFAULT_TIMEOUT).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind then drop a server so the port is very likely closed
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };
        let result = fetch(&client(), &format!("{}/feed", uri), DEFAULT_TIMEOUT).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_too_large() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'a'; MAX_FEED_SIZE + 1]))
            .mount(&mock_server)
            .await;

        let url = format!("{}/feed", mock_server.uri());
        let result = fetch(&client(), &url, DEFAULT_TIMEOUT).await;
        assert!(matches!(result, Err(FetchError::ResponseTooLarge)));
    }

    #[tokio::test]
    async fn test_fetch_url_whitespace_tolerated() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .mount(&mock_server)
            .await;

        let url = format!("{}/feed\n", mock_server.uri());
        assert!(fetch(&client(), &url, DEFAULT_TIMEOUT).await.is_ok());
    }
}
