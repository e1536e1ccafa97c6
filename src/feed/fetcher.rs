use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

/// Default limit on a fetched feed document.
pub const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while retrieving a feed document over HTTP.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Any status other than 200 OK
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request timed out")]
    Timeout,
    #[error("Response too large")]
    ResponseTooLarge,
    /// Received fewer bytes than Content-Length announced
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Bounds applied to a single document retrieval.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub timeout: Duration,
    pub max_size: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_size: MAX_FEED_SIZE,
        }
    }
}

/// Fetches the document at `uri`.
///
/// There is no retry: one request is made and its outcome is final.
/// `limits.timeout` bounds the whole exchange, body included, so a server
/// that stalls mid-body still fails the fetch.
///
/// # Errors
///
/// - [`FetchError::Network`] - Connection, TLS or body stream errors
/// - [`FetchError::Timeout`] - Headers and body not received within `limits.timeout`
/// - [`FetchError::HttpStatus`] - Response status was not 200
/// - [`FetchError::ResponseTooLarge`] - Body exceeded `limits.max_size`
/// - [`FetchError::IncompleteResponse`] - Body shorter than Content-Length
pub async fn fetch_document(
    client: &reqwest::Client,
    uri: &str,
    limits: FetchLimits,
) -> Result<Vec<u8>, FetchError> {
    tokio::time::timeout(limits.timeout, fetch_limited(client, uri, limits.max_size))
        .await
        .map_err(|_| FetchError::Timeout)?
}

async fn fetch_limited(
    client: &reqwest::Client,
    uri: &str,
    max_size: usize,
) -> Result<Vec<u8>, FetchError> {
    let response = client.get(uri).send().await?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    read_limited_bytes(response, max_size).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
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
