//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The `Fetcher` seam the crawl engine depends on
//! - Building HTTP clients with the per-request timeout and user agent
//! - GET requests that turn a response body into a parsed `Document`
//! - Error classification

use crate::crawler::parser::{parse_html, Document};
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("sumi-scan/", env!("CARGO_PKG_VERSION"));

/// Source of parsed pages for the crawl engine
///
/// Implementations must return immediately with [`FetchError::Cancelled`]
/// when the token is already cancelled. A fetch that has started is allowed
/// to run to completion.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Fetches `url` and returns the parsed page
    async fn get(&self, cancel: &CancellationToken, url: &str) -> FetchResult<Box<dyn Document>>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn get(&self, cancel: &CancellationToken, url: &str) -> FetchResult<Box<dyn Document>> {
        (**self).get(cancel, url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `request_timeout` - Deadline for a whole request, connect through body
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(request_timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(request_timeout)
        .connect_timeout(request_timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a `reqwest` client
///
/// The client (and with it the transport) is pluggable through
/// [`HttpFetcher::with_client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests time out after `request_timeout`
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(request_timeout)?))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches the body of `url` as text
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | URL does not parse | `InvalidUrl` |
    /// | Request deadline hit | `Timeout` |
    /// | Connect/TLS/protocol failure | `Http` |
    /// | Non-2xx status | `Status` |
    /// | Body cannot be read or decoded | `Body` |
    pub async fn fetch_body(&self, url: &str) -> FetchResult<String> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, cancel: &CancellationToken, url: &str) -> FetchResult<Box<dyn Document>> {
        if cancel.is_cancelled() {
            tracing::debug!("Run cancelled, not fetching {}", url);
            return Err(FetchError::Cancelled {
                url: url.to_string(),
            });
        }

        let body = self.fetch_body(url).await?;
        let document = parse_html(&body);
        tracing::debug!("Fetched and parsed {} ({} bytes)", url, body.len());

        Ok(Box::new(document))
    }
}

/// Maps a transport error onto the crawler's error taxonomy
fn classify_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: e,
        }
    }
}
