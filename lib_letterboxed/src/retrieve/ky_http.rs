//! # HTTP Retrieval Utilities
//!
//! This module provides an asynchronous client wrapper around `reqwest`.
//! It includes middleware support for exponential backoff retries and a
//! standardized response container for text bodies (HTML pages).

use std::time::Duration;

use anyhow::Context;
use reqwest::{
    header::{ACCEPT, USER_AGENT},
    Url,
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

/// A standardized container for HTTP responses.
///
/// Wraps the body along with metadata about the transaction. Non-2xx
/// statuses are reported through `success` rather than as an `Err`, so the
/// caller decides how to surface them.
#[derive(Debug)]
pub struct ApiResponse {
    /// The response body when the status was in the 2xx range.
    pub body: Option<String>,
    /// The raw error body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
}

/// Tunables for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries on transient failures (connect errors, 5xx, 429).
    pub max_retries: u32,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for ApiClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) letterboxed-api/0.1".to_string(),
        }
    }
}

/// A flexible asynchronous HTTP client.
///
/// Built on top of `reqwest_middleware`, it resolves relative paths against a
/// base URL and retries transient failures with exponential backoff.
pub struct ApiClient {
    /// The underlying middleware-enabled client.
    inner: ClientWithMiddleware,
    /// The base URL to which all relative paths are joined.
    base_url: Url,
    /// The user agent sent with every request.
    user_agent: String,
}

impl ApiClient {
    /// Creates a new `ApiClient` instance with a retry policy.
    ///
    /// # Arguments
    /// * `base_url` - The absolute base URL (e.g., "https://www.nytimes.com/puzzles/").
    /// * `options` - Timeout, retry count and user agent.
    ///
    /// # Errors
    /// Returns an error if `base_url` is not an absolute URL or the underlying
    /// client cannot be built.
    pub fn new(base_url: &str, options: ApiClientOptions) -> anyhow::Result<Self> {
        let url = Url::parse(base_url)
            .with_context(|| format!("Invalid base URL (must be absolute): {}", base_url))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(options.max_retries);

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let inner = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            inner,
            base_url: url,
            user_agent: options.user_agent,
        })
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Performs a `GET` and returns the body as text.
    ///
    /// An empty `path` targets the base URL itself.
    ///
    /// # Errors
    /// Returns an `anyhow::Error` if URL joining, network execution, or body
    /// decoding fails. HTTP error statuses are not errors; see [`ApiResponse`].
    pub async fn get_text(&self, path: &str) -> anyhow::Result<ApiResponse> {
        let full_url = if path.is_empty() {
            self.base_url.clone()
        } else {
            self.base_url.join(path)?
        };

        let response: reqwest::Response = self
            .inner
            .get(full_url.clone())
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, "text/html,application/xhtml+xml,*/*;q=0.8")
            .send()
            .await
            .with_context(|| format!("Request to {} failed", full_url))?;
        let status = response.status();

        if status.is_success() {
            let body = response
                .text()
                .await
                .with_context(|| format!("Failed to read body from {}", full_url))?;
            Ok(ApiResponse {
                body: Some(body),
                error_body: None,
                status: status.as_u16(),
                success: true,
            })
        } else {
            // Capture the error body as a string for debugging
            let error_text = response.text().await.ok();
            Ok(ApiResponse {
                body: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
            })
        }
    }
}
