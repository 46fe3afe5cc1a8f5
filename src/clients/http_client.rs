//! reqwest-backed [`Transport`].
//!
//! This module provides [`HttpClient`], the default transport for model
//! types. It sends JSON, decodes JSON, and maps non-2xx responses to
//! [`HttpError::Response`]. It never retries.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::transport::Transport;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP transport built on reqwest.
///
/// The client handles:
/// - Base URI prepended to every request URL (empty for absolute URLs)
/// - Default headers including User-Agent and `Accept: application/json`
/// - `Content-Type: application/json` on requests with a body
/// - JSON decoding of the response body
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust
/// use rest_model::clients::HttpClient;
///
/// let client = HttpClient::new("https://api.example.com");
/// assert_eq!(client.base_uri(), "https://api.example.com");
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Base URI (e.g., `https://api.example.com`).
    base_uri: String,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client that prefixes every URL with `base_uri`.
    ///
    /// Trailing slashes on `base_uri` are trimmed.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    #[must_use]
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self::build(base_uri.into(), None)
    }

    /// Creates a new HTTP client with a per-request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created.
    #[must_use]
    pub fn with_timeout(base_uri: impl Into<String>, timeout: Duration) -> Self {
        Self::build(base_uri.into(), Some(timeout))
    }

    fn build(base_uri: String, timeout: Option<Duration>) -> Self {
        let base_uri = base_uri.trim_end_matches('/').to_string();

        let mut default_headers = HashMap::new();
        default_headers.insert(
            "User-Agent".to_string(),
            format!("rest-model v{SDK_VERSION}"),
        );
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().expect("Failed to create HTTP client");

        Self {
            client,
            base_uri,
            default_headers,
        }
    }

    /// Adds a header sent with every request (e.g. an `Authorization` token).
    #[must_use]
    pub fn default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Returns the base URI for this client.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    fn reqwest_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new("")
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn request(&self, request: HttpRequest) -> Result<Value, HttpError> {
        request.verify()?;

        let url = format!("{}{}", self.base_uri, request.url());
        tracing::debug!("{} {}", request.http_method, url);

        let mut req_builder = self
            .client
            .request(Self::reqwest_method(request.http_method), &url);

        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let success = res.status().is_success();
        let body_text = res.text().await?;

        if !success {
            tracing::warn!("{} {} failed with status {}", request.http_method, url, code);
            return Err(HttpError::Response(HttpResponseError {
                code,
                message: body_text,
                url,
            }));
        }

        if body_text.trim().is_empty() {
            return Ok(serde_json::json!({}));
        }

        serde_json::from_str(&body_text).map_err(|e| {
            HttpError::Response(HttpResponseError {
                code,
                message: format!("Response body is not valid JSON: {e}"),
                url,
            })
        })
    }
}
