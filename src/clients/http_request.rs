//! HTTP request types handed to a [`Transport`](crate::clients::Transport).
//!
//! This module provides the [`HttpRequest`] type and its builder. The
//! resource engine builds one request per persistence operation; the
//! transport turns it into a network call.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::clients::errors::InvalidHttpRequestError;
use crate::error::ConfigError;

/// HTTP methods used by the resource engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method for replacing resources.
    Put,
    /// HTTP PATCH method for partially updating resources.
    Patch,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl HttpMethod {
    /// Returns the uppercase verb as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Returns `true` for methods that must carry a request body.
    #[must_use]
    pub const fn requires_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ConfigError;

    /// Parses a verb case-insensitively (`"patch"`, `"PUT"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(ConfigError::InvalidHttpMethod {
                method: s.to_string(),
            }),
        }
    }
}

/// A request to be sent by a transport.
///
/// The `path` is the resource URL as composed by the engine (prefix,
/// collection URL, optional `/id`). The `suffix` and the pre-encoded `query`
/// are appended by [`url`](Self::url).
///
/// # Example
///
/// ```rust
/// use rest_model::clients::{HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "/things")
///     .suffix(".json")
///     .query("active=true")
///     .build()
///     .unwrap();
/// assert_eq!(request.url(), "/things.json?active=true");
///
/// let request = HttpRequest::builder(HttpMethod::Patch, "/things/7")
///     .body(json!({"id": 7, "name": "a"}))
///     .build()
///     .unwrap();
/// assert_eq!(request.url(), "/things/7");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The resource path, without suffix or query string.
    pub path: String,
    /// Appended to the path before the query string (e.g. `.json`).
    pub suffix: String,
    /// Pre-encoded query string, without the leading `?`.
    pub query: String,
    /// The JSON request body, if any.
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, path)
    }

    /// Returns the full request URL: `path + suffix`, then `?query` when the
    /// query is non-empty.
    #[must_use]
    pub fn url(&self) -> String {
        let mut url = format!("{}{}", self.path, self.suffix);
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&self.query);
        }
        url
    }

    /// Validates the request, ensuring it meets all requirements.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if:
    /// - `http_method` is `Get` and `body` is `Some`
    /// - `http_method` is `Post`, `Put` or `Patch` and `body` is `None`
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if self.http_method == HttpMethod::Get && self.body.is_some() {
            return Err(InvalidHttpRequestError::UnexpectedBody {
                method: self.http_method.to_string(),
            });
        }

        if self.http_method.requires_body() && self.body.is_none() {
            return Err(InvalidHttpRequestError::MissingBody {
                method: self.http_method.to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    path: String,
    suffix: String,
    query: String,
    body: Option<Value>,
}

impl HttpRequestBuilder {
    /// Creates a new builder with the required method and path.
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            http_method: method,
            path: path.into(),
            suffix: String::new(),
            query: String::new(),
            body: None,
        }
    }

    /// Sets the JSON request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the URL suffix.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Sets the pre-encoded query string (no leading `?`).
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            path: self.path,
            suffix: self.suffix,
            query: self.query,
            body: self.body,
        };
        request.verify()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_http_method_parses_case_insensitively() {
        assert_eq!("patch".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert_eq!("Put".parse::<HttpMethod>(), Ok(HttpMethod::Put));
        assert!(matches!(
            "FETCH".parse::<HttpMethod>(),
            Err(ConfigError::InvalidHttpMethod { method }) if method == "FETCH"
        ));
    }

    #[test]
    fn test_builder_creates_valid_get_request() {
        let request = HttpRequest::builder(HttpMethod::Get, "/things")
            .build()
            .unwrap();

        assert_eq!(request.http_method, HttpMethod::Get);
        assert_eq!(request.url(), "/things");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_empty_query_omits_question_mark() {
        let request = HttpRequest::builder(HttpMethod::Get, "/things")
            .query("")
            .build()
            .unwrap();
        assert_eq!(request.url(), "/things");
    }

    #[test]
    fn test_suffix_goes_before_query() {
        let request = HttpRequest::builder(HttpMethod::Get, "/things/7")
            .suffix(".json")
            .query("fields=id")
            .build()
            .unwrap();
        assert_eq!(request.url(), "/things/7.json?fields=id");
    }

    #[test]
    fn test_verify_requires_body_for_patch() {
        let result = HttpRequest::builder(HttpMethod::Patch, "/things/7").build();

        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::MissingBody { method }) if method == "PATCH"
        ));
    }

    #[test]
    fn test_verify_rejects_body_on_get() {
        let result = HttpRequest::builder(HttpMethod::Get, "/things")
            .body(json!({"active": true}))
            .build();

        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::UnexpectedBody { .. })
        ));
    }

    #[test]
    fn test_delete_without_body_is_valid() {
        let request = HttpRequest::builder(HttpMethod::Delete, "/things/7")
            .build()
            .unwrap();
        assert!(request.body.is_none());
    }
}
