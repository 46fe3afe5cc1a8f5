//! Transport error types.
//!
//! This module contains the error types a [`Transport`](crate::clients::Transport)
//! reports when a request cannot be completed.
//!
//! # Error Handling
//!
//! - [`HttpResponseError`]: Non-2xx HTTP responses from the server
//! - [`InvalidHttpRequestError`]: A request failed validation before sending
//! - [`HttpError`]: Unified transport error, forwarded unmodified to callers
//!
//! The resource engine never retries and never recovers locally; every
//! [`HttpError`] surfaces inside [`ResourceError::Http`](crate::rest::ResourceError::Http).
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_model::clients::HttpError;
//!
//! match transport.request(request).await {
//!     Ok(body) => println!("Decoded: {body}"),
//!     Err(HttpError::Response(e)) => println!("Server said {}: {}", e.code, e.message),
//!     Err(HttpError::InvalidRequest(e)) => println!("Invalid request: {e}"),
//!     Err(HttpError::Network(e)) => println!("Network error: {e}"),
//! }
//! ```

use thiserror::Error;

/// Error returned when a request receives a non-successful response.
///
/// # Example
///
/// ```rust
/// use rest_model::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 404,
///     message: r#"{"error":"Not found"}"#.to_string(),
///     url: "/things/7".to_string(),
/// };
///
/// assert_eq!(error.code, 404);
/// assert!(error.to_string().contains("/things/7"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("HTTP {code} from {url}: {message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The raw response body, or an empty string.
    pub message: String,
    /// The request URL that produced the response.
    pub url: String,
}

/// Error returned when a request fails validation.
///
/// Raised before a request is sent:
/// - a GET request carrying a body
/// - a POST, PUT or PATCH request without a body
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A GET request was given a body; parameters belong in the query string.
    #[error("Cannot send a body with {method}; encode parameters into the query string.")]
    UnexpectedBody {
        /// The HTTP method that must not carry a body.
        method: String,
    },

    /// A POST, PUT or PATCH request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Unified transport error (`TransportError`).
///
/// # Example
///
/// ```rust,ignore
/// use rest_model::clients::HttpError;
///
/// match result {
///     Ok(body) => { /* handle success */ }
///     Err(HttpError::Response(e)) => { /* handle server error */ }
///     Err(HttpError::InvalidRequest(e)) => { /* handle validation error */ }
///     Err(HttpError::Network(e)) => { /* handle network error */ }
/// }
/// ```
#[derive(Debug, Error)]
pub enum HttpError {
    /// An HTTP response error (non-2xx status code).
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network, connection or body-decoding error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HttpError {
    /// Returns the HTTP status code when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_error_includes_status_and_url() {
        let error = HttpResponseError {
            code: 422,
            message: r#"{"errors":{"name":["can't be blank"]}}"#.to_string(),
            url: "/things".to_string(),
        };
        let message = error.to_string();
        assert!(message.starts_with("HTTP 422 from /things"));
        assert!(message.contains("can't be blank"));
    }

    #[test]
    fn test_invalid_request_error_missing_body() {
        let error = InvalidHttpRequestError::MissingBody {
            method: "POST".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot use POST without specifying data.");
    }

    #[test]
    fn test_invalid_request_error_unexpected_body() {
        let error = InvalidHttpRequestError::UnexpectedBody {
            method: "GET".to_string(),
        };
        assert!(error.to_string().contains("query string"));
    }

    #[test]
    fn test_status_only_for_response_errors() {
        let error = HttpError::from(HttpResponseError {
            code: 500,
            message: String::new(),
            url: "/things".to_string(),
        });
        assert_eq!(error.status(), Some(500));

        let error = HttpError::from(InvalidHttpRequestError::MissingBody {
            method: "PUT".to_string(),
        });
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_error_types_implement_std_error() {
        let response_error: &dyn std::error::Error = &HttpResponseError {
            code: 400,
            message: "test".to_string(),
            url: "/".to_string(),
        };
        let _ = response_error;

        let invalid_error: &dyn std::error::Error = &InvalidHttpRequestError::MissingBody {
            method: "POST".to_string(),
        };
        let _ = invalid_error;
    }
}
