//! The transport seam between the resource engine and the network.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::clients::{HttpError, HttpRequest};

/// Issues requests on behalf of a model type.
///
/// Implementations must:
/// - send `request.url()` with `request.http_method`
/// - send `request.body` as JSON when present (never for GET)
/// - JSON-decode the response body (an empty body decodes to `{}`)
/// - fail with [`HttpError`] on non-success status or network failure
///
/// The engine forwards every error unmodified and never retries.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use rest_model::clients::{HttpError, HttpRequest, Transport};
/// use serde_json::{json, Value};
///
/// #[derive(Debug)]
/// struct Canned;
///
/// #[async_trait]
/// impl Transport for Canned {
///     async fn request(&self, _request: HttpRequest) -> Result<Value, HttpError> {
///         Ok(json!({"id": 1}))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: fmt::Debug + Send + Sync {
    /// Sends `request` and returns the decoded response body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request is invalid, the network call
    /// fails, or the server answers with a non-success status.
    async fn request(&self, request: HttpRequest) -> Result<Value, HttpError>;
}
