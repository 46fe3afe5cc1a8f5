//! Transport collaborator for the resource engine.
//!
//! The engine never talks to the network directly. It builds an
//! [`HttpRequest`] and hands it to a [`Transport`], which returns the
//! JSON-decoded response body or an [`HttpError`].
//!
//! # Overview
//!
//! - [`Transport`]: The object-safe async request trait
//! - [`HttpClient`]: The default reqwest-backed transport
//! - [`HttpRequest`]: A request to be sent (method, path, suffix, query, body)
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, PATCH, DELETE)
//! - [`encode_query`]: Flat parameter mapping to query string
//! - [`HttpError`]: Transport failures, forwarded unmodified by the engine
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_model::clients::{HttpClient, HttpMethod, HttpRequest, Transport};
//!
//! let client = HttpClient::new("https://api.example.com");
//! let request = HttpRequest::builder(HttpMethod::Get, "/things")
//!     .query("active=true")
//!     .build()?;
//!
//! let body = client.request(request).await?;
//! ```
//!
//! # Retry Behavior
//!
//! None. Failures are returned on the first attempt.

mod errors;
mod http_client;
mod http_request;
mod query;
mod transport;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use query::encode_query;
pub use transport::Transport;
