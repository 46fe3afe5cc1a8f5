//! Error types for model and instance operations.
//!
//! [`ResourceError`] is the single failure channel of every asynchronous
//! operation (`query`, `get_by_id`, `fetch`, `save`, `remove`). Transport
//! failures are wrapped unmodified in [`ResourceError::Http`]; the engine
//! never retries and never recovers locally.
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_model::rest::ResourceError;
//!
//! match thing.save().await {
//!     Ok(saved) => println!("Saved {:?}", saved.identity()),
//!     Err(ResourceError::Http(e)) if e.status() == Some(422) => {
//!         println!("Rejected: {e}");
//!     }
//!     Err(ResourceError::Listener { channel, source }) => {
//!         println!("A '{channel}' listener failed: {source}");
//!     }
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::clients::HttpError;
use crate::rest::events::{ListenerError, UnknownChannelError};

/// Error type for model and instance operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The transport failed (`TransportError`); passed through unmodified.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// An event was triggered on a channel the registry does not know.
    #[error(transparent)]
    UnknownChannel(#[from] UnknownChannelError),

    /// A listener failed while handling an event.
    ///
    /// The operation that triggered the event fails with this error even
    /// though the request itself succeeded.
    #[error("Listener on '{channel}' failed: {source}")]
    Listener {
        /// The channel being triggered.
        channel: String,
        /// The listener's error.
        #[source]
        source: ListenerError,
    },

    /// The response body had a shape the operation cannot use.
    #[error("Expected {expected} in response, got {found}")]
    UnexpectedPayload {
        /// What the operation needed (e.g. "an object", "an array").
        expected: &'static str,
        /// The JSON kind that was received.
        found: &'static str,
    },

    /// A persistence operation was attempted on a deleted instance.
    #[error("Resource at {url} was deleted")]
    Deleted {
        /// The URL the instance was deleted from.
        url: String,
    },

    /// An operation needs a plugin capability the model was built without.
    #[error("Capability '{capability}' is not installed on this model")]
    MissingCapability {
        /// The missing capability name.
        capability: &'static str,
    },

    /// Query parameters could not be serialized.
    #[error("Failed to serialize query parameters: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ResourceError {
    /// Returns the HTTP status code for server-side failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status(),
            _ => None,
        }
    }
}

/// Names the JSON kind of `value` for error messages.
pub(crate) const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
