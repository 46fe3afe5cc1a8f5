//! Error types for model construction.
//!
//! This module contains [`ConfigError`], returned synchronously by
//! [`ResourceFactory::create`](crate::rest::ResourceFactory::create) when the
//! merged configuration cannot produce a model type.
//!
//! # Error Handling
//!
//! Configuration problems are detected when the model is created, never
//! lazily on the first request. Error messages are designed to be clear and
//! actionable.
//!
//! # Example
//!
//! ```rust
//! use rest_model::{create, ConfigError, ResourceOptions};
//!
//! let result = create(ResourceOptions::new());
//! assert!(matches!(result, Err(ConfigError::MissingUrl)));
//! ```

use thiserror::Error;

/// Errors that can occur while building a model type.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No layer supplied a non-empty URL.
    #[error("url option must be defined. Set it on the factory defaults or on the create call.")]
    MissingUrl,

    /// An event handler was configured for a channel the registry does not know.
    #[error("Unknown event channel '{channel}'. Expected one of: save, query, delete, get.")]
    UnknownChannel {
        /// The channel name that was provided.
        channel: String,
    },

    /// Two plugins declared the same capability.
    #[error("Plugins '{first}' and '{second}' both provide capability '{capability}'.")]
    PluginConflict {
        /// The capability declared twice.
        capability: &'static str,
        /// The plugin that declared it first.
        first: &'static str,
        /// The plugin that declared it again.
        second: &'static str,
    },

    /// The update method string is not a known HTTP verb.
    #[error("Invalid HTTP method '{method}'. Expected one of: GET, POST, PUT, PATCH, DELETE.")]
    InvalidHttpMethod {
        /// The invalid method that was provided.
        method: String,
    },

    /// The update method is a verb that cannot carry a request body.
    #[error(
        "Invalid update method '{method}'. Updates send the instance as the body; use PATCH, PUT or POST."
    )]
    InvalidUpdateMethod {
        /// The rejected method.
        method: String,
    },
}
