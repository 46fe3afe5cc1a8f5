//! # rest-model
//!
//! Client-side models for REST collections.
//!
//! ## Overview
//!
//! This crate maps a configured REST collection endpoint to a model type.
//! Instances carry their attributes plus `fetch`, `save` and `remove`, and
//! move through a create/update/delete lifecycle against the collection:
//!
//! - Layered configuration via [`ResourceOptions`] and [`ResourceFactory`]
//! - Model types ([`Model`]) with `query`, `get_by_id` and `build`
//! - Instances ([`ResourceInstance`]) with identity, URL composition and persistence
//! - Lifecycle events on the `save`, `query`, `delete` and `get` channels
//! - Pluggable serializers and plugins, with snapshot tracking built in
//! - A reqwest-backed transport, replaceable through [`clients::Transport`]
//!
//! ## Quick Start
//!
//! ```rust
//! use rest_model::{create, ResourceOptions};
//! use rest_model::clients::HttpMethod;
//!
//! let things = create(
//!     ResourceOptions::new()
//!         .url("/things")
//!         .prefix("https://api.example.com")
//!         .update_method(HttpMethod::Put),
//! )
//! .unwrap();
//!
//! assert_eq!(things.url(), "https://api.example.com/things");
//! ```
//!
//! ## Persistence
//!
//! ```rust,ignore
//! use rest_model::{create, ResourceOptions};
//! use rest_model::plugins::SnapshotExt;
//! use serde_json::json;
//!
//! let things = create(ResourceOptions::new().url("https://api.example.com/things"))?;
//!
//! let mut thing = things.get_by_id(7).await?;
//! thing.snapshot()?;
//! thing.set("name", json!("renamed"));
//!
//! if thing.is_dirty()? {
//!     thing.save().await?; // PATCH /things/7
//! }
//! ```
//!
//! ## Custom Transports
//!
//! Every request goes through the configured [`clients::Transport`]. The
//! default is [`clients::HttpClient`]; tests and applications with their own
//! HTTP stack can supply another implementation:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rest_model::{create, ResourceOptions};
//! use rest_model::clients::HttpClient;
//!
//! let client = HttpClient::new("https://api.example.com")
//!     .default_header("Authorization", "Bearer token");
//!
//! let things = create(
//!     ResourceOptions::new()
//!         .url("/things")
//!         .transport(Arc::new(client)),
//! )?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Overrides live on a [`ResourceFactory`] value
//! - **Fail-fast configuration**: Bad URLs, update methods, channels and plugin sets fail at creation
//! - **Thread-safe**: Models and instances are `Send + Sync`
//! - **Async-first**: Operations are futures run on the caller's runtime
//! - **Explicit lifecycle**: Deleted instances refuse further persistence

pub mod clients;
pub mod config;
pub mod error;
pub mod plugins;
pub mod rest;

// Re-export public types at crate root for convenience
pub use config::{ResourceConfig, ResourceOptions};
pub use error::ConfigError;

// Re-export the resource engine
pub use rest::{
    create, listener, Attributes, Channel, EventPayload, InstanceState, Model, ResourceError,
    ResourceFactory, ResourceInstance,
};

// Re-export HTTP client types
pub use clients::{HttpClient, HttpError, HttpMethod, HttpRequest, Transport};
