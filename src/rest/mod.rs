//! The resource engine.
//!
//! This module maps a configured REST collection to a model type:
//!
//! - **[`ResourceFactory`]**: Turns layered [`ResourceOptions`](crate::ResourceOptions) into a [`Model`]
//! - **[`Model`]**: Type-level operations (`query`, `get_by_id`, `build`) and the event registry
//! - **[`ResourceInstance`]**: Identity, URL composition, attributes and `fetch`/`save`/`remove`
//! - **[`EventRegistry`]**: Synchronous lifecycle notifications on four fixed channels
//! - **[`Serializer`]**: Turns response bodies into instances
//! - **[`Plugin`]**: Extends a model once at creation
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_model::{create, ResourceOptions};
//! use rest_model::rest::listener;
//! use serde_json::json;
//!
//! let things = create(
//!     ResourceOptions::new()
//!         .url("/things")
//!         .prefix("https://api.example.com")
//!         .on("save", listener(|payload| {
//!             println!("saved {:?}", payload.instance().and_then(|i| i.identity()));
//!             Ok(())
//!         })),
//! )?;
//!
//! // GET https://api.example.com/things?active=true
//! let active = things.query(&json!({"active": true})).await?;
//!
//! // POST https://api.example.com/things
//! let mut thing = things.build(json!({"name": "a"}).as_object().cloned().unwrap());
//! thing.save().await?;
//!
//! // PATCH https://api.example.com/things/{id}
//! thing.set("name", json!("b"));
//! thing.save().await?;
//!
//! // DELETE https://api.example.com/things/{id}
//! thing.remove().await?;
//! ```

mod errors;
pub mod events;
mod factory;
mod instance;
mod model;
mod plugin;
mod serializer;

pub(crate) use errors::json_kind;
pub use errors::ResourceError;
pub use events::{
    listener, Channel, EventHandlers, EventPayload, EventRegistry, Handlers, Listener,
    ListenerError, UnknownChannelError,
};
pub use factory::{create, ResourceFactory};
pub use instance::{Attributes, InstanceState, ResourceInstance};
pub use model::Model;
pub use plugin::{InstanceHook, ModelBuilder, Plugin};
pub use serializer::{Deserialized, EnvelopeSerializer, JsonSerializer, Serializer};
