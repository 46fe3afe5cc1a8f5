//! Instances of a model type and their persistence lifecycle.
//!
//! A [`ResourceInstance`] holds the data attributes of one remote resource
//! and a handle to the [`Model`] that built it. Engine bookkeeping such as
//! snapshot history lives in separate fields, so no attribute name is
//! reserved.
//!
//! # Lifecycle
//!
//! ```text
//! New --save--> Persisted --remove--> Deleted
//!  |               ^   |
//!  |               |   +--fetch/save--> Persisted
//!  +--remove-------+---------------------> Deleted
//! ```
//!
//! An instance without a truthy identity is [`InstanceState::New`]. Saving
//! it issues a POST to the collection URL; once the server assigns an
//! identity, later saves use the model's update method against the
//! resource URL. Deleted is terminal: further `fetch`, `save` and `remove`
//! calls fail with [`ResourceError::Deleted`] without sending anything.
//!
//! Persistence methods take `&mut self`, so two operations cannot be in
//! flight on the same instance at once. When an operation fails the
//! instance's attributes are left as they were.

use std::fmt;

use serde_json::Value;

use crate::clients::{HttpError, HttpMethod};
use crate::config::ResourceConfig;
use crate::rest::{Channel, EventPayload, Model, ResourceError};

/// The data attributes of an instance.
pub type Attributes = serde_json::Map<String, Value>;

/// Where an instance is in its persistence lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceState {
    /// No identity yet; `save` creates it remotely.
    New,
    /// Has an identity; `save` updates it remotely.
    Persisted,
    /// Removed from the server; persistence operations are refused.
    Deleted,
}

/// One resource belonging to a model type.
#[derive(Clone)]
pub struct ResourceInstance {
    model: Model,
    attributes: Attributes,
    snapshots: Option<Vec<Attributes>>,
    deleted: bool,
}

// Verify ResourceInstance is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceInstance>();
};

/// Returns `false` for `null`, `false`, zero and the empty string.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Renders an identity as a URL path segment.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn path_segment(id: &Value) -> String {
    match id {
        Value::String(id) => id.clone(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

impl ResourceInstance {
    pub(crate) const fn new(model: Model, attributes: Attributes) -> Self {
        Self {
            model,
            attributes,
            snapshots: None,
            deleted: false,
        }
    }

    /// Returns the model type this instance belongs to.
    #[must_use]
    pub const fn model(&self) -> &Model {
        &self.model
    }

    /// Returns the model's resolved configuration.
    #[must_use]
    pub fn config(&self) -> &ResourceConfig {
        self.model.config()
    }

    /// Returns the identity attribute, if it is set to a truthy value.
    ///
    /// `null`, `false`, `0` and `""` count as no identity.
    #[must_use]
    pub fn identity(&self) -> Option<&Value> {
        self.attributes
            .get(self.config().id_attribute())
            .filter(|value| is_truthy(value))
    }

    /// Returns the URL of this resource.
    ///
    /// This is the collection URL followed by `/` and the identity. Strings
    /// are used as-is, whole numbers print without a fraction (`7.0` gives
    /// `7`) and other values use their JSON text. Without an identity it is
    /// the collection URL itself.
    #[must_use]
    pub fn resource_url(&self) -> String {
        match self.identity() {
            Some(id) => format!("{}/{}", self.model.url(), path_segment(id)),
            None => self.model.url().to_string(),
        }
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> InstanceState {
        if self.deleted {
            InstanceState::Deleted
        } else if self.identity().is_some() {
            InstanceState::Persisted
        } else {
            InstanceState::New
        }
    }

    /// Returns a copy of the data attributes.
    ///
    /// Mutating the copy does not affect the instance.
    #[must_use]
    pub fn attrs(&self) -> Attributes {
        self.attributes.clone()
    }

    /// Overwrites the given attributes.
    ///
    /// Keys in `attrs` replace existing values; keys absent from `attrs` are
    /// kept. Nothing is ever removed.
    pub fn set_attrs(&mut self, attrs: Attributes) -> &mut Self {
        for (key, value) in attrs {
            self.attributes.insert(key, value);
        }
        self
    }

    /// Replaces the whole attribute map.
    pub fn replace_attrs(&mut self, attrs: Attributes) -> &mut Self {
        self.attributes = attrs;
        self
    }

    /// Returns one attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Sets one attribute.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Borrows the data attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns the data attributes as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.attrs())
    }

    /// Returns the snapshot history, if snapshots are enabled.
    #[must_use]
    pub fn snapshots(&self) -> Option<&[Attributes]> {
        self.snapshots.as_deref()
    }

    /// Returns the snapshot history mutably, if snapshots are enabled.
    pub fn snapshots_mut(&mut self) -> Option<&mut Vec<Attributes>> {
        self.snapshots.as_mut()
    }

    /// Enables snapshot history with an empty stack.
    ///
    /// Existing history is kept if snapshots were already enabled.
    pub fn enable_snapshots(&mut self) -> &mut Self {
        self.snapshots.get_or_insert_with(Vec::new);
        self
    }

    /// Reloads this instance from its resource URL.
    ///
    /// The response attributes overwrite local ones, then the `get` channel
    /// is triggered with this instance.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Deleted`] for a deleted instance,
    /// [`ResourceError::Http`] for transport failures,
    /// [`ResourceError::UnexpectedPayload`] if the body is not an object, or
    /// [`ResourceError::Listener`] if a `get` listener fails.
    pub async fn fetch(&mut self) -> Result<&mut Self, ResourceError> {
        self.ensure_live()?;

        let request = self
            .model
            .request(HttpMethod::Get, self.resource_url())
            .build()
            .map_err(HttpError::from)?;
        let body = self.model.send(request).await?;
        let attrs = self.response_attrs(&body)?;

        self.set_attrs(attrs);
        self.model
            .trigger(Channel::Get.as_str(), &EventPayload::Instance(&*self))?;
        Ok(self)
    }

    /// Creates or updates this instance on the server.
    ///
    /// Without an identity this POSTs to the collection URL; otherwise it
    /// sends the model's update method to the resource URL. The body is the
    /// full attribute set. Response attributes overwrite local ones, the
    /// `save` channel is triggered, and snapshot history is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Deleted`] for a deleted instance,
    /// [`ResourceError::Http`] for transport failures,
    /// [`ResourceError::UnexpectedPayload`] if the body is not an object, or
    /// [`ResourceError::Listener`] if a `save` listener fails. Snapshot
    /// history is kept when a listener fails.
    pub async fn save(&mut self) -> Result<&mut Self, ResourceError> {
        self.ensure_live()?;

        let (method, url) = if self.identity().is_some() {
            (self.config().update_method(), self.resource_url())
        } else {
            (HttpMethod::Post, self.model.url().to_string())
        };

        let request = self
            .model
            .request(method, url)
            .body(self.to_json())
            .build()
            .map_err(HttpError::from)?;
        let body = self.model.send(request).await?;
        let attrs = self.response_attrs(&body)?;

        self.set_attrs(attrs);
        self.model
            .trigger(Channel::Save.as_str(), &EventPayload::Instance(&*self))?;

        if let Some(snapshots) = self.snapshots.as_mut() {
            snapshots.clear();
        }
        Ok(self)
    }

    /// Deletes this instance on the server.
    ///
    /// Issues a DELETE to the resource URL and ignores the response body.
    /// The instance becomes [`InstanceState::Deleted`] before the `delete`
    /// channel is triggered; its attributes stay readable.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Deleted`] if already deleted,
    /// [`ResourceError::Http`] for transport failures, or
    /// [`ResourceError::Listener`] if a `delete` listener fails. The
    /// instance stays deleted when a listener fails.
    pub async fn remove(&mut self) -> Result<&mut Self, ResourceError> {
        self.ensure_live()?;

        let request = self
            .model
            .request(HttpMethod::Delete, self.resource_url())
            .build()
            .map_err(HttpError::from)?;
        self.model.send(request).await?;

        self.deleted = true;
        self.model
            .trigger(Channel::Delete.as_str(), &EventPayload::Instance(&*self))?;
        Ok(self)
    }

    /// Alias of [`remove`](Self::remove).
    ///
    /// # Errors
    ///
    /// See [`remove`](Self::remove).
    pub async fn delete(&mut self) -> Result<&mut Self, ResourceError> {
        self.remove().await
    }

    /// Alias of [`remove`](Self::remove).
    ///
    /// # Errors
    ///
    /// See [`remove`](Self::remove).
    pub async fn destroy(&mut self) -> Result<&mut Self, ResourceError> {
        self.remove().await
    }

    fn ensure_live(&self) -> Result<(), ResourceError> {
        if self.deleted {
            return Err(ResourceError::Deleted {
                url: self.resource_url(),
            });
        }
        Ok(())
    }

    /// Deserializes a single-resource response into its attributes.
    fn response_attrs(&self, body: &Value) -> Result<Attributes, ResourceError> {
        let instance = self
            .model
            .serializer()
            .deserialize(&self.model, body)?
            .into_one()?;
        Ok(instance.attributes)
    }
}

impl fmt::Debug for ResourceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceInstance")
            .field("url", &self.model.url())
            .field("state", &self.state())
            .field("attributes", &self.attributes)
            .field("snapshots", &self.snapshots.as_ref().map(Vec::len))
            .finish()
    }
}
