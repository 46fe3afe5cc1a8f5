//! Configuration for model types.
//!
//! This module provides the two configuration types used by the factory:
//!
//! - [`ResourceOptions`]: One configuration layer, built fluently. Every field
//!   is optional so layers can be merged.
//! - [`ResourceConfig`]: The resolved, immutable configuration a model type
//!   and all of its instances share by reference.
//!
//! # Precedence
//!
//! Layers merge field by field, later layers winning:
//!
//! 1. Built-in defaults
//! 2. Factory-session overrides ([`ResourceFactory::configure`](crate::rest::ResourceFactory::configure))
//! 3. Options passed to [`ResourceFactory::create`](crate::rest::ResourceFactory::create)
//!
//! The merge is shallow: event handler maps and plugin lists from a later
//! layer replace earlier ones whole.
//!
//! # Defaults
//!
//! - `prefix`, `suffix`: empty
//! - `id_attribute`: `"id"`
//! - `update_method`: `PATCH`
//! - `on`: no handlers
//! - `plugins`: the snapshot plugin alone
//! - `serializer`: [`JsonSerializer`](crate::rest::JsonSerializer) bound to the model
//! - `transport`: [`HttpClient::default`] (no base URI)
//!
//! # Example
//!
//! ```rust
//! use rest_model::ResourceOptions;
//! use rest_model::clients::HttpMethod;
//!
//! let config = ResourceOptions::new()
//!     .url("/things")
//!     .prefix("/api")
//!     .update_method(HttpMethod::Put)
//!     .resolve()
//!     .unwrap();
//!
//! assert_eq!(config.url(), "/api/things");
//! assert_eq!(config.id_attribute(), "id");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::clients::{HttpClient, HttpMethod, Transport};
use crate::error::ConfigError;
use crate::plugins::SnapshotPlugin;
use crate::rest::{EventHandlers, Handlers, Listener, Plugin, Serializer};

/// Default identity attribute name.
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// Default HTTP verb for updates of persisted instances.
pub const DEFAULT_UPDATE_METHOD: HttpMethod = HttpMethod::Patch;

/// One configuration layer.
///
/// All fields are optional; unset fields fall through to lower layers and
/// finally to the built-in defaults.
///
/// # Example
///
/// ```rust
/// use rest_model::ResourceOptions;
/// use rest_model::rest::listener;
///
/// let options = ResourceOptions::new()
///     .url("/things")
///     .suffix(".json")
///     .id_attribute("uuid")
///     .on("save", listener(|_| Ok(())))
///     .no_plugins();
/// ```
#[derive(Clone, Default)]
pub struct ResourceOptions {
    url: Option<String>,
    prefix: Option<String>,
    suffix: Option<String>,
    id_attribute: Option<String>,
    update_method: Option<HttpMethod>,
    on: Option<EventHandlers>,
    plugins: Option<Vec<Arc<dyn Plugin>>>,
    serializer: Option<Arc<dyn Serializer>>,
    transport: Option<Arc<dyn Transport>>,
}

impl ResourceOptions {
    /// Creates an empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the collection URL (required in at least one layer).
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the prefix prepended to the URL once at model creation.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the suffix the transport appends to every request path.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Sets the attribute used as primary identity.
    #[must_use]
    pub fn id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id_attribute = Some(name.into());
        self
    }

    /// Sets the HTTP verb used to update persisted instances.
    ///
    /// The verb must carry a body (`PATCH`, `PUT` or `POST`); `GET` and
    /// `DELETE` are rejected by [`resolve`](Self::resolve).
    #[must_use]
    pub const fn update_method(mut self, method: HttpMethod) -> Self {
        self.update_method = Some(method);
        self
    }

    /// Adds a listener for a channel.
    ///
    /// Repeated calls on the same layer accumulate in call order. Channel
    /// names are checked when the model is created.
    #[must_use]
    pub fn on(self, channel: impl Into<String>, listener: Listener) -> Self {
        self.handlers(channel, Handlers::One(listener))
    }

    /// Adds one listener or an ordered list of listeners for a channel.
    #[must_use]
    pub fn handlers(mut self, channel: impl Into<String>, handlers: impl Into<Handlers>) -> Self {
        let map = self.on.get_or_insert_with(EventHandlers::new);
        let channel = channel.into();
        let handlers = handlers.into();
        let merged = match map.remove(&channel) {
            Some(existing) => handlers
                .into_vec()
                .into_iter()
                .fold(existing, Handlers::push),
            None => handlers,
        };
        map.insert(channel, merged);
        self
    }

    /// Appends a plugin to this layer's plugin list.
    ///
    /// A layer's plugin list replaces the default list whole, so the default
    /// snapshot plugin is dropped unless it is listed too:
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use rest_model::ResourceOptions;
    /// use rest_model::plugins::SnapshotPlugin;
    ///
    /// let config = ResourceOptions::new()
    ///     .url("/things")
    ///     .plugin(Arc::new(SnapshotPlugin))
    ///     .resolve()
    ///     .unwrap();
    /// assert_eq!(config.plugins()[0].name(), "snapshot");
    /// ```
    #[must_use]
    pub fn plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.get_or_insert_with(Vec::new).push(plugin);
        self
    }

    /// Replaces this layer's plugin list.
    ///
    /// Like [`plugin`](Self::plugin), this drops the default snapshot plugin
    /// unless `plugins` contains it.
    #[must_use]
    pub fn plugins(mut self, plugins: Vec<Arc<dyn Plugin>>) -> Self {
        self.plugins = Some(plugins);
        self
    }

    /// Sets an empty plugin list, disabling the default snapshot plugin.
    #[must_use]
    pub fn no_plugins(self) -> Self {
        self.plugins(Vec::new())
    }

    /// Overrides the serializer used to turn responses into instances.
    #[must_use]
    pub fn serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Sets the transport used for every request.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Merges `over` on top of this layer; fields set in `over` win.
    #[must_use]
    pub fn merge(self, over: Self) -> Self {
        Self {
            url: over.url.or(self.url),
            prefix: over.prefix.or(self.prefix),
            suffix: over.suffix.or(self.suffix),
            id_attribute: over.id_attribute.or(self.id_attribute),
            update_method: over.update_method.or(self.update_method),
            on: over.on.or(self.on),
            plugins: over.plugins.or(self.plugins),
            serializer: over.serializer.or(self.serializer),
            transport: over.transport.or(self.transport),
        }
    }

    /// Applies the built-in defaults and produces the final configuration.
    ///
    /// The prefix, when non-empty, is prepended to the URL exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingUrl`] if no URL was set or it is empty,
    /// or [`ConfigError::InvalidUpdateMethod`] if the update method cannot
    /// carry a body.
    pub fn resolve(self) -> Result<ResourceConfig, ConfigError> {
        let base_url = self
            .url
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingUrl)?;
        let update_method = self.update_method.unwrap_or(DEFAULT_UPDATE_METHOD);
        if !update_method.requires_body() {
            return Err(ConfigError::InvalidUpdateMethod {
                method: update_method.to_string(),
            });
        }
        let prefix = self.prefix.unwrap_or_default();
        let url = format!("{prefix}{base_url}");

        Ok(ResourceConfig {
            url,
            prefix,
            suffix: self.suffix.unwrap_or_default(),
            id_attribute: self
                .id_attribute
                .unwrap_or_else(|| DEFAULT_ID_ATTRIBUTE.to_string()),
            update_method,
            on: self.on.unwrap_or_default(),
            plugins: self.plugins.unwrap_or_else(default_plugins),
            serializer: self.serializer,
            transport: self.transport.unwrap_or_else(default_transport),
        })
    }
}

fn default_plugins() -> Vec<Arc<dyn Plugin>> {
    vec![Arc::new(SnapshotPlugin)]
}

fn default_transport() -> Arc<dyn Transport> {
    Arc::new(HttpClient::default())
}

impl fmt::Debug for ResourceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceOptions")
            .field("url", &self.url)
            .field("prefix", &self.prefix)
            .field("suffix", &self.suffix)
            .field("id_attribute", &self.id_attribute)
            .field("update_method", &self.update_method)
            .field("on", &self.on)
            .field(
                "plugins",
                &self
                    .plugins
                    .as_ref()
                    .map(|p| p.iter().map(|p| p.name()).collect::<Vec<_>>()),
            )
            .field("serializer", &self.serializer)
            .field("transport", &self.transport)
            .finish()
    }
}

/// Resolved configuration for one model type.
///
/// Created once per factory call and shared by `Arc` across the model type
/// and every instance it produces. It is never mutated after construction.
#[derive(Clone)]
pub struct ResourceConfig {
    url: String,
    prefix: String,
    suffix: String,
    id_attribute: String,
    update_method: HttpMethod,
    on: EventHandlers,
    plugins: Vec<Arc<dyn Plugin>>,
    serializer: Option<Arc<dyn Serializer>>,
    transport: Arc<dyn Transport>,
}

impl ResourceConfig {
    /// Returns the collection URL, prefix already applied.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the prefix that was applied to the URL.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the suffix appended to request paths.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Returns the identity attribute name.
    #[must_use]
    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    /// Returns the HTTP verb used for updates.
    #[must_use]
    pub const fn update_method(&self) -> HttpMethod {
        self.update_method
    }

    /// Returns the configured event handlers.
    #[must_use]
    pub const fn handlers(&self) -> &EventHandlers {
        &self.on
    }

    /// Returns the plugins, in installation order.
    #[must_use]
    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    /// Returns the serializer override, if any.
    #[must_use]
    pub fn serializer(&self) -> Option<&Arc<dyn Serializer>> {
        self.serializer.as_ref()
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

impl fmt::Debug for ResourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceConfig")
            .field("url", &self.url)
            .field("prefix", &self.prefix)
            .field("suffix", &self.suffix)
            .field("id_attribute", &self.id_attribute)
            .field("update_method", &self.update_method)
            .field("on", &self.on)
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("serializer", &self.serializer)
            .field("transport", &self.transport)
            .finish()
    }
}

// Verify ResourceConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceConfig>();
};
