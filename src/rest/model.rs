//! Model types: one per configured REST collection.
//!
//! A [`Model`] is a cheap, cloneable handle over the state shared by a
//! model type and every instance it produces: the resolved configuration,
//! the event registry, the serializer and the hooks plugins installed.
//!
//! Models are created by [`ResourceFactory::create`](crate::rest::ResourceFactory::create).
//! Two separately created models are independent, even when they point at
//! the same URL.
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_model::{create, ResourceOptions};
//! use serde_json::json;
//!
//! let things = create(ResourceOptions::new().url("/things"))?;
//!
//! let active = things.query(&json!({"active": true})).await?;
//! let seven = things.get_by_id(7).await?;
//! let fresh = things.build(json!({"name": "a"}).as_object().cloned().unwrap());
//! ```

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde_json::Value;

use crate::clients::{encode_query, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder};
use crate::config::ResourceConfig;
use crate::rest::events::notify;
use crate::rest::{
    Attributes, Channel, EventHandlers, EventPayload, EventRegistry, InstanceHook, Listener,
    ResourceError, ResourceInstance, Serializer, UnknownChannelError,
};

struct ModelInner {
    config: Arc<ResourceConfig>,
    events: RwLock<EventRegistry>,
    serializer: Arc<dyn Serializer>,
    hooks: Vec<Arc<dyn InstanceHook>>,
}

/// A model type bound to one REST collection.
///
/// # Thread Safety
///
/// `Model` is `Send + Sync`. Listeners may be added at any time; a trigger
/// sees the listeners registered when it starts.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

// Verify Model is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Model>();
};

impl Model {
    pub(crate) fn from_parts(
        config: Arc<ResourceConfig>,
        events: EventRegistry,
        serializer: Arc<dyn Serializer>,
        hooks: Vec<Arc<dyn InstanceHook>>,
    ) -> Self {
        Self {
            inner: Arc::new(ModelInner {
                config,
                events: RwLock::new(events),
                serializer,
                hooks,
            }),
        }
    }

    /// Returns the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &ResourceConfig {
        &self.inner.config
    }

    /// Returns the collection URL.
    #[must_use]
    pub fn url(&self) -> &str {
        self.inner.config.url()
    }

    /// Returns the serializer used for every response of this model.
    #[must_use]
    pub fn serializer(&self) -> &Arc<dyn Serializer> {
        &self.inner.serializer
    }

    /// Returns `true` if both handles refer to the same model type.
    #[must_use]
    pub fn same_model(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Constructs an instance with the given initial attributes.
    ///
    /// Plugin hooks run on the new instance in installation order.
    #[must_use]
    pub fn build(&self, attrs: Attributes) -> ResourceInstance {
        let mut instance = ResourceInstance::new(self.clone(), attrs);
        for hook in &self.inner.hooks {
            hook.on_build(&mut instance);
        }
        instance
    }

    /// Constructs an instance with no attributes.
    #[must_use]
    pub fn build_empty(&self) -> ResourceInstance {
        self.build(Attributes::new())
    }

    /// Subscribes a listener to a channel.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownChannelError`] if `channel` is not a model channel.
    pub fn on(&self, channel: &str, listener: Listener) -> Result<(), UnknownChannelError> {
        self.inner
            .events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .on(channel, listener)?;
        Ok(())
    }

    /// Appends every listener in `handlers` to its channel.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownChannelError`] for the first unknown channel name;
    /// nothing is appended in that case.
    pub fn import(&self, handlers: &EventHandlers) -> Result<(), UnknownChannelError> {
        self.inner
            .events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .import(handlers)?;
        Ok(())
    }

    /// Number of listeners on a channel.
    #[must_use]
    pub fn listener_count(&self, channel: &str) -> usize {
        self.inner
            .events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .listener_count(channel)
    }

    /// Invokes the listeners of a channel with `payload`.
    ///
    /// The listener list is copied before any listener runs, so a listener
    /// may subscribe further listeners without deadlocking.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownChannel`] for an unknown name, or
    /// [`ResourceError::Listener`] with the first listener failure.
    pub fn trigger(&self, channel: &str, payload: &EventPayload<'_>) -> Result<(), ResourceError> {
        let listeners = self
            .inner
            .events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners(channel)?;
        notify(channel, &listeners, payload)
    }

    /// Lists the collection.
    ///
    /// `params` is encoded as the query string of a GET to the collection
    /// URL. The JSON array response is deserialized into instances and the
    /// `query` channel is triggered with all of them before they are
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Http`] for transport failures,
    /// [`ResourceError::UnexpectedPayload`] if the body is not an array,
    /// [`ResourceError::Serialization`] if `params` is not a map or a list of
    /// pairs, or [`ResourceError::Listener`] if a `query` listener fails.
    pub async fn query<P: Serialize + ?Sized>(
        &self,
        params: &P,
    ) -> Result<Vec<ResourceInstance>, ResourceError> {
        let query = encode_query(params)?;
        let request = self
            .request(HttpMethod::Get, self.url())
            .query(query)
            .build()
            .map_err(HttpError::from)?;

        let body = self.send(request).await?;
        let instances = self.serializer().deserialize(self, &body)?.into_many()?;

        self.trigger(
            Channel::Query.as_str(),
            &EventPayload::Collection(&instances),
        )?;
        Ok(instances)
    }

    /// Loads one instance by identity.
    ///
    /// Issues a GET to `collection_url/id`, deserializes the object response
    /// and triggers the `get` channel with the instance.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Http`] for transport failures,
    /// [`ResourceError::UnexpectedPayload`] if the body is not an object, or
    /// [`ResourceError::Listener`] if a `get` listener fails.
    pub async fn get_by_id(
        &self,
        id: impl fmt::Display + Send,
    ) -> Result<ResourceInstance, ResourceError> {
        let url = format!("{}/{}", self.url(), id);
        let request = self
            .request(HttpMethod::Get, url)
            .build()
            .map_err(HttpError::from)?;

        let body = self.send(request).await?;
        let instance = self.serializer().deserialize(self, &body)?.into_one()?;

        self.trigger(Channel::Get.as_str(), &EventPayload::Instance(&instance))?;
        Ok(instance)
    }

    /// Starts a request for this model, with the configured suffix applied.
    pub(crate) fn request(&self, method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequest::builder(method, path).suffix(self.config().suffix())
    }

    /// Sends a request through the configured transport.
    pub(crate) async fn send(&self, request: HttpRequest) -> Result<Value, ResourceError> {
        tracing::debug!("{} {}", request.http_method, request.url());
        let body = self.config().transport().request(request).await?;
        Ok(body)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("url", &self.url())
            .field("events", &self.inner.events)
            .field("serializer", &self.inner.serializer)
            .field("hooks", &format!("<{} hooks>", self.inner.hooks.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceOptions;
    use crate::rest::{create, listener};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn things() -> Model {
        create(ResourceOptions::new().url("/things").no_plugins()).unwrap()
    }

    #[test]
    fn test_build_keeps_initial_attributes() {
        let model = things();
        let instance = model.build(json!({"id": 1, "name": "a"}).as_object().cloned().unwrap());
        assert_eq!(instance.get("name"), Some(&json!("a")));
        assert!(instance.model().same_model(&model));
    }

    #[test]
    fn test_separate_models_are_independent() {
        let first = things();
        let second = things();

        first.on("save", listener(|_| Ok(()))).unwrap();

        assert!(!first.same_model(&second));
        assert_eq!(first.listener_count("save"), 1);
        assert_eq!(second.listener_count("save"), 0);
    }

    #[test]
    fn test_clones_share_registry() {
        let model = things();
        let clone = model.clone();
        clone.on("get", listener(|_| Ok(()))).unwrap();
        assert_eq!(model.listener_count("get"), 1);
        assert!(model.same_model(&clone));
    }

    #[test]
    fn test_listener_may_subscribe_during_trigger() {
        let model = things();
        let inner = model.clone();
        model
            .on(
                "query",
                listener(move |_| {
                    inner.on("query", listener(|_| Ok(())))?;
                    Ok(())
                }),
            )
            .unwrap();

        model
            .trigger("query", &EventPayload::Collection(&[]))
            .unwrap();
        assert_eq!(model.listener_count("query"), 2);
    }

    #[test]
    fn test_trigger_unknown_channel() {
        let model = things();
        assert!(matches!(
            model.trigger("bogus", &EventPayload::Collection(&[])),
            Err(ResourceError::UnknownChannel(_))
        ));
    }

    #[test]
    fn test_trigger_passes_instance() {
        let model = things();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        model
            .on(
                "save",
                listener(move |payload| {
                    let id = payload
                        .instance()
                        .and_then(|i| i.identity())
                        .and_then(Value::as_u64)
                        .unwrap_or_default();
                    counter.store(usize::try_from(id)?, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .unwrap();

        let instance = model.build(json!({"id": 42}).as_object().cloned().unwrap());
        model
            .trigger("save", &EventPayload::Instance(&instance))
            .unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn test_request_applies_suffix() {
        let model = create(
            ResourceOptions::new()
                .url("/things")
                .suffix(".json")
                .no_plugins(),
        )
        .unwrap();
        let request = model
            .request(HttpMethod::Get, "/things/3")
            .build()
            .unwrap();
        assert_eq!(request.url(), "/things/3.json");
    }
}
