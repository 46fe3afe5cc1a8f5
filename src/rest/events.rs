//! Lifecycle event channels for model types.
//!
//! Every model type owns one [`EventRegistry`] seeded with the four fixed
//! [`Channel`]s. Listeners are invoked synchronously, in registration order,
//! with an [`EventPayload`] borrowing the instance (or instances) involved.
//!
//! A listener returning `Err` stops the fan-out and fails the operation
//! that triggered it. The registry does not catch listener failures.
//!
//! # Example
//!
//! ```rust
//! use rest_model::rest::{listener, EventPayload, EventRegistry, Channel};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let mut registry = EventRegistry::new(&Channel::NAMES);
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = seen.clone();
//!
//! registry
//!     .on("query", listener(move |payload: &EventPayload<'_>| {
//!         counter.fetch_add(payload.len(), Ordering::SeqCst);
//!         Ok(())
//!     }))
//!     .unwrap();
//!
//! registry.trigger("query", &EventPayload::Collection(&[])).unwrap();
//! assert!(registry.trigger("bogus", &EventPayload::Collection(&[])).is_err());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::rest::{ResourceError, ResourceInstance};

/// Error returned by a listener; propagated to the caller of the operation.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// A callable subscribed to a channel.
pub type Listener = Arc<dyn Fn(&EventPayload<'_>) -> Result<(), ListenerError> + Send + Sync>;

/// Wraps a closure as a [`Listener`].
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&EventPayload<'_>) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The fixed lifecycle channels of a model type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// An instance was created or updated.
    Save,
    /// A collection query completed.
    Query,
    /// An instance was deleted.
    Delete,
    /// An instance was loaded, by id or by refresh.
    Get,
}

impl Channel {
    /// Names of every channel, in declaration order.
    pub const NAMES: [&'static str; 4] = ["save", "query", "delete", "get"];

    /// Returns the channel name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Query => "query",
            Self::Delete => "delete",
            Self::Get => "get",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a listener receives.
#[derive(Debug, Clone, Copy)]
pub enum EventPayload<'a> {
    /// A single instance (`save`, `delete`, `get`).
    Instance(&'a ResourceInstance),
    /// Every instance a query produced (`query`).
    Collection(&'a [ResourceInstance]),
}

impl<'a> EventPayload<'a> {
    /// Returns the instance for single-instance payloads.
    #[must_use]
    pub const fn instance(&self) -> Option<&'a ResourceInstance> {
        match self {
            Self::Instance(instance) => Some(instance),
            Self::Collection(_) => None,
        }
    }

    /// Returns the instances for collection payloads.
    #[must_use]
    pub const fn collection(&self) -> Option<&'a [ResourceInstance]> {
        match self {
            Self::Instance(_) => None,
            Self::Collection(instances) => Some(instances),
        }
    }

    /// Number of instances carried.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Instance(_) => 1,
            Self::Collection(instances) => instances.len(),
        }
    }

    /// Returns `true` for an empty collection payload.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One listener or an ordered list of listeners for a channel.
#[derive(Clone)]
pub enum Handlers {
    /// A single listener.
    One(Listener),
    /// Listeners in invocation order.
    Many(Vec<Listener>),
}

impl Handlers {
    /// Appends a listener, keeping registration order.
    #[must_use]
    pub fn push(self, listener: Listener) -> Self {
        let mut listeners = self.into_vec();
        listeners.push(listener);
        Self::Many(listeners)
    }

    /// Returns the listeners in invocation order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Listener> {
        match self {
            Self::One(listener) => vec![listener],
            Self::Many(listeners) => listeners,
        }
    }

    fn iter(&self) -> impl Iterator<Item = &Listener> {
        match self {
            Self::One(listener) => std::slice::from_ref(listener).iter(),
            Self::Many(listeners) => listeners.iter(),
        }
    }
}

impl From<Listener> for Handlers {
    fn from(listener: Listener) -> Self {
        Self::One(listener)
    }
}

impl From<Vec<Listener>> for Handlers {
    fn from(listeners: Vec<Listener>) -> Self {
        Self::Many(listeners)
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} listeners>", self.iter().count())
    }
}

/// Channel name to handlers, as carried by configuration.
pub type EventHandlers = BTreeMap<String, Handlers>;

/// A trigger or import named a channel the registry was not built with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown event channel '{channel}'")]
pub struct UnknownChannelError {
    /// The channel name that was provided.
    pub channel: String,
}

/// Named channels, each holding an ordered list of listeners.
///
/// The set of channel names is fixed at construction; no other name is ever
/// valid for the registry.
#[derive(Clone, Default)]
pub struct EventRegistry {
    channels: HashMap<String, Vec<Listener>>,
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<String> = self
            .channels
            .iter()
            .map(|(name, listeners)| format!("{name}: {}", listeners.len()))
            .collect();
        counts.sort();
        f.debug_struct("EventRegistry")
            .field("channels", &counts)
            .finish()
    }
}

// Verify EventRegistry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<EventRegistry>();
};

impl EventRegistry {
    /// Creates empty listener lists for exactly the given channel names.
    #[must_use]
    pub fn new(names: &[&str]) -> Self {
        Self {
            channels: names
                .iter()
                .map(|name| ((*name).to_string(), Vec::new()))
                .collect(),
        }
    }

    /// Creates a registry with the four fixed model channels.
    #[must_use]
    pub fn for_model() -> Self {
        Self::new(&Channel::NAMES)
    }

    /// Returns `true` if `name` was given at construction.
    #[must_use]
    pub fn has_channel(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Appends one listener to a channel.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownChannelError`] if `name` is not a registry channel.
    pub fn on(&mut self, name: &str, listener: Listener) -> Result<&mut Self, UnknownChannelError> {
        self.channel_mut(name)?.push(listener);
        Ok(self)
    }

    /// Appends every listener in `handlers` to its channel.
    ///
    /// Imports accumulate: existing listeners are kept and new ones are
    /// appended after them. Channel names are checked before anything is
    /// appended, so a failed import leaves the registry unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownChannelError`] for the first name that is not a
    /// registry channel.
    pub fn import(&mut self, handlers: &EventHandlers) -> Result<&mut Self, UnknownChannelError> {
        if let Some(name) = handlers.keys().find(|name| !self.has_channel(name)) {
            return Err(UnknownChannelError {
                channel: name.clone(),
            });
        }

        for (name, handlers) in handlers {
            self.channel_mut(name)?.extend(handlers.iter().cloned());
        }
        Ok(self)
    }

    /// Returns a copy of the listeners currently on a channel.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownChannelError`] if `name` is not a registry channel.
    pub fn listeners(&self, name: &str) -> Result<Vec<Listener>, UnknownChannelError> {
        self.channels
            .get(name)
            .cloned()
            .ok_or_else(|| UnknownChannelError {
                channel: name.to_string(),
            })
    }

    /// Number of listeners on a channel, `0` for unknown names.
    #[must_use]
    pub fn listener_count(&self, name: &str) -> usize {
        self.channels.get(name).map_or(0, Vec::len)
    }

    /// Invokes every listener on a channel, in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownChannel`] if `name` is not a registry
    /// channel, or [`ResourceError::Listener`] with the first listener failure.
    pub fn trigger(&self, name: &str, payload: &EventPayload<'_>) -> Result<(), ResourceError> {
        let listeners = self.channels.get(name).ok_or_else(|| UnknownChannelError {
            channel: name.to_string(),
        })?;
        notify(name, listeners, payload)
    }

    fn channel_mut(&mut self, name: &str) -> Result<&mut Vec<Listener>, UnknownChannelError> {
        self.channels
            .get_mut(name)
            .ok_or_else(|| UnknownChannelError {
                channel: name.to_string(),
            })
    }
}

/// Calls `listeners` in order, stopping at the first failure.
pub(crate) fn notify(
    channel: &str,
    listeners: &[Listener],
    payload: &EventPayload<'_>,
) -> Result<(), ResourceError> {
    tracing::debug!(
        "Triggering '{}' for {} listener(s) with {} instance(s)",
        channel,
        listeners.len(),
        payload.len()
    );

    for listener in listeners {
        listener(payload).map_err(|source| ResourceError::Listener {
            channel: channel.to_string(),
            source,
        })?;
    }
    Ok(())
}
