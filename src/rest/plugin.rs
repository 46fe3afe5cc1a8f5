//! Plugin extension point.
//!
//! A [`Plugin`] runs once per model type, after the registry and serializer
//! are in place and before the model is handed to the caller. It receives a
//! [`ModelBuilder`] through which it can:
//!
//! - subscribe listeners to the model's channels
//! - install an [`InstanceHook`] that runs for every instance the model builds
//! - replace the serializer
//!
//! Plugins declare the capabilities they provide. The factory refuses to
//! build a model when two plugins declare the same capability, so plugins
//! never silently override each other.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rest_model::rest::{InstanceHook, ModelBuilder, Plugin, ResourceInstance};
//! use serde_json::json;
//!
//! #[derive(Debug)]
//! struct Timestamps;
//!
//! impl InstanceHook for Timestamps {
//!     fn on_build(&self, instance: &mut ResourceInstance) {
//!         if instance.get("created_at").is_none() {
//!             instance.set("created_at", json!(null));
//!         }
//!     }
//! }
//!
//! impl Plugin for Timestamps {
//!     fn name(&self) -> &'static str {
//!         "timestamps"
//!     }
//!
//!     fn capabilities(&self) -> &'static [&'static str] {
//!         &["created_at"]
//!     }
//!
//!     fn install(&self, model: &mut ModelBuilder<'_>) {
//!         model.add_hook(Arc::new(Timestamps));
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::ResourceConfig;
use crate::error::ConfigError;
use crate::rest::{EventRegistry, Listener, ResourceInstance, Serializer, UnknownChannelError};

/// Extends a model type at construction time.
pub trait Plugin: Send + Sync {
    /// A short identifying name, used in conflict errors and logs.
    fn name(&self) -> &'static str;

    /// Capabilities this plugin provides. Must be unique across the plugins
    /// of one model.
    fn capabilities(&self) -> &'static [&'static str] {
        &[]
    }

    /// Extends the model being built.
    fn install(&self, model: &mut ModelBuilder<'_>);
}

/// Runs for every instance a model builds, directly or by deserialization.
pub trait InstanceHook: Send + Sync {
    /// Called once, right after the instance receives its initial attributes.
    fn on_build(&self, instance: &mut ResourceInstance);
}

/// The model under construction, as seen by a plugin.
pub struct ModelBuilder<'a> {
    config: &'a ResourceConfig,
    events: &'a mut EventRegistry,
    serializer: &'a mut Arc<dyn Serializer>,
    hooks: &'a mut Vec<Arc<dyn InstanceHook>>,
}

impl<'a> ModelBuilder<'a> {
    pub(crate) fn new(
        config: &'a ResourceConfig,
        events: &'a mut EventRegistry,
        serializer: &'a mut Arc<dyn Serializer>,
        hooks: &'a mut Vec<Arc<dyn InstanceHook>>,
    ) -> Self {
        Self {
            config,
            events,
            serializer,
            hooks,
        }
    }

    /// Returns the resolved configuration of the model.
    #[must_use]
    pub const fn config(&self) -> &ResourceConfig {
        self.config
    }

    /// Returns the model's event registry.
    pub fn events(&mut self) -> &mut EventRegistry {
        &mut *self.events
    }

    /// Subscribes a listener to one of the model's channels.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownChannelError`] if `channel` is not a model channel.
    pub fn on(&mut self, channel: &str, listener: Listener) -> Result<&mut Self, UnknownChannelError> {
        self.events.on(channel, listener)?;
        Ok(self)
    }

    /// Installs a hook run for every instance the model builds.
    ///
    /// Hooks run in installation order.
    pub fn add_hook(&mut self, hook: Arc<dyn InstanceHook>) -> &mut Self {
        self.hooks.push(hook);
        self
    }

    /// Returns the serializer currently attached to the model.
    #[must_use]
    pub fn serializer(&self) -> &Arc<dyn Serializer> {
        &*self.serializer
    }

    /// Replaces the serializer attached to the model.
    pub fn set_serializer(&mut self, serializer: Arc<dyn Serializer>) -> &mut Self {
        *self.serializer = serializer;
        self
    }
}

impl fmt::Debug for ModelBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("url", &self.config.url())
            .field("events", &self.events)
            .field("serializer", &self.serializer)
            .field("hooks", &format!("<{} hooks>", self.hooks.len()))
            .finish()
    }
}

/// Checks that no two plugins declare the same capability.
///
/// # Errors
///
/// Returns [`ConfigError::PluginConflict`] naming the first duplicate.
pub(crate) fn check_capabilities(plugins: &[Arc<dyn Plugin>]) -> Result<(), ConfigError> {
    let mut owners: HashMap<&'static str, &'static str> = HashMap::new();
    for plugin in plugins {
        for &capability in plugin.capabilities() {
            if let Some(first) = owners.insert(capability, plugin.name()) {
                return Err(ConfigError::PluginConflict {
                    capability,
                    first,
                    second: plugin.name(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Declares(&'static str, &'static [&'static str]);

    impl Plugin for Declares {
        fn name(&self) -> &'static str {
            self.0
        }

        fn capabilities(&self) -> &'static [&'static str] {
            self.1
        }

        fn install(&self, _model: &mut ModelBuilder<'_>) {}
    }

    #[test]
    fn test_distinct_capabilities_pass() {
        let plugins: Vec<Arc<dyn Plugin>> = vec![
            Arc::new(Declares("a", &["snapshots"])),
            Arc::new(Declares("b", &["audit"])),
            Arc::new(Declares("c", &[])),
        ];
        assert!(check_capabilities(&plugins).is_ok());
    }

    #[test]
    fn test_duplicate_capability_is_rejected() {
        let plugins: Vec<Arc<dyn Plugin>> = vec![
            Arc::new(Declares("a", &["snapshots"])),
            Arc::new(Declares("b", &["audit", "snapshots"])),
        ];
        assert_eq!(
            check_capabilities(&plugins),
            Err(ConfigError::PluginConflict {
                capability: "snapshots",
                first: "a",
                second: "b",
            })
        );
    }

    #[test]
    fn test_default_capabilities_are_empty() {
        struct Bare;
        impl Plugin for Bare {
            fn name(&self) -> &'static str {
                "bare"
            }

            fn install(&self, _model: &mut ModelBuilder<'_>) {}
        }

        assert!(Bare.capabilities().is_empty());
    }
}
