//! Model factory.
//!
//! [`ResourceFactory`] turns configuration into [`Model`]s. A factory holds
//! one override layer that sits between the built-in defaults and the
//! options passed to each [`create`](ResourceFactory::create) call, so an
//! application can set its API prefix or transport once:
//!
//! ```rust
//! use rest_model::{ResourceFactory, ResourceOptions};
//!
//! let mut factory = ResourceFactory::new();
//! factory.configure(ResourceOptions::new().prefix("/api/v1").suffix(".json"));
//!
//! let things = factory.create(ResourceOptions::new().url("/things")).unwrap();
//! assert_eq!(things.url(), "/api/v1/things");
//! assert_eq!(things.config().suffix(), ".json");
//! ```
//!
//! The free function [`create`] uses a factory with no overrides.

use std::sync::Arc;

use crate::config::ResourceOptions;
use crate::error::ConfigError;
use crate::rest::plugin::check_capabilities;
use crate::rest::{EventRegistry, JsonSerializer, Model, ModelBuilder, Serializer};

/// Builds model types from layered configuration.
///
/// Factories are independent of each other; overrides configured on one
/// never affect another.
#[derive(Clone, Debug, Default)]
pub struct ResourceFactory {
    overrides: ResourceOptions,
}

impl ResourceFactory {
    /// Creates a factory with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory with the given override layer.
    #[must_use]
    pub const fn with_overrides(overrides: ResourceOptions) -> Self {
        Self { overrides }
    }

    /// Merges `options` into the override layer, field by field.
    ///
    /// Affects models created afterwards only.
    pub fn configure(&mut self, options: ResourceOptions) -> &mut Self {
        let current = std::mem::take(&mut self.overrides);
        self.overrides = current.merge(options);
        self
    }

    /// Returns the override layer.
    #[must_use]
    pub const fn overrides(&self) -> &ResourceOptions {
        &self.overrides
    }

    /// Creates a model type.
    ///
    /// Options are merged over the factory's overrides, which are merged
    /// over the built-in defaults. The model gets a fresh event registry
    /// with the four lifecycle channels, then the configured handlers are
    /// imported, the serializer is chosen and each plugin is installed in
    /// list order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingUrl`] if no layer sets a URL,
    /// [`ConfigError::InvalidUpdateMethod`] if the update method cannot carry
    /// a body, [`ConfigError::UnknownChannel`] if handlers name an unknown
    /// channel, or [`ConfigError::PluginConflict`] if two plugins declare the
    /// same capability.
    pub fn create(&self, options: ResourceOptions) -> Result<Model, ConfigError> {
        let config = self.overrides.clone().merge(options).resolve()?;
        check_capabilities(config.plugins())?;

        let mut events = EventRegistry::for_model();
        events
            .import(config.handlers())
            .map_err(|e| ConfigError::UnknownChannel { channel: e.channel })?;

        let mut serializer: Arc<dyn Serializer> = match config.serializer() {
            Some(serializer) => serializer.clone(),
            None => Arc::new(JsonSerializer),
        };

        let config = Arc::new(config);
        let mut hooks = Vec::new();
        for plugin in config.plugins() {
            tracing::debug!("Installing plugin '{}' on {}", plugin.name(), config.url());
            let mut builder = ModelBuilder::new(&config, &mut events, &mut serializer, &mut hooks);
            plugin.install(&mut builder);
        }

        tracing::debug!(
            "Created model for {} with {} plugin(s)",
            config.url(),
            config.plugins().len()
        );
        Ok(Model::from_parts(config, events, serializer, hooks))
    }
}

/// Creates a model type with no factory overrides.
///
/// # Errors
///
/// See [`ResourceFactory::create`].
///
/// # Example
///
/// ```rust
/// use rest_model::{create, ResourceOptions};
///
/// let things = create(ResourceOptions::new().url("/things")).unwrap();
/// assert_eq!(things.url(), "/things");
/// ```
pub fn create(options: ResourceOptions) -> Result<Model, ConfigError> {
    ResourceFactory::new().create(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpMethod;
    use crate::rest::{listener, InstanceHook, Plugin, ResourceInstance};
    use serde_json::json;

    #[derive(Debug)]
    struct Stamp(&'static str);

    impl InstanceHook for Stamp {
        fn on_build(&self, instance: &mut ResourceInstance) {
            let mut order = instance
                .get("order")
                .and_then(|v| v.as_array().cloned())
                .unwrap_or_default();
            order.push(json!(self.0));
            instance.set("order", json!(order));
        }
    }

    impl Plugin for Stamp {
        fn name(&self) -> &'static str {
            self.0
        }

        fn install(&self, model: &mut ModelBuilder<'_>) {
            model.add_hook(Arc::new(Stamp(self.0)));
        }
    }

    #[test]
    fn test_create_without_url_fails() {
        let result = create(ResourceOptions::new());
        assert!(matches!(result, Err(ConfigError::MissingUrl)));
    }

    #[test]
    fn test_overrides_apply_under_call_options() {
        let mut factory = ResourceFactory::new();
        factory
            .configure(ResourceOptions::new().prefix("/api").id_attribute("uuid"))
            .configure(ResourceOptions::new().update_method(HttpMethod::Put));

        let model = factory
            .create(ResourceOptions::new().url("/things").id_attribute("key"))
            .unwrap();

        assert_eq!(model.url(), "/api/things");
        assert_eq!(model.config().id_attribute(), "key");
        assert_eq!(model.config().update_method(), HttpMethod::Put);
    }

    #[test]
    fn test_factories_do_not_share_overrides() {
        let mut configured = ResourceFactory::new();
        configured.configure(ResourceOptions::new().prefix("/api"));
        let plain = ResourceFactory::new();

        let options = ResourceOptions::new().url("/things");
        assert_eq!(configured.create(options.clone()).unwrap().url(), "/api/things");
        assert_eq!(plain.create(options).unwrap().url(), "/things");
    }

    #[test]
    fn test_handlers_are_imported() {
        let model = create(
            ResourceOptions::new()
                .url("/things")
                .on("save", listener(|_| Ok(())))
                .handlers("query", vec![listener(|_| Ok(())), listener(|_| Ok(()))]),
        )
        .unwrap();

        assert_eq!(model.listener_count("save"), 1);
        assert_eq!(model.listener_count("query"), 2);
        assert_eq!(model.listener_count("get"), 0);
    }

    #[test]
    fn test_unknown_handler_channel_fails() {
        let result = create(
            ResourceOptions::new()
                .url("/things")
                .on("update", listener(|_| Ok(()))),
        );
        assert_eq!(
            result.unwrap_err(),
            ConfigError::UnknownChannel {
                channel: "update".to_string()
            }
        );
    }

    #[test]
    fn test_plugins_install_in_list_order() {
        let model = create(
            ResourceOptions::new()
                .url("/things")
                .plugin(Arc::new(Stamp("first")))
                .plugin(Arc::new(Stamp("second"))),
        )
        .unwrap();

        let instance = model.build_empty();
        assert_eq!(instance.get("order"), Some(&json!(["first", "second"])));
    }

    #[test]
    fn test_default_plugin_enables_snapshots() {
        let model = create(ResourceOptions::new().url("/things")).unwrap();
        assert!(model.build_empty().snapshots().is_some());

        let bare = create(ResourceOptions::new().url("/things").no_plugins()).unwrap();
        assert!(bare.build_empty().snapshots().is_none());
    }

    #[test]
    fn test_conflicting_plugins_fail() {
        use crate::plugins::SnapshotPlugin;

        let result = create(
            ResourceOptions::new()
                .url("/things")
                .plugin(Arc::new(SnapshotPlugin))
                .plugin(Arc::new(SnapshotPlugin)),
        );
        assert!(matches!(
            result,
            Err(ConfigError::PluginConflict {
                capability: "snapshots",
                ..
            })
        ));
    }
}
