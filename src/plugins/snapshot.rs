//! Snapshot history for dirty tracking and rollback.
//!
//! [`SnapshotPlugin`] gives every instance of a model an attribute history.
//! Instances record the current attributes with [`SnapshotExt::snapshot`]
//! and can later compare against, or return to, the latest entry.
//!
//! A successful `save` clears the history, so a saved instance is never
//! dirty.
//!
//! # Example
//!
//! ```rust
//! use rest_model::{create, ResourceOptions};
//! use rest_model::plugins::SnapshotExt;
//! use serde_json::json;
//!
//! let things = create(ResourceOptions::new().url("/things")).unwrap();
//! let mut thing = things.build(json!({"id": 1, "name": "a"}).as_object().cloned().unwrap());
//!
//! thing.snapshot().unwrap();
//! thing.set("name", json!("b"));
//! assert!(thing.is_dirty().unwrap());
//! assert_eq!(thing.changed_fields().unwrap(), json!({"name": "b"}));
//!
//! thing.rollback().unwrap();
//! assert_eq!(thing.get("name"), Some(&json!("a")));
//! assert!(!thing.is_dirty().unwrap());
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::rest::{Attributes, InstanceHook, ModelBuilder, Plugin, ResourceError, ResourceInstance};

/// Capability provided by [`SnapshotPlugin`].
pub const SNAPSHOTS: &str = "snapshots";

/// Enables snapshot history on every instance of a model.
///
/// Installed by default; pass an explicit plugin list to opt out.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotPlugin;

impl Plugin for SnapshotPlugin {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &[SNAPSHOTS]
    }

    fn install(&self, model: &mut ModelBuilder<'_>) {
        model.add_hook(Arc::new(Self));
    }
}

impl InstanceHook for SnapshotPlugin {
    fn on_build(&self, instance: &mut ResourceInstance) {
        instance.enable_snapshots();
    }
}

/// Snapshot operations on instances of models built with [`SnapshotPlugin`].
///
/// Every method fails with [`ResourceError::MissingCapability`] when the
/// instance's model was built without the plugin.
pub trait SnapshotExt {
    /// Records a copy of the current attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingCapability`] without the plugin.
    fn snapshot(&mut self) -> Result<&mut Self, ResourceError>;

    /// Restores and discards the latest snapshot.
    ///
    /// All attributes are replaced, so keys added since the snapshot are
    /// removed. Returns `false` when there was nothing to restore.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingCapability`] without the plugin.
    fn rollback(&mut self) -> Result<bool, ResourceError>;

    /// Returns `true` if the attributes differ from the latest snapshot.
    ///
    /// An instance with no snapshots is clean.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingCapability`] without the plugin.
    fn is_dirty(&self) -> Result<bool, ResourceError>;

    /// Returns the attributes that changed or were added since the latest
    /// snapshot, diffing nested objects recursively.
    ///
    /// Removed keys are not reported. With no snapshots the result is an
    /// empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingCapability`] without the plugin.
    fn changed_fields(&self) -> Result<Value, ResourceError>;

    /// Number of recorded snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingCapability`] without the plugin.
    fn snapshot_count(&self) -> Result<usize, ResourceError>;
}

const fn missing() -> ResourceError {
    ResourceError::MissingCapability {
        capability: SNAPSHOTS,
    }
}

impl SnapshotExt for ResourceInstance {
    fn snapshot(&mut self) -> Result<&mut Self, ResourceError> {
        let current = self.attrs();
        self.snapshots_mut().ok_or_else(missing)?.push(current);
        Ok(self)
    }

    fn rollback(&mut self) -> Result<bool, ResourceError> {
        let latest = self.snapshots_mut().ok_or_else(missing)?.pop();
        let restored = latest.is_some();
        if let Some(previous) = latest {
            self.replace_attrs(previous);
        }
        Ok(restored)
    }

    fn is_dirty(&self) -> Result<bool, ResourceError> {
        let snapshots = self.snapshots().ok_or_else(missing)?;
        Ok(snapshots
            .last()
            .is_some_and(|latest| latest != self.attributes()))
    }

    fn changed_fields(&self) -> Result<Value, ResourceError> {
        let snapshots = self.snapshots().ok_or_else(missing)?;
        Ok(snapshots.last().map_or_else(
            || Value::Object(Attributes::new()),
            |latest| diff_attributes(latest, self.attributes()),
        ))
    }

    fn snapshot_count(&self) -> Result<usize, ResourceError> {
        Ok(self.snapshots().ok_or_else(missing)?.len())
    }
}

/// Returns the entries of `current` that are new or differ from `original`.
///
/// Nested objects are diffed recursively and only included when something
/// inside them changed.
fn diff_attributes(original: &Attributes, current: &Attributes) -> Value {
    let mut diff = Attributes::new();

    for (key, value) in current {
        match (original.get(key), value) {
            (Some(before), _) if before == value => {}
            (Some(Value::Object(before)), Value::Object(after)) => {
                let nested = diff_attributes(before, after);
                if nested.as_object().is_some_and(|m| !m.is_empty()) {
                    diff.insert(key.clone(), nested);
                }
            }
            _ => {
                diff.insert(key.clone(), value.clone());
            }
        }
    }

    Value::Object(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceOptions;
    use crate::rest::{create, Model};
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    fn with_snapshots() -> Model {
        create(ResourceOptions::new().url("/things")).unwrap()
    }

    #[test]
    fn test_plugin_enables_history_on_build() {
        let model = with_snapshots();
        let instance = model.build_empty();
        assert_eq!(instance.snapshot_count().unwrap(), 0);
    }

    #[test]
    fn test_without_plugin_operations_fail() {
        let model = create(ResourceOptions::new().url("/things").no_plugins()).unwrap();
        let mut instance = model.build_empty();

        assert!(matches!(
            instance.snapshot(),
            Err(ResourceError::MissingCapability { capability: "snapshots" })
        ));
        assert!(instance.is_dirty().is_err());
        assert!(instance.changed_fields().is_err());
        assert!(instance.rollback().is_err());
        assert!(instance.snapshot_count().is_err());
    }

    #[test]
    fn test_no_snapshots_means_clean() {
        let model = with_snapshots();
        let mut instance = model.build(attrs(json!({"name": "a"})));
        instance.set("name", json!("b"));

        assert!(!instance.is_dirty().unwrap());
        assert_eq!(instance.changed_fields().unwrap(), json!({}));
        assert!(!instance.rollback().unwrap());
    }

    #[test]
    fn test_rollback_restores_latest_and_pops() {
        let model = with_snapshots();
        let mut instance = model.build(attrs(json!({"name": "a"})));

        instance.snapshot().unwrap();
        instance.set("name", json!("b"));
        instance.snapshot().unwrap();
        instance.set("name", json!("c")).set("extra", json!(true));

        assert!(instance.rollback().unwrap());
        assert_eq!(instance.to_json(), json!({"name": "b"}));
        assert_eq!(instance.snapshot_count().unwrap(), 1);

        assert!(instance.rollback().unwrap());
        assert_eq!(instance.to_json(), json!({"name": "a"}));
        assert_eq!(instance.snapshot_count().unwrap(), 0);
    }

    #[test]
    fn test_changed_fields_recurses_into_objects() {
        let model = with_snapshots();
        let mut instance = model.build(attrs(json!({
            "id": 1,
            "address": {"city": "Paris", "zip": "75001"},
            "tags": ["a"]
        })));

        instance.snapshot().unwrap();
        instance
            .set("address", json!({"city": "Lyon", "zip": "75001"}))
            .set("tags", json!(["a", "b"]))
            .set("note", json!("new"));

        assert_eq!(
            instance.changed_fields().unwrap(),
            json!({
                "address": {"city": "Lyon"},
                "tags": ["a", "b"],
                "note": "new"
            })
        );
    }

    #[test]
    fn test_removed_keys_are_not_reported() {
        let original = attrs(json!({"a": 1, "b": 2}));
        let current = attrs(json!({"a": 1}));
        assert_eq!(diff_attributes(&original, &current), json!({}));
    }

    #[test]
    fn test_object_replacing_scalar_is_reported_whole() {
        let original = attrs(json!({"a": 1}));
        let current = attrs(json!({"a": {"b": 2}}));
        assert_eq!(diff_attributes(&original, &current), json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_cloned_instance_keeps_independent_history() {
        let model = with_snapshots();
        let mut first = model.build(attrs(json!({"name": "a"})));
        first.snapshot().unwrap();

        let mut second = first.clone();
        second.snapshot().unwrap();

        assert_eq!(first.snapshot_count().unwrap(), 1);
        assert_eq!(second.snapshot_count().unwrap(), 2);
    }
}
