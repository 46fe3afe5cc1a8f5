//! Turning decoded response bodies into model instances.
//!
//! A [`Serializer`] is invoked with the model type the response belongs to,
//! so the instances it builds go through that model's own constructor
//! ([`Model::build`]) and pick up its configuration, registry and plugin
//! hooks.
//!
//! Two implementations ship with the crate:
//!
//! - [`JsonSerializer`]: the default; the body *is* the resource or the list
//! - [`EnvelopeSerializer`]: the body wraps the resource under a root key,
//!   e.g. `{"thing": {...}}` or `{"things": [...]}`

use std::fmt;

use serde_json::Value;

use crate::rest::errors::json_kind;
use crate::rest::{Model, ResourceError, ResourceInstance};

/// The result of deserializing one response body.
#[derive(Debug, Clone)]
pub enum Deserialized {
    /// The body was an object.
    One(ResourceInstance),
    /// The body was an array; order is preserved.
    Many(Vec<ResourceInstance>),
}

impl Deserialized {
    /// Returns the single instance.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnexpectedPayload`] for a list.
    pub fn into_one(self) -> Result<ResourceInstance, ResourceError> {
        match self {
            Self::One(instance) => Ok(instance),
            Self::Many(_) => Err(ResourceError::UnexpectedPayload {
                expected: "an object",
                found: "an array",
            }),
        }
    }

    /// Returns the list of instances.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnexpectedPayload`] for a single instance.
    pub fn into_many(self) -> Result<Vec<ResourceInstance>, ResourceError> {
        match self {
            Self::Many(instances) => Ok(instances),
            Self::One(_) => Err(ResourceError::UnexpectedPayload {
                expected: "an array",
                found: "an object",
            }),
        }
    }
}

/// Converts a decoded JSON value into one or more instances of `model`.
///
/// Implementations must not mutate `value`.
pub trait Serializer: fmt::Debug + Send + Sync {
    /// Deserializes `value` into instances of `model`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnexpectedPayload`] when `value` has a shape
    /// the serializer cannot turn into instances.
    fn deserialize(&self, model: &Model, value: &Value) -> Result<Deserialized, ResourceError>;
}

/// Default serializer: arrays become lists, objects become one instance.
///
/// Arrays are deserialized element by element, recursively, preserving
/// order. Nested arrays are flattened into the outer list, so
/// `[[{"id": 1}], [{"id": 2}]]` yields two instances. Any element that is
/// neither an object nor an array fails the whole body.
///
/// # Example
///
/// ```rust
/// use rest_model::{create, ResourceOptions};
/// use rest_model::rest::{Deserialized, JsonSerializer, Serializer};
/// use serde_json::json;
///
/// let model = create(ResourceOptions::new().url("/things")).unwrap();
///
/// let many = JsonSerializer
///     .deserialize(&model, &json!([{"id": 1}, {"id": 2}]))
///     .unwrap()
///     .into_many()
///     .unwrap();
/// assert_eq!(many[0].identity(), Some(&json!(1)));
/// assert_eq!(many[1].identity(), Some(&json!(2)));
///
/// let one = JsonSerializer.deserialize(&model, &json!({"id": 1})).unwrap();
/// assert!(matches!(one, Deserialized::One(_)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn deserialize(&self, model: &Model, value: &Value) -> Result<Deserialized, ResourceError> {
        match value {
            Value::Array(items) => {
                let mut instances = Vec::with_capacity(items.len());
                for item in items {
                    match self.deserialize(model, item)? {
                        Deserialized::One(instance) => instances.push(instance),
                        Deserialized::Many(nested) => instances.extend(nested),
                    }
                }
                Ok(Deserialized::Many(instances))
            }
            Value::Object(attrs) => Ok(Deserialized::One(model.build(attrs.clone()))),
            other => Err(ResourceError::UnexpectedPayload {
                expected: "an object or an array",
                found: json_kind(other),
            }),
        }
    }
}

/// Serializer for APIs that wrap payloads under a root key.
///
/// Single resources are read from `singular`, collections from `plural`.
/// A body counts as an envelope only when it is an object whose one and
/// only key is `singular` or `plural` and whose value is an object or an
/// array. Anything else, such as a bare resource that happens to have an
/// attribute named like the root key, is deserialized as-is.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use rest_model::{create, ResourceOptions};
/// use rest_model::rest::{EnvelopeSerializer, Serializer};
/// use serde_json::json;
///
/// let model = create(
///     ResourceOptions::new()
///         .url("/products")
///         .serializer(Arc::new(EnvelopeSerializer::new("product", "products"))),
/// )
/// .unwrap();
///
/// let products = model
///     .serializer()
///     .deserialize(&model, &json!({"products": [{"id": 1}]}))
///     .unwrap()
///     .into_many()
///     .unwrap();
/// assert_eq!(products.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeSerializer {
    singular: String,
    plural: String,
}

impl EnvelopeSerializer {
    /// Creates a serializer reading `singular` for objects and `plural` for lists.
    #[must_use]
    pub fn new(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
        }
    }

    /// Returns the root key for single resources.
    #[must_use]
    pub fn singular(&self) -> &str {
        &self.singular
    }

    /// Returns the root key for collections.
    #[must_use]
    pub fn plural(&self) -> &str {
        &self.plural
    }
}

impl Serializer for EnvelopeSerializer {
    fn deserialize(&self, model: &Model, value: &Value) -> Result<Deserialized, ResourceError> {
        let inner = match value {
            Value::Object(map) if map.len() == 1 => map
                .get(&self.plural)
                .or_else(|| map.get(&self.singular))
                .filter(|inner| inner.is_object() || inner.is_array())
                .unwrap_or(value),
            _ => value,
        };
        JsonSerializer.deserialize(model, inner)
    }
}
