//! Content resolver: property paths against the data model.
//!
//! A path is a dot separated list of segments. `.` alone is the current scope,
//! a leading dot resolves from the root model and ignores the scope. Each
//! segment first looks for an own value (object key or array index) and then
//! for a computed accessor named `get` + capitalized segment.
//!
//! `null` and "undefined" are not the same thing here: a `null` value is a
//! legal, empty value (lists and maps degrade to empty collections), while a
//! missing key with no accessor is a [`ContentError::Undefined`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ContentError;

/// Resolution contract consumed by the operators.
pub trait ContentResolver {
    /// Root model, used for absolute paths and as the initial scope.
    fn model(&self) -> &Value;

    /// Resolve `path` against `scope` (or the root model when absolute).
    fn get_value(&self, scope: &Value, path: &str) -> Result<Value, ContentError>;

    /// Resolve to an ordered sequence. `null` yields a fresh empty sequence.
    fn get_iterable(&self, scope: &Value, path: &str) -> Result<Vec<Value>, ContentError> {
        match self.get_value(scope, path)? {
            Value::Null => {
                warn!(path = %path, "Null content value. Returns empty iterator.");
                Ok(Vec::new())
            }
            Value::Array(items) => Ok(items),
            other => Err(ContentError::InvalidType {
                path: path.to_string(),
                expected: "array",
                found: type_name(&other),
            }),
        }
    }

    /// Resolve to a string keyed map. `null` yields an empty map.
    fn get_map(&self, scope: &Value, path: &str) -> Result<Map<String, Value>, ContentError> {
        match self.get_value(scope, path)? {
            Value::Null => {
                warn!(path = %path, "Null content value. Returns empty map.");
                Ok(Map::new())
            }
            Value::Object(map) => Ok(map),
            other => Err(ContentError::InvalidType {
                path: path.to_string(),
                expected: "map",
                found: type_name(&other),
            }),
        }
    }

    /// Emptiness test used by the `if`/`ifnot` operators.
    fn is_empty(&self, scope: &Value, path: &str) -> Result<bool, ContentError> {
        let empty = match self.get_value(scope, path)? {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
        };
        Ok(empty)
    }
}

/// Computed accessor invoked with the object being resolved.
pub type Getter = Box<dyn Fn(&Value) -> Value>;

/// Default resolver over a `serde_json::Value` model.
pub struct Content {
    model: Value,
    getters: HashMap<String, Getter>,
}

impl Content {
    pub fn new(model: Value) -> Self {
        Self {
            model,
            getters: HashMap::new(),
        }
    }

    /// Register a computed accessor, e.g. `with_getter("getFullName", ...)` serves segment `fullName`.
    pub fn with_getter<F>(mut self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&Value) -> Value + 'static,
    {
        self.getters.insert(name.into(), Box::new(getter));
        self
    }

    fn absolute_value(&self, path: &str) -> Result<Value, ContentError> {
        self.relative_value(&self.model, &path[1..], path)
    }

    fn relative_value(
        &self,
        context: &Value,
        path: &str,
        full_path: &str,
    ) -> Result<Value, ContentError> {
        if !is_container(context) {
            return Err(ContentError::NotAnObject {
                path: full_path.to_string(),
                found: type_name(context),
            });
        }

        let segments: Vec<&str> = path.split('.').collect();
        // Borrowed while walking model data; owned only past a getter result.
        let mut current = Cow::Borrowed(context);
        for (i, segment) in segments.iter().enumerate() {
            current = match current {
                Cow::Borrowed(object) => self.object_property(object, segment)?,
                Cow::Owned(object) => Cow::Owned(self.object_property(&object, segment)?.into_owned()),
            };
            if i + 1 == segments.len() {
                break;
            }
            if current.is_null() {
                return Ok(Value::Null);
            }
            if !is_container(&current) {
                return Err(ContentError::Undefined {
                    path: full_path.to_string(),
                });
            }
        }
        Ok(current.into_owned())
    }

    fn object_property<'v>(
        &self,
        object: &'v Value,
        property: &str,
    ) -> Result<Cow<'v, Value>, ContentError> {
        let own = match object {
            Value::Object(map) => map.get(property),
            Value::Array(items) => property.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        if let Some(value) = own {
            return Ok(Cow::Borrowed(value));
        }

        if let Some(getter) = self.getters.get(&getter_name(property)) {
            return Ok(Cow::Owned(getter(object)));
        }

        Err(ContentError::Undefined {
            path: property.to_string(),
        })
    }
}

impl ContentResolver for Content {
    fn model(&self) -> &Value {
        &self.model
    }

    fn get_value(&self, scope: &Value, path: &str) -> Result<Value, ContentError> {
        if path == "." {
            return Ok(scope.clone());
        }
        if path.starts_with('.') {
            return self.absolute_value(path);
        }
        self.relative_value(scope, path, path)
    }
}

impl From<Value> for Content {
    fn from(model: Value) -> Self {
        Content::new(model)
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut getters: Vec<&String> = self.getters.keys().collect();
        getters.sort();
        f.debug_struct("Content")
            .field("model", &self.model)
            .field("getters", &getters)
            .finish()
    }
}

fn getter_name(property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => format!("get{}{}", first.to_uppercase(), chars.as_str()),
        None => "get".to_string(),
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// JSON type name used in diagnostics.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content() -> Content {
        Content::new(json!({
            "title": "Catalog",
            "owner": { "name": "Iris", "address": { "city": "Cluj" } },
            "items": [ { "name": "a" }, { "name": "b" } ],
            "tags": null,
            "count": 0,
            "label": "x"
        }))
    }

    #[test]
    fn test_relative_and_self_paths() {
        let c = content();
        let owner = c.get_value(c.model(), "owner").unwrap();
        assert_eq!(c.get_value(&owner, "name").unwrap(), json!("Iris"));
        assert_eq!(c.get_value(&owner, "address.city").unwrap(), json!("Cluj"));
        assert_eq!(c.get_value(&owner, ".").unwrap(), owner);
        assert_eq!(c.get_value(c.model(), "items.1.name").unwrap(), json!("b"));
    }

    #[test]
    fn test_absolute_path_ignores_scope() {
        let c = content();
        let scopes = [
            json!({ "title": "shadowed" }),
            c.get_value(c.model(), "owner").unwrap(),
            json!([1, 2, 3]),
            json!("scalar scope"),
        ];
        for scope in &scopes {
            assert_eq!(
                c.get_value(scope, ".title").unwrap(),
                c.get_value(c.model(), "title").unwrap()
            );
            assert_eq!(
                c.get_value(scope, ".owner.address.city").unwrap(),
                json!("Cluj")
            );
        }
    }

    #[test]
    fn test_undefined_terminal_segment() {
        let c = content();
        let err = c.get_value(c.model(), "owner.phone").unwrap_err();
        assert!(matches!(err, ContentError::Undefined { .. }));
    }

    #[test]
    fn test_intermediate_scalar_is_an_error() {
        let c = content();
        let err = c.get_value(c.model(), "title.length").unwrap_err();
        assert_eq!(
            err,
            ContentError::Undefined {
                path: "title.length".to_string()
            }
        );
    }

    #[test]
    fn test_intermediate_null_short_circuits() {
        let c = content();
        assert_eq!(c.get_value(c.model(), "tags.first").unwrap(), Value::Null);
    }

    #[test]
    fn test_relative_path_on_scalar_scope() {
        let c = content();
        let err = c.get_value(&json!("text"), "name").unwrap_err();
        assert!(matches!(err, ContentError::NotAnObject { found: "string", .. }));
    }

    #[test]
    fn test_getter_fallback() {
        let c = content().with_getter("getFullName", |object| {
            json!(format!("{} of {}", object["name"].as_str().unwrap_or(""), "Cluj"))
        });
        let owner = c.get_value(c.model(), "owner").unwrap();
        assert_eq!(c.get_value(&owner, "fullName").unwrap(), json!("Iris of Cluj"));
        // Own values win over accessors.
        let c = c.with_getter("getName", |_| json!("computed"));
        assert_eq!(c.get_value(&owner, "name").unwrap(), json!("Iris"));
    }

    #[test]
    fn test_path_continues_past_getter_result() {
        let c = content().with_getter("getPrimary", |object| object["items"][0].clone());
        assert_eq!(c.get_value(c.model(), "primary.name").unwrap(), json!("a"));
        assert_eq!(c.get_value(&json!([]), ".primary.name").unwrap(), json!("a"));
    }

    #[test]
    fn test_null_iterable_and_map_degrade_to_empty() {
        let c = content();
        assert!(c.get_iterable(c.model(), "tags").unwrap().is_empty());
        assert!(c.get_map(c.model(), "tags").unwrap().is_empty());
        // Undefined stays an error.
        assert!(c.get_iterable(c.model(), "missing").is_err());
        assert!(c.get_map(c.model(), "missing").is_err());
    }

    #[test]
    fn test_wrong_shape_for_collections() {
        let c = content();
        let err = c.get_iterable(c.model(), "owner").unwrap_err();
        assert_eq!(
            err,
            ContentError::InvalidType {
                path: "owner".to_string(),
                expected: "array",
                found: "object"
            }
        );
        let err = c.get_map(c.model(), "items").unwrap_err();
        assert!(matches!(err, ContentError::InvalidType { expected: "map", .. }));
        assert_eq!(c.get_iterable(c.model(), "items").unwrap().len(), 2);
    }

    #[test]
    fn test_is_empty() {
        let c = content();
        assert!(c.is_empty(c.model(), "tags").unwrap());
        assert!(c.is_empty(c.model(), "count").unwrap());
        assert!(!c.is_empty(c.model(), "items").unwrap());
        assert!(!c.is_empty(c.model(), "label").unwrap());
        assert!(c.is_empty(&json!({ "list": [] }), "list").unwrap());
        assert!(c.is_empty(c.model(), "missing").is_err());
    }
}
