//! Dynamic values that cross an intercepted boundary.
//!
//! This module provides:
//!
//! - [`Value`]: the closed set of runtime shapes the traversal understands
//! - [`ObjectRef`]: a shared handle to a user object, compared by identity
//! - [`Class`] and [`Field`]: the declared layout of a user object, including
//!   each field's annotated type
//! - the typed façade (`convert`): [`IntoValue`], [`FromValue`] and [`Describe`]
//!   for std types and `#[derive(Reflect)]` structs

mod convert;
mod object;

pub use convert::{Describe, FromValue, IntoValue, Reflect};
pub use object::{Class, ClassBuilder, Field, FieldKind, Object, ObjectRef};

// =============================================================================
// Value
// =============================================================================

/// A runtime value flowing through a method boundary.
///
/// Containers own their elements. Objects are shared: cloning a
/// [`Value::Object`] clones the handle, not the object.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// An absent value. Never dereferenced, always returned unchanged.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Set in iteration order. Elements are not re-deduplicated after
    /// redaction, so the size of a set never changes.
    Set(Vec<Value>),
    /// Mapping in insertion order.
    Map(Vec<(Value, Value)>),
    /// Fixed-length array.
    Array(Vec<Value>),
    /// Instance of a user class.
    Object(ObjectRef),
}

impl Value {
    /// Short name of the value's shape, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Elements of a list, set or array.
    pub fn as_elements(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Set(items) | Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_entries(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Number of elements or entries, for container shapes only.
    pub fn size(&self) -> Option<usize> {
        self.as_elements()
            .map(<[Value]>::len)
            .or_else(|| self.as_entries().map(<[(Value, Value)]>::len))
    }

    /// Looks up the entry whose key is the string `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_entries()?
            .iter()
            .find(|(candidate, _)| candidate.as_str() == Some(key))
            .map(|(_, value)| value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::Value;

    #[test]
    fn kind_names_each_shape() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::from("a").kind(), "string");
        assert_eq!(Value::List(vec![]).kind(), "list");
        assert_eq!(Value::Map(vec![]).kind(), "map");
    }

    #[test]
    fn size_is_defined_for_containers_only() {
        assert_eq!(Value::Set(vec![Value::Int(1)]).size(), Some(1));
        assert_eq!(Value::Map(vec![(Value::Null, Value::Null)]).size(), Some(1));
        assert_eq!(Value::Str("abc".into()).size(), None);
    }

    #[test]
    fn elements_cover_lists_sets_and_arrays() {
        let items = vec![Value::from("a"), Value::Int(1)];
        for value in [
            Value::List(items.clone()),
            Value::Set(items.clone()),
            Value::Array(items.clone()),
        ] {
            assert_eq!(value.as_elements(), Some(items.as_slice()));
        }
        assert_eq!(Value::Map(vec![]).as_elements(), None);
    }

    #[test]
    fn get_finds_string_keyed_entries() {
        let map = Value::Map(vec![
            (Value::from("code"), Value::from("200")),
            (Value::Int(1), Value::from("one")),
        ]);
        assert_eq!(map.get("code"), Some(&Value::from("200")));
        assert_eq!(map.get("1"), None);
    }

    #[test]
    fn none_converts_to_null() {
        let value: Value = Option::<&str>::None.into();
        assert!(value.is_null());
    }
}
