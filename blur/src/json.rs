//! JSON support for [`Value`].
//!
//! `Value` serializes with serde: containers become JSON arrays and maps,
//! objects become maps of their instance fields. An object reached again
//! while it is already being serialized (a cycle) is written as `null`.
//!
//! [`RedactedJson`] is the redacted form of a value, ready for structured
//! logging.

use std::fmt;

use serde::{
    Serialize, Serializer,
    ser::{SerializeMap, SerializeSeq},
};
use serde_json::Value as JsonValue;

use crate::{
    engine::Blur,
    error::Result,
    types::AnnotatedType,
    value::{FieldKind, Value},
};

fn serialize_elements<S: Serializer>(items: &[Value], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(items.len()))?;
    for item in items {
        seq.serialize_element(item)?;
    }
    seq.end()
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::Str(value) => serializer.serialize_str(value),
            Value::List(items) | Value::Set(items) | Value::Array(items) => {
                serialize_elements(items, serializer)
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Object(object) => match object.try_lock() {
                Some(guard) => {
                    let mut map = serializer.serialize_map(None)?;
                    let fields = guard.class().fields().iter().zip(guard.values());
                    for (field, value) in fields {
                        if field.kind() == FieldKind::Instance {
                            map.serialize_entry(field.name(), value)?;
                        }
                    }
                    map.end()
                }
                None => serializer.serialize_unit(),
            },
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(value) => Value::Bool(value),
            JsonValue::Number(number) => match number.as_i64() {
                Some(value) => Value::Int(value),
                None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(value) => Value::Str(value),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (Value::Str(key), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Value {
    /// Converts into a `serde_json::Value`. Fails when a map key is not a
    /// string, integer or boolean.
    pub fn to_json(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::to_value(self)
    }
}

// =============================================================================
// RedactedJson
// =============================================================================

/// A redacted value rendered as JSON.
///
/// Conversion never fails: a value that cannot be represented as JSON is
/// stored as a JSON string describing the failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedactedJson(JsonValue);

impl RedactedJson {
    pub fn new(value: JsonValue) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_inner(self) -> JsonValue {
        self.0
    }

    fn from_redacted(value: &Value) -> Self {
        Self(value.to_json().unwrap_or_else(|err| {
            JsonValue::String(format!("Failed to serialize redacted value: {err}"))
        }))
    }
}

impl fmt::Display for RedactedJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for RedactedJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl Blur {
    /// Redacts `value` and renders the result as JSON for logging.
    ///
    /// ```rust
    /// use blur::{AnnotatedType, Blur, Name, Value};
    ///
    /// let blur = Blur::new();
    /// let declared = AnnotatedType::class("String").with::<Name>();
    /// let json = blur.redact_json(Value::from("allurx"), &declared).unwrap();
    /// assert_eq!(json.to_string(), "\"a*****\"");
    /// ```
    pub fn redact_json(
        &self,
        value: Value,
        annotated_type: &AnnotatedType,
    ) -> Result<RedactedJson> {
        let redacted = self.redact(value, annotated_type)?;
        Ok(RedactedJson::from_redacted(&redacted))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::value::{Class, Object};

    #[test]
    fn objects_serialize_instance_fields_only() {
        let class = Class::builder("Person")
            .field("email", AnnotatedType::class("String"))
            .static_field("count", AnnotatedType::class("i64"))
            .build();
        let person = Object::new(class).with("email", "a@b.c").with("count", 3i64);
        let value = Value::Object(person.into_ref());
        assert_eq!(value.to_json().unwrap(), json!({ "email": "a@b.c" }));
    }

    #[test]
    fn cycles_serialize_as_null() {
        let class = Class::builder("Node")
            .field("next", AnnotatedType::class("Node"))
            .build();
        let node = Object::new(class).into_ref();
        node.set("next", node.clone());
        assert_eq!(Value::Object(node).to_json().unwrap(), json!({ "next": null }));
    }

    #[test]
    fn json_converts_into_value() {
        let value = Value::from(json!({ "code": 200, "tags": ["a"], "ok": true, "ratio": 0.5 }));
        assert_eq!(value.get("code"), Some(&Value::Int(200)));
        assert_eq!(value.get("tags"), Some(&Value::List(vec![Value::from("a")])));
        assert_eq!(value.get("ratio"), Some(&Value::Float(0.5)));
    }

    #[test]
    fn unrepresentable_keys_become_a_message() {
        let value = Value::Map(vec![(Value::List(vec![]), Value::Null)]);
        let json = RedactedJson::from_redacted(&value);
        assert!(json.value().as_str().is_some_and(|text| text.starts_with("Failed to serialize")));
    }
}
