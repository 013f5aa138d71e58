//! Maps declared with two type arguments.

use crate::{engine::Traversal, error::Result, types::AnnotatedType, value::Value};

use super::TypeParser;

/// Redacts every key against the first type argument and every value
/// against the second.
///
/// Entries keep their insertion order. Keys are redacted too, so two keys may
/// become equal; both entries are kept.
#[derive(Clone, Copy, Debug)]
pub struct MapParser {
    order: i32,
}

impl MapParser {
    pub fn new(order: i32) -> Self {
        Self { order }
    }
}

fn entry_types(annotated_type: &AnnotatedType) -> Option<(&AnnotatedType, &AnnotatedType)> {
    match (annotated_type, annotated_type.arguments()) {
        (AnnotatedType::Parameterized(_), [key, value]) => Some((key, value)),
        _ => None,
    }
}

impl TypeParser for MapParser {
    fn supports(&self, value: &Value, annotated_type: &AnnotatedType) -> bool {
        matches!(value, Value::Map(_)) && entry_types(annotated_type).is_some()
    }

    fn parse(
        &self,
        value: Value,
        annotated_type: &AnnotatedType,
        traversal: &mut Traversal<'_>,
    ) -> Result<Value> {
        let Some((key_type, value_type)) = entry_types(annotated_type) else {
            return Ok(value);
        };
        let entries = match value {
            Value::Map(entries) => entries,
            other => return Ok(other),
        };
        let mut redacted = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            let key = traversal.redact(key, key_type)?;
            let entry = traversal.redact(entry, value_type)?;
            redacted.push((key, entry));
        }
        Ok(Value::Map(redacted))
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn name(&self) -> &str {
        "map"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Blur,
        annotation::{Name, PhoneNumber},
    };

    #[test]
    fn supports_two_argument_maps_only() {
        let parser = MapParser::new(0);
        let declared = AnnotatedType::parameterized(
            "HashMap",
            vec![AnnotatedType::class("String"), AnnotatedType::class("String")],
        );
        assert!(parser.supports(&Value::Map(vec![]), &declared));
        assert!(!parser.supports(&Value::List(vec![]), &declared));
        let single = AnnotatedType::parameterized("Vec", vec![AnnotatedType::class("String")]);
        assert!(!parser.supports(&Value::Map(vec![]), &single));
    }

    #[test]
    fn redacts_keys_and_values_in_order() {
        let declared = AnnotatedType::parameterized(
            "HashMap",
            vec![
                AnnotatedType::class("String").with::<Name>(),
                AnnotatedType::class("String").with::<PhoneNumber>(),
            ],
        );
        let map = Value::Map(vec![
            (Value::from("allurx"), Value::from("12345678910")),
            (Value::from("bob"), Value::Null),
        ]);
        let redacted = Blur::new().redact(map, &declared).unwrap();
        assert_eq!(
            redacted,
            Value::Map(vec![
                (Value::from("a*****"), Value::from("123****8910")),
                (Value::from("b**"), Value::Null),
            ])
        );
    }
}
