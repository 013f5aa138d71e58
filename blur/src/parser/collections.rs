//! Lists and sets declared with one type argument.

use crate::{engine::Traversal, error::Result, types::AnnotatedType, value::Value};

use super::TypeParser;

/// Redacts every element of a list or set against the single type argument.
///
/// A new container of the same kind is built. Iteration order is kept and
/// elements are not deduplicated, so the size never changes.
#[derive(Clone, Copy, Debug)]
pub struct CollectionParser {
    order: i32,
}

impl CollectionParser {
    pub fn new(order: i32) -> Self {
        Self { order }
    }
}

fn element_type(annotated_type: &AnnotatedType) -> Option<&AnnotatedType> {
    match (annotated_type, annotated_type.arguments()) {
        (AnnotatedType::Parameterized(_), [element]) => Some(element),
        _ => None,
    }
}

impl TypeParser for CollectionParser {
    fn supports(&self, value: &Value, annotated_type: &AnnotatedType) -> bool {
        matches!(value, Value::List(_) | Value::Set(_)) && element_type(annotated_type).is_some()
    }

    fn parse(
        &self,
        value: Value,
        annotated_type: &AnnotatedType,
        traversal: &mut Traversal<'_>,
    ) -> Result<Value> {
        let Some(element) = element_type(annotated_type) else {
            return Ok(value);
        };
        let mut redact_all = |items: Vec<Value>| -> Result<Vec<Value>> {
            items
                .into_iter()
                .map(|item| traversal.redact(item, element))
                .collect()
        };
        match value {
            Value::List(items) => Ok(Value::List(redact_all(items)?)),
            Value::Set(items) => Ok(Value::Set(redact_all(items)?)),
            other => Ok(other),
        }
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn name(&self) -> &str {
        "collection"
    }
}
