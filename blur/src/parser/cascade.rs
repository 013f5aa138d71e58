//! Objects under the cascade marker.

use crate::{
    engine::Traversal,
    error::Result,
    types::AnnotatedType,
    value::{FieldKind, Value},
};

use super::TypeParser;

/// Walks the declared instance fields of an object and redacts each one
/// against the field's own annotated type.
///
/// Fields whose annotated type needs no redaction are skipped, as are static
/// and synthetic fields. The object is mutated in place, so every handle to it
/// observes the result. An object already visited during the current
/// traversal is returned untouched, which makes cyclic graphs terminate.
#[derive(Clone, Copy, Debug)]
pub struct CascadeParser {
    order: i32,
}

impl CascadeParser {
    pub fn new(order: i32) -> Self {
        Self { order }
    }
}

impl TypeParser for CascadeParser {
    fn supports(&self, value: &Value, annotated_type: &AnnotatedType) -> bool {
        matches!(value, Value::Object(_)) && annotated_type.has_cascade()
    }

    fn parse(
        &self,
        value: Value,
        _annotated_type: &AnnotatedType,
        traversal: &mut Traversal<'_>,
    ) -> Result<Value> {
        let Some(object) = value.as_object().cloned() else {
            return Ok(value);
        };
        let class = object.class();
        if !traversal.enter(&object) {
            tracing::trace!(class = class.name(), "object already visited");
            return Ok(value);
        }

        for (index, field) in class.fields().iter().enumerate() {
            if field.kind() != FieldKind::Instance || !field.annotated_type().requires_redaction() {
                continue;
            }
            // The lock is not held while recursing: the field may lead back here.
            let current = object.lock().value_at(index).clone();
            let redacted = traversal.redact(current, field.annotated_type())?;
            object.lock().set_at(index, redacted);
        }
        Ok(value)
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn name(&self) -> &str {
        "cascade"
    }
}
