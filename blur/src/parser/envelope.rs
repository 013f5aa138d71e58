//! Generic envelopes: user wrappers with one type argument.

use std::{borrow::Cow, sync::Arc};

use crate::{
    engine::Traversal,
    error::Result,
    types::AnnotatedType,
    value::{Object, Value},
};

use super::TypeParser;

/// Redacts the payload field of a user wrapper class such as
/// `ResponseEntity<T>` against the wrapper's single type argument.
///
/// The envelope is rebuilt: the result is a new object of the same class with
/// the redacted payload and every other field copied through unchanged. A
/// class without the payload field passes through unchanged.
#[derive(Clone, Debug)]
pub struct EnvelopeParser {
    class: Cow<'static, str>,
    payload: Cow<'static, str>,
    order: i32,
}

impl EnvelopeParser {
    pub fn new(
        class: impl Into<Cow<'static, str>>,
        payload: impl Into<Cow<'static, str>>,
        order: i32,
    ) -> Self {
        Self {
            class: class.into(),
            payload: payload.into(),
            order,
        }
    }

    /// Name of the wrapper class this parser claims.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Name of the field holding the payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl TypeParser for EnvelopeParser {
    fn supports(&self, value: &Value, annotated_type: &AnnotatedType) -> bool {
        let is_instance = value
            .as_object()
            .is_some_and(|object| object.class().name() == self.class);
        is_instance
            && matches!(annotated_type, AnnotatedType::Parameterized(_))
            && annotated_type.arguments().len() == 1
    }

    fn parse(
        &self,
        value: Value,
        annotated_type: &AnnotatedType,
        traversal: &mut Traversal<'_>,
    ) -> Result<Value> {
        let [payload_type] = annotated_type.arguments() else {
            return Ok(value);
        };
        let Some(object) = value.as_object().cloned() else {
            return Ok(value);
        };
        let (class, mut values) = {
            let envelope = object.lock();
            (Arc::clone(envelope.class()), envelope.values().to_vec())
        };
        let Some(index) = class.index_of(&self.payload) else {
            return Ok(value);
        };
        let payload = std::mem::take(&mut values[index]);
        values[index] = traversal.redact(payload, payload_type)?;
        Ok(Value::Object(Object::from_parts(class, values).into_ref()))
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn name(&self) -> &str {
        &self.class
    }
}
