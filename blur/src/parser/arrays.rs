//! Arrays declared as arrays.

use crate::{engine::Traversal, error::Result, types::AnnotatedType, value::Value};

use super::TypeParser;

/// Redacts every slot of an array against the component type. The result
/// is a new array of the same length.
#[derive(Clone, Copy, Debug)]
pub struct ArrayParser {
    order: i32,
}

impl ArrayParser {
    pub fn new(order: i32) -> Self {
        Self { order }
    }
}

impl TypeParser for ArrayParser {
    fn supports(&self, value: &Value, annotated_type: &AnnotatedType) -> bool {
        matches!(value, Value::Array(_)) && matches!(annotated_type, AnnotatedType::Array(_))
    }

    fn parse(
        &self,
        value: Value,
        annotated_type: &AnnotatedType,
        traversal: &mut Traversal<'_>,
    ) -> Result<Value> {
        let Some(component) = annotated_type.component() else {
            return Ok(value);
        };
        let items = match value {
            Value::Array(items) => items,
            other => return Ok(other),
        };
        let redacted = items
            .into_iter()
            .map(|item| traversal.redact(item, component))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(redacted))
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn name(&self) -> &str {
        "array"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Blur, annotation::Email};

    #[test]
    fn requires_array_value_and_array_type() {
        let parser = ArrayParser::new(0);
        let declared = AnnotatedType::array(AnnotatedType::class("String"));
        assert!(parser.supports(&Value::Array(vec![]), &declared));
        assert!(!parser.supports(&Value::List(vec![]), &declared));
        assert!(!parser.supports(&Value::Array(vec![]), &AnnotatedType::class("String")));
    }

    #[test]
    fn nested_arrays_redact_the_innermost_component() {
        let declared = AnnotatedType::array(AnnotatedType::array(
            AnnotatedType::class("String").with::<Email>(),
        ));
        let value = Value::Array(vec![
            Value::Array(vec![Value::from("ab@c.d")]),
            Value::Array(vec![]),
        ]);
        let redacted = Blur::new().redact(value, &declared).unwrap();
        assert_eq!(
            redacted,
            Value::Array(vec![Value::Array(vec![Value::from("a*@c.d")]), Value::Array(vec![])])
        );
    }
}
