//! Wildcard and type-variable positions.
//!
//! Neither shape has a runtime counterpart of its own; the value is redacted
//! against each bound in turn.

use crate::{engine::Traversal, error::Result, types::AnnotatedType, value::Value};

use super::TypeParser;

fn redact_through(
    mut value: Value,
    bounds: &[AnnotatedType],
    traversal: &mut Traversal<'_>,
) -> Result<Value> {
    for bound in bounds {
        value = traversal.redact(value, bound)?;
    }
    Ok(value)
}

/// Redacts against every upper bound, then every lower bound.
#[derive(Clone, Copy, Debug)]
pub struct WildcardParser {
    order: i32,
}

impl WildcardParser {
    pub fn new(order: i32) -> Self {
        Self { order }
    }
}

impl TypeParser for WildcardParser {
    fn supports(&self, _value: &Value, annotated_type: &AnnotatedType) -> bool {
        matches!(annotated_type, AnnotatedType::Wildcard(_))
    }

    fn parse(
        &self,
        value: Value,
        annotated_type: &AnnotatedType,
        traversal: &mut Traversal<'_>,
    ) -> Result<Value> {
        let AnnotatedType::Wildcard(wildcard) = annotated_type else {
            return Ok(value);
        };
        let value = redact_through(value, wildcard.upper_bounds(), traversal)?;
        redact_through(value, wildcard.lower_bounds(), traversal)
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn name(&self) -> &str {
        "wildcard"
    }
}

/// Redacts against every bound in declaration order.
#[derive(Clone, Copy, Debug)]
pub struct TypeVariableParser {
    order: i32,
}

impl TypeVariableParser {
    pub fn new(order: i32) -> Self {
        Self { order }
    }
}

impl TypeParser for TypeVariableParser {
    fn supports(&self, _value: &Value, annotated_type: &AnnotatedType) -> bool {
        matches!(annotated_type, AnnotatedType::TypeVariable(_))
    }

    fn parse(
        &self,
        value: Value,
        annotated_type: &AnnotatedType,
        traversal: &mut Traversal<'_>,
    ) -> Result<Value> {
        let AnnotatedType::TypeVariable(variable) = annotated_type else {
            return Ok(value);
        };
        redact_through(value, variable.bounds(), traversal)
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn name(&self) -> &str {
        "type-variable"
    }
}
