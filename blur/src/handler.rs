//! Annotation handlers: the functions that rewrite values under a redaction
//! annotation.
//!
//! A redaction annotation kind names its handler through the [`Parse`] marker.
//! [`AnnotationHandlers`] maps those names to handlers and caches the lookup
//! per annotation kind on first use.

use std::{collections::HashMap, fmt, sync::Arc};

use dashmap::DashMap;

use crate::{
    annotation::{Annotation, AnnotationKind, Parse, builtin_policies},
    error::{BoxError, Error, Result},
    policy::TextRedactionPolicy,
    value::Value,
};

// =============================================================================
// AnnotationHandler
// =============================================================================

/// Rewrites a value declared under a redaction annotation.
///
/// Closures with the matching signature are handlers:
///
/// ```rust
/// use blur::{Annotation, AnnotationHandler, BoxError, Value};
///
/// let upper = |value: Value, _: &Annotation| -> Result<Value, BoxError> {
///     Ok(match value {
///         Value::Str(text) => Value::Str(text.to_uppercase()),
///         other => other,
///     })
/// };
/// # let _: &dyn AnnotationHandler = &upper;
/// ```
pub trait AnnotationHandler: Send + Sync {
    fn handle(&self, value: Value, annotation: &Annotation) -> Result<Value, BoxError>;
}

impl<F> AnnotationHandler for F
where
    F: Fn(Value, &Annotation) -> Result<Value, BoxError> + Send + Sync,
{
    fn handle(&self, value: Value, annotation: &Annotation) -> Result<Value, BoxError> {
        self(value, annotation)
    }
}

// =============================================================================
// PolicyHandler
// =============================================================================

/// Handler that applies a [`TextRedactionPolicy`] to string values.
///
/// Strings are masked, null stays null, and lists, sets and arrays are masked
/// element by element so that an annotation written directly on a container
/// reaches its strings. Every other shape passes through unchanged.
///
/// Two annotation attributes are understood: `mask_char` replaces the mask
/// character and `placeholder` replaces the whole value instead of masking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyHandler {
    policy: TextRedactionPolicy,
}

impl PolicyHandler {
    pub fn new(policy: TextRedactionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TextRedactionPolicy {
        &self.policy
    }

    fn effective_policy(&self, annotation: &Annotation) -> Result<TextRedactionPolicy, BoxError> {
        if let Some(placeholder) = annotation.attribute("placeholder") {
            return Ok(TextRedactionPolicy::replace(placeholder.to_owned()));
        }
        let Some(attribute) = annotation.attribute("mask_char") else {
            return Ok(self.policy.clone());
        };
        let mut chars = attribute.chars();
        match (chars.next(), chars.next()) {
            (Some(mask_char), None) => Ok(self.policy.clone().with_mask_char(mask_char)),
            _ => Err(format!(
                "mask_char of @{} must be a single character, got {attribute:?}",
                annotation.kind().name()
            )
            .into()),
        }
    }
}

fn apply(policy: &TextRedactionPolicy, value: Value) -> Value {
    match value {
        Value::Str(text) => Value::Str(policy.apply_to(&text)),
        Value::List(items) => Value::List(apply_each(policy, items)),
        Value::Set(items) => Value::Set(apply_each(policy, items)),
        Value::Array(items) => Value::Array(apply_each(policy, items)),
        other => other,
    }
}

fn apply_each(policy: &TextRedactionPolicy, items: Vec<Value>) -> Vec<Value> {
    items.into_iter().map(|item| apply(policy, item)).collect()
}

impl AnnotationHandler for PolicyHandler {
    fn handle(&self, value: Value, annotation: &Annotation) -> Result<Value, BoxError> {
        if value.is_null() {
            return Ok(value);
        }
        let policy = self.effective_policy(annotation)?;
        Ok(apply(&policy, value))
    }
}

// =============================================================================
// AnnotationHandlers - name table plus per-kind cache
// =============================================================================

/// Handlers by name, resolved per annotation kind.
///
/// Names are registered while a `Blur` is being built. Resolution happens at
/// first use of each kind and is cached afterwards.
#[derive(Default)]
pub struct AnnotationHandlers {
    by_name: HashMap<String, Arc<dyn AnnotationHandler>>,
    by_kind: DashMap<AnnotationKind, Arc<dyn AnnotationHandler>>,
}

impl AnnotationHandlers {
    /// A table holding the handler of every built-in redaction marker.
    pub fn builtin() -> Self {
        let mut handlers = Self::default();
        for (name, policy) in builtin_policies() {
            handlers.insert(name, PolicyHandler::new(policy));
        }
        handlers
    }

    /// Registers `handler` under `name`, replacing any earlier registration.
    pub fn insert(&mut self, name: impl Into<String>, handler: impl AnnotationHandler + 'static) {
        self.by_name.insert(name.into(), Arc::new(handler));
        self.by_kind.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Finds the handler named by `kind`'s `Parse` marker.
    pub fn resolve(&self, kind: &AnnotationKind) -> Result<Arc<dyn AnnotationHandler>> {
        if let Some(handler) = self.by_kind.get(kind) {
            return Ok(Arc::clone(handler.value()));
        }
        let handler_name = kind.parse().map(Parse::handler).unwrap_or_default();
        let handler = self
            .by_name
            .get(handler_name)
            .ok_or_else(|| Error::MissingHandler {
                annotation: kind.name().to_owned(),
                handler: handler_name.to_owned(),
            })?;
        self.by_kind.insert(kind.clone(), Arc::clone(handler));
        Ok(Arc::clone(handler))
    }

    /// Resolves and runs the handler for `annotation`.
    pub fn apply(&self, value: Value, annotation: &Annotation) -> Result<Value> {
        let handler = self.resolve(annotation.kind())?;
        tracing::trace!(
            annotation = %annotation,
            kind = value.kind(),
            "applying annotation handler"
        );
        handler.handle(value, annotation).map_err(Error::Handler)
    }
}

impl fmt::Debug for AnnotationHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.by_name.keys().collect();
        names.sort();
        f.debug_struct("AnnotationHandlers")
            .field("names", &names)
            .field("cached", &self.by_kind.len())
            .finish()
    }
}
