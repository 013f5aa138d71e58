//! The traversal driver and the frozen registry it runs against.
//!
//! [`BlurBuilder`] is the registration epoch: type parsers, annotation
//! handlers and annotation kinds are added there. [`BlurBuilder::build`]
//! freezes everything into a [`Blur`], which is `Send + Sync` and offers no
//! way to register anything further. Share it as `Arc<Blur>`.
//!
//! One call to [`Blur::redact`] is one [`Traversal`]: it owns the identity set
//! that keeps cascading from revisiting an object.

use std::{borrow::Cow, collections::HashSet};

use crate::{
    annotation::{Annotate, Annotation, AnnotationKind, AnnotationKinds, Cascade},
    error::{BoxError, Result},
    handler::{AnnotationHandler, AnnotationHandlers},
    parser::{EnvelopeParser, TypeParser, TypeParsers, next_order},
    types::AnnotatedType,
    value::{FromValue, IntoValue, ObjectRef, Reflect, Value},
};

// =============================================================================
// Blur
// =============================================================================

/// Redaction engine: the type-parser registry, the annotation-handler table
/// and the annotation kinds known by name.
///
/// ```rust
/// use blur::{AnnotatedType, Blur, Email, Value};
///
/// let blur = Blur::new();
/// let declared = AnnotatedType::class("String").with::<Email>();
/// let redacted = blur.redact(Value::from("123456@qq.com"), &declared).unwrap();
/// assert_eq!(redacted, Value::from("1*****@qq.com"));
/// ```
#[derive(Debug)]
pub struct Blur {
    parsers: TypeParsers,
    handlers: AnnotationHandlers,
    kinds: AnnotationKinds,
}

impl Blur {
    /// An engine with the built-in parsers, handlers and annotation kinds.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> BlurBuilder {
        BlurBuilder::new()
    }

    /// Returns `value` with every redaction declared by `annotated_type`
    /// applied.
    ///
    /// Values whose shape does not match the declaration pass through
    /// unchanged. The only errors are a redaction annotation without a
    /// registered handler and a failing handler.
    pub fn redact(&self, value: Value, annotated_type: &AnnotatedType) -> Result<Value> {
        Traversal::new(self).redact(value, annotated_type)
    }

    /// Typed [`Blur::redact`]: converts `value` into the dynamic model,
    /// redacts it and converts it back.
    pub fn redact_as<T>(&self, value: T, annotated_type: &AnnotatedType) -> Result<T>
    where
        T: IntoValue + FromValue,
    {
        T::from_value(self.redact(value.into_value(), annotated_type)?)
    }

    /// Cascades into a reflected struct: each field is redacted against its
    /// declared annotations.
    pub fn redact_object<T: Reflect>(&self, value: T) -> Result<T> {
        self.redact_as(value, &T::annotated_type().with::<Cascade>())
    }

    /// Cascades into a shared object in place.
    pub fn redact_ref(&self, object: &ObjectRef) -> Result<()> {
        let declared = AnnotatedType::class(object.class().name().to_owned()).with::<Cascade>();
        self.redact(Value::Object(object.clone()), &declared)
            .map(drop)
    }

    /// The presence probe: whether `annotated_type` declares anything that
    /// would make [`Blur::redact`] change a value.
    pub fn requires_redaction(&self, annotated_type: &AnnotatedType) -> bool {
        annotated_type.requires_redaction()
    }

    /// Parses declaration text against the annotation kinds of this engine.
    pub fn annotated_type(&self, src: &str) -> Result<AnnotatedType> {
        AnnotatedType::parse(src, &self.kinds)
    }

    pub fn type_parsers(&self) -> &TypeParsers {
        &self.parsers
    }

    pub fn handlers(&self) -> &AnnotationHandlers {
        &self.handlers
    }

    pub fn annotation_kinds(&self) -> &AnnotationKinds {
        &self.kinds
    }
}

impl Default for Blur {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// BlurBuilder - the registration epoch
// =============================================================================

/// Collects registrations before a [`Blur`] is frozen.
#[derive(Debug)]
pub struct BlurBuilder {
    parsers: TypeParsers,
    handlers: AnnotationHandlers,
    kinds: AnnotationKinds,
}

impl BlurBuilder {
    /// Starts from the built-ins: every built-in parser in its fixed order,
    /// a handler for every built-in redaction marker, and the built-in kinds.
    pub fn new() -> Self {
        Self {
            parsers: TypeParsers::builtin(),
            handlers: AnnotationHandlers::builtin(),
            kinds: AnnotationKinds::builtin(),
        }
    }

    /// Registers a type parser. Parsers are consulted in [`TypeParser::order`].
    #[must_use]
    pub fn type_parser(mut self, parser: impl TypeParser + 'static) -> Self {
        self.parsers.register(parser);
        self
    }

    /// Registers a generic envelope: instances of `class` declared with one
    /// type argument have their `payload` field redacted against it.
    #[must_use]
    pub fn envelope(
        self,
        class: impl Into<Cow<'static, str>>,
        payload: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.type_parser(EnvelopeParser::new(class, payload, next_order()))
    }

    /// Registers an annotation handler under the name a `Parse` marker refers to.
    #[must_use]
    pub fn handler(
        mut self,
        name: impl Into<String>,
        handler: impl AnnotationHandler + 'static,
    ) -> Self {
        self.handlers.insert(name, handler);
        self
    }

    /// [`BlurBuilder::handler`] for closures.
    #[must_use]
    pub fn handler_fn<F>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value, &Annotation) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.handler(name, handler)
    }

    /// Makes an annotation kind known by name to [`Blur::annotated_type`].
    #[must_use]
    pub fn annotation_kind(mut self, kind: AnnotationKind) -> Self {
        self.kinds.insert(kind);
        self
    }

    /// [`BlurBuilder::annotation_kind`] for a marker type.
    #[must_use]
    pub fn annotation<A: Annotate>(self) -> Self {
        self.annotation_kind(A::KIND)
    }

    pub fn build(self) -> Blur {
        tracing::debug!(
            parsers = self.parsers.len(),
            annotation_kinds = self.kinds.len(),
            "blur registry frozen"
        );
        Blur {
            parsers: self.parsers,
            handlers: self.handlers,
            kinds: self.kinds,
        }
    }
}

impl Default for BlurBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Traversal - one top-level redaction
// =============================================================================

/// State of one top-level [`Blur::redact`] call.
///
/// Type parsers receive the traversal and call [`Traversal::redact`] for each
/// sub-position they own.
#[derive(Debug)]
pub struct Traversal<'a> {
    blur: &'a Blur,
    visited: HashSet<usize>,
    // Keeps every visited object alive so its address cannot be reused
    // by a new object before the traversal ends.
    retained: Vec<ObjectRef>,
}

impl<'a> Traversal<'a> {
    pub fn new(blur: &'a Blur) -> Self {
        Self {
            blur,
            visited: HashSet::new(),
            retained: Vec::new(),
        }
    }

    pub fn blur(&self) -> &'a Blur {
        self.blur
    }

    /// Records `object` as visited. Returns `false` if it already was.
    pub fn enter(&mut self, object: &ObjectRef) -> bool {
        if !self.visited.insert(object.id()) {
            return false;
        }
        self.retained.push(object.clone());
        true
    }

    /// Redacts one position.
    ///
    /// 1. Null is returned unchanged.
    /// 2. Redaction annotations declared at this node run in declaration
    ///    order, each through its handler.
    /// 3. If the node carries the cascade marker, or any sub-position needs
    ///    redaction, the first supporting type parser takes over. Without one
    ///    the value passes through.
    pub fn redact(&mut self, value: Value, annotated_type: &AnnotatedType) -> Result<Value> {
        if value.is_null() {
            return Ok(value);
        }

        let mut value = value;
        for annotation in annotated_type.redaction_annotations() {
            value = self.blur.handlers.apply(value, annotation)?;
            if value.is_null() {
                return Ok(value);
            }
        }

        let structural = annotated_type.has_cascade()
            || annotated_type
                .sub_positions()
                .any(AnnotatedType::requires_redaction);
        if !structural {
            return Ok(value);
        }

        let blur = self.blur;
        match blur.parsers.lookup(&value, annotated_type) {
            Some(parser) => {
                tracing::trace!(
                    parser = parser.name(),
                    declared = %annotated_type,
                    "delegating to type parser"
                );
                parser.parse(value, annotated_type, self)
            }
            None => {
                tracing::trace!(
                    kind = value.kind(),
                    declared = %annotated_type,
                    "no type parser supports value, passing through"
                );
                Ok(value)
            }
        }
    }
}
