//! Type parsers: the structural half of the traversal.
//!
//! A [`TypeParser`] claims a (runtime value shape, annotated type shape) pair
//! and recurses into the sub-positions it knows about by calling
//! [`Traversal::redact`]. [`TypeParsers`] keeps them sorted by
//! [`TypeParser::order`] and hands out the first one that supports a pair.
//!
//! Built-in parsers:
//!
//! - [`CollectionParser`]: lists and sets declared with one type argument
//! - [`MapParser`]: maps declared with two type arguments
//! - [`ArrayParser`]: arrays declared as arrays
//! - [`WildcardParser`] and [`TypeVariableParser`]: bound positions
//! - [`CascadeParser`]: objects under the cascade marker
//! - [`EnvelopeParser`]: user generic wrappers, registered per class
//!
//! A parser whose shapes do not match must say so from `supports`; the value
//! then passes through unchanged.

mod arrays;
mod bounds;
mod cascade;
mod collections;
mod envelope;
mod maps;

use std::{
    fmt,
    sync::atomic::{AtomicI32, Ordering},
};

pub use arrays::ArrayParser;
pub use bounds::{TypeVariableParser, WildcardParser};
pub use cascade::CascadeParser;
pub use collections::CollectionParser;
pub use envelope::EnvelopeParser;
pub use maps::MapParser;

use crate::{engine::Traversal, error::Result, types::AnnotatedType, value::Value};

// =============================================================================
// Ordering
// =============================================================================

static NEXT_ORDER: AtomicI32 = AtomicI32::new(0);

/// Start of the order band reserved for built-in parsers.
///
/// Orders from [`next_order`] stay below it, so parsers registered by an
/// application are consulted before the built-ins.
pub const BUILTIN_ORDER: i32 = i32::MAX - 16;

/// Draws the next value from the process-wide order counter.
///
/// Values increase in call order and are unique within a process.
pub fn next_order() -> i32 {
    NEXT_ORDER.fetch_add(1, Ordering::Relaxed)
}

// =============================================================================
// TypeParser
// =============================================================================

/// Structural handler for one (value shape, annotated type shape) pair.
pub trait TypeParser: Send + Sync {
    /// Whether this parser handles `value` declared as `annotated_type`.
    fn supports(&self, value: &Value, annotated_type: &AnnotatedType) -> bool;

    /// Rewrites `value`, recursing into sub-positions through `traversal`.
    fn parse(
        &self,
        value: Value,
        annotated_type: &AnnotatedType,
        traversal: &mut Traversal<'_>,
    ) -> Result<Value>;

    /// Position in the registry; lower runs first.
    fn order(&self) -> i32;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

// =============================================================================
// TypeParsers - the registry
// =============================================================================

/// Type parsers sorted by order. Equal orders keep registration order.
#[derive(Default)]
pub struct TypeParsers {
    parsers: Vec<Box<dyn TypeParser>>,
}

impl TypeParsers {
    /// The built-in parsers, in their fixed order.
    pub fn builtin() -> Self {
        let mut parsers = Self::default();
        parsers.register(CollectionParser::new(BUILTIN_ORDER));
        parsers.register(MapParser::new(BUILTIN_ORDER + 1));
        parsers.register(ArrayParser::new(BUILTIN_ORDER + 2));
        parsers.register(WildcardParser::new(BUILTIN_ORDER + 3));
        parsers.register(TypeVariableParser::new(BUILTIN_ORDER + 4));
        parsers.register(CascadeParser::new(BUILTIN_ORDER + 5));
        parsers
    }

    pub fn register(&mut self, parser: impl TypeParser + 'static) {
        self.parsers.push(Box::new(parser));
        // Stable, so ties resolve by registration sequence.
        self.parsers.sort_by_key(|parser| parser.order());
    }

    /// The first parser, in order, that supports the pair.
    pub fn lookup(&self, value: &Value, annotated_type: &AnnotatedType) -> Option<&dyn TypeParser> {
        self.parsers
            .iter()
            .find(|parser| parser.supports(value, annotated_type))
            .map(AsRef::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn TypeParser> {
        self.parsers.iter().map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl fmt::Debug for TypeParsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.parsers.iter().map(|parser| (parser.name(), parser.order())))
            .finish()
    }
}
