//! Redaction annotations: kinds, instances, and markers.
//!
//! An annotation *kind* is redaction-bearing when it carries the [`Parse`]
//! marker, which names the handler that rewrites values under it. The single
//! [`Marker::Cascade`] kind asks the traversal to walk an object's declared
//! fields instead of rewriting the value itself. Kinds with no marker are
//! ignored by redaction altogether.
//!
//! Zero-sized marker types (see `builtin`) tie a Rust type to a kind so that
//! annotations can be written as `#[blur(Email)]` or `.with::<Email>()`.

mod builtin;

use std::{borrow::Cow, collections::HashMap, fmt};

pub use builtin::{BankCard, Cascade, Email, IdCard, Name, Password, PhoneNumber};
pub(crate) use builtin::builtin_policies;

// =============================================================================
// Markers
// =============================================================================

/// Meta-marker naming the handler of a redaction annotation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Parse {
    handler: Cow<'static, str>,
}

impl Parse {
    pub const fn new(handler: &'static str) -> Self {
        Self {
            handler: Cow::Borrowed(handler),
        }
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }
}

/// What an annotation kind means to the traversal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Redaction-bearing: values under the annotation go through the handler.
    Parse(Parse),
    /// Recurse into the value's declared fields.
    Cascade,
}

// =============================================================================
// AnnotationKind
// =============================================================================

/// The declaration of an annotation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnnotationKind {
    name: Cow<'static, str>,
    marker: Option<Marker>,
}

impl AnnotationKind {
    /// A redaction-bearing kind whose values are rewritten by `handler`.
    pub const fn redaction(name: &'static str, handler: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            marker: Some(Marker::Parse(Parse::new(handler))),
        }
    }

    /// The cascade marker kind.
    pub const fn cascade() -> Self {
        Self {
            name: Cow::Borrowed("Cascade"),
            marker: Some(Marker::Cascade),
        }
    }

    /// A kind that means nothing to redaction.
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            marker: None,
        }
    }

    pub fn new(name: impl Into<Cow<'static, str>>, marker: Option<Marker>) -> Self {
        Self {
            name: name.into(),
            marker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    /// The [`Parse`] marker, present on redaction-bearing kinds only.
    pub fn parse(&self) -> Option<&Parse> {
        match &self.marker {
            Some(Marker::Parse(parse)) => Some(parse),
            _ => None,
        }
    }

    pub fn is_redaction(&self) -> bool {
        self.parse().is_some()
    }

    pub fn is_cascade(&self) -> bool {
        matches!(self.marker, Some(Marker::Cascade))
    }
}

// =============================================================================
// Annotation
// =============================================================================

/// An annotation declared at one position of an annotated type.
///
/// Attributes are free-form `key = "value"` pairs read by handlers (the
/// built-in handlers understand `mask_char`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    kind: AnnotationKind,
    attributes: Vec<(Cow<'static, str>, String)>,
}

impl Annotation {
    pub fn new(kind: AnnotationKind) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((key, value)),
        }
        self
    }

    pub fn kind(&self) -> &AnnotationKind {
        &self.kind
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_ref(), value.as_str()))
    }
}

impl From<AnnotationKind> for Annotation {
    fn from(kind: AnnotationKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.kind.name())?;
        if self.attributes.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (index, (key, value)) in self.attributes.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key} = {value:?}")?;
        }
        f.write_str(")")
    }
}

// =============================================================================
// Annotate - marker types
// =============================================================================

/// Associates a zero-sized marker type with an annotation kind.
///
/// ```rust
/// use blur::{Annotate, AnnotationKind};
///
/// struct Iban;
///
/// impl Annotate for Iban {
///     const KIND: AnnotationKind = AnnotationKind::redaction("Iban", "iban");
/// }
///
/// assert!(Iban::annotation().kind().is_redaction());
/// ```
pub trait Annotate {
    const KIND: AnnotationKind;

    fn annotation() -> Annotation {
        Annotation::new(Self::KIND)
    }
}

// =============================================================================
// AnnotationKinds - name lookup for declaration text
// =============================================================================

/// Annotation kinds known by name, used when parsing declaration text.
#[derive(Clone, Debug, Default)]
pub struct AnnotationKinds {
    by_name: HashMap<String, AnnotationKind>,
}

impl AnnotationKinds {
    /// The built-in kinds: every redaction marker type plus `Cascade`.
    pub fn builtin() -> Self {
        let mut kinds = Self::default();
        kinds.insert(Email::KIND);
        kinds.insert(PhoneNumber::KIND);
        kinds.insert(Name::KIND);
        kinds.insert(Password::KIND);
        kinds.insert(BankCard::KIND);
        kinds.insert(IdCard::KIND);
        kinds.insert(Cascade::KIND);
        kinds
    }

    /// Adds a kind, replacing any kind registered under the same name.
    pub fn insert(&mut self, kind: AnnotationKind) {
        self.by_name.insert(kind.name().to_owned(), kind);
    }

    pub fn get(&self, name: &str) -> Option<&AnnotationKind> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
