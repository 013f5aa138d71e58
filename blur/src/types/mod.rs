//! Annotated types: declared types with annotations at every position.
//!
//! An [`AnnotatedType`] is a closed union of five shapes. Every node carries
//! the annotations declared at that position only; nothing is inherited from
//! an enclosing node. The presence probe ([`AnnotatedType::requires_redaction`])
//! lives here as well, since it is a pure function of the tree.

mod parse;

use std::{borrow::Cow, fmt};

use crate::annotation::{Annotate, Annotation};

// =============================================================================
// Node shapes
// =============================================================================

/// A named type with no type arguments, such as `String` or `Person`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatedClass {
    name: Cow<'static, str>,
    annotations: Vec<Annotation>,
}

impl AnnotatedClass {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A generic type applied to annotated type arguments, such as `Vec<@Email String>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatedParameterized {
    raw: Cow<'static, str>,
    arguments: Vec<AnnotatedType>,
    annotations: Vec<Annotation>,
}

impl AnnotatedParameterized {
    /// Name of the generic type without its arguments.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn arguments(&self) -> &[AnnotatedType] {
        &self.arguments
    }
}

/// An array of an annotated component type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatedArray {
    component: Box<AnnotatedType>,
    annotations: Vec<Annotation>,
}

impl AnnotatedArray {
    pub fn component(&self) -> &AnnotatedType {
        &self.component
    }
}

/// A wildcard type argument, `?`, with optional bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatedWildcard {
    upper_bounds: Vec<AnnotatedType>,
    lower_bounds: Vec<AnnotatedType>,
    annotations: Vec<Annotation>,
}

impl AnnotatedWildcard {
    pub fn upper_bounds(&self) -> &[AnnotatedType] {
        &self.upper_bounds
    }

    pub fn lower_bounds(&self) -> &[AnnotatedType] {
        &self.lower_bounds
    }
}

/// A use of a declared type variable together with its annotated bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatedTypeVariable {
    name: Cow<'static, str>,
    bounds: Vec<AnnotatedType>,
    annotations: Vec<Annotation>,
}

impl AnnotatedTypeVariable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> &[AnnotatedType] {
        &self.bounds
    }
}

// =============================================================================
// AnnotatedType
// =============================================================================

/// A declared type description carrying annotations at each position.
///
/// ```rust
/// use blur::{AnnotatedType, Cascade, Email, Name};
///
/// // Map<@Name String, @Cascade Person>
/// let declared = AnnotatedType::parameterized(
///     "Map",
///     vec![
///         AnnotatedType::class("String").with::<Name>(),
///         AnnotatedType::class("Person").with::<Cascade>(),
///     ],
/// );
/// assert!(declared.requires_redaction());
/// assert!(!AnnotatedType::class("String").requires_redaction());
/// assert!(AnnotatedType::class("String").with::<Email>().requires_redaction());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnotatedType {
    Class(AnnotatedClass),
    Parameterized(AnnotatedParameterized),
    Array(AnnotatedArray),
    Wildcard(AnnotatedWildcard),
    TypeVariable(AnnotatedTypeVariable),
}

impl AnnotatedType {
    pub fn class(name: impl Into<Cow<'static, str>>) -> Self {
        AnnotatedType::Class(AnnotatedClass {
            name: name.into(),
            annotations: Vec::new(),
        })
    }

    pub fn parameterized(raw: impl Into<Cow<'static, str>>, arguments: Vec<AnnotatedType>) -> Self {
        AnnotatedType::Parameterized(AnnotatedParameterized {
            raw: raw.into(),
            arguments,
            annotations: Vec::new(),
        })
    }

    pub fn array(component: AnnotatedType) -> Self {
        AnnotatedType::Array(AnnotatedArray {
            component: Box::new(component),
            annotations: Vec::new(),
        })
    }

    /// The unbounded wildcard `?`.
    pub fn wildcard() -> Self {
        Self::wildcard_bounded(Vec::new(), Vec::new())
    }

    /// `? extends B1 & B2 ...`
    pub fn wildcard_extends(upper_bounds: Vec<AnnotatedType>) -> Self {
        Self::wildcard_bounded(upper_bounds, Vec::new())
    }

    /// `? super B1 & B2 ...`
    pub fn wildcard_super(lower_bounds: Vec<AnnotatedType>) -> Self {
        Self::wildcard_bounded(Vec::new(), lower_bounds)
    }

    pub fn wildcard_bounded(
        upper_bounds: Vec<AnnotatedType>,
        lower_bounds: Vec<AnnotatedType>,
    ) -> Self {
        AnnotatedType::Wildcard(AnnotatedWildcard {
            upper_bounds,
            lower_bounds,
            annotations: Vec::new(),
        })
    }

    pub fn type_variable(name: impl Into<Cow<'static, str>>, bounds: Vec<AnnotatedType>) -> Self {
        AnnotatedType::TypeVariable(AnnotatedTypeVariable {
            name: name.into(),
            bounds,
            annotations: Vec::new(),
        })
    }

    /// Builder-style [`AnnotatedType::annotate`].
    #[must_use]
    pub fn annotated(mut self, annotation: impl Into<Annotation>) -> Self {
        self.annotate(annotation);
        self
    }

    /// Appends the annotation of marker type `A`.
    #[must_use]
    pub fn with<A: Annotate>(self) -> Self {
        self.annotated(A::annotation())
    }

    /// Appends an annotation declared at this node. Declaration order is kept.
    pub fn annotate(&mut self, annotation: impl Into<Annotation>) {
        self.annotations_mut().push(annotation.into());
    }

    /// Annotates the element position: the first type argument of a
    /// parameterized type or the component of an array. Returns `false` when
    /// this node has no element position.
    pub fn annotate_element(&mut self, annotation: impl Into<Annotation>) -> bool {
        match self {
            AnnotatedType::Array(array) => {
                array.component.annotate(annotation);
                true
            }
            AnnotatedType::Parameterized(_) => self.annotate_argument(0, annotation),
            _ => false,
        }
    }

    /// Annotates the type argument at `index`. Returns `false` when there is
    /// no such argument.
    pub fn annotate_argument(&mut self, index: usize, annotation: impl Into<Annotation>) -> bool {
        match self {
            AnnotatedType::Parameterized(parameterized) => {
                match parameterized.arguments.get_mut(index) {
                    Some(argument) => {
                        argument.annotate(annotation);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Annotations declared at this node, in declaration order.
    pub fn annotations(&self) -> &[Annotation] {
        match self {
            AnnotatedType::Class(node) => &node.annotations,
            AnnotatedType::Parameterized(node) => &node.annotations,
            AnnotatedType::Array(node) => &node.annotations,
            AnnotatedType::Wildcard(node) => &node.annotations,
            AnnotatedType::TypeVariable(node) => &node.annotations,
        }
    }

    fn annotations_mut(&mut self) -> &mut Vec<Annotation> {
        match self {
            AnnotatedType::Class(node) => &mut node.annotations,
            AnnotatedType::Parameterized(node) => &mut node.annotations,
            AnnotatedType::Array(node) => &mut node.annotations,
            AnnotatedType::Wildcard(node) => &mut node.annotations,
            AnnotatedType::TypeVariable(node) => &mut node.annotations,
        }
    }

    /// Type arguments of a parameterized type; empty for every other shape.
    pub fn arguments(&self) -> &[AnnotatedType] {
        match self {
            AnnotatedType::Parameterized(parameterized) => &parameterized.arguments,
            _ => &[],
        }
    }

    /// Component type of an array.
    pub fn component(&self) -> Option<&AnnotatedType> {
        match self {
            AnnotatedType::Array(array) => Some(&array.component),
            _ => None,
        }
    }

    /// Name of a class, the raw name of a parameterized type, or the name of
    /// a type variable.
    pub fn name(&self) -> Option<&str> {
        match self {
            AnnotatedType::Class(class) => Some(class.name()),
            AnnotatedType::Parameterized(parameterized) => Some(parameterized.raw()),
            AnnotatedType::TypeVariable(variable) => Some(variable.name()),
            AnnotatedType::Array(_) | AnnotatedType::Wildcard(_) => None,
        }
    }

    /// Direct sub-positions, in traversal order: bounds of a type variable,
    /// upper then lower bounds of a wildcard, arguments of a parameterized
    /// type, the component of an array.
    pub fn sub_positions(&self) -> impl Iterator<Item = &AnnotatedType> {
        let empty: &[AnnotatedType] = &[];
        let (first, second) = match self {
            AnnotatedType::Class(_) => (empty, empty),
            AnnotatedType::Parameterized(node) => (node.arguments.as_slice(), empty),
            AnnotatedType::Array(node) => (std::slice::from_ref(node.component.as_ref()), empty),
            AnnotatedType::Wildcard(node) => {
                (node.upper_bounds.as_slice(), node.lower_bounds.as_slice())
            }
            AnnotatedType::TypeVariable(node) => (node.bounds.as_slice(), empty),
        };
        first.iter().chain(second)
    }

    // -------------------------------------------------------------------------
    // Presence probe
    // -------------------------------------------------------------------------

    /// Redaction-bearing annotations declared at this node, in declaration order.
    pub fn redaction_annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations()
            .iter()
            .filter(|annotation| annotation.kind().is_redaction())
    }

    /// Whether the cascade marker is declared at this node.
    pub fn has_cascade(&self) -> bool {
        self.annotations()
            .iter()
            .any(|annotation| annotation.kind().is_cascade())
    }

    /// Whether any redaction-bearing annotation or the cascade marker is
    /// reachable from this node.
    ///
    /// The tree is owned and therefore finite, so the recursion terminates
    /// without memoization.
    pub fn requires_redaction(&self) -> bool {
        self.redaction_annotations().next().is_some()
            || self.has_cascade()
            || self.sub_positions().any(AnnotatedType::requires_redaction)
    }
}

// =============================================================================
// Display - declaration syntax accepted by `AnnotatedType::parse`
// =============================================================================

fn write_annotations(f: &mut fmt::Formatter<'_>, annotations: &[Annotation]) -> fmt::Result {
    for annotation in annotations {
        write!(f, "{annotation} ")?;
    }
    Ok(())
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[AnnotatedType], separator: &str) -> fmt::Result {
    for (index, ty) in types.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

impl fmt::Display for AnnotatedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotatedType::Class(class) => {
                write_annotations(f, &class.annotations)?;
                f.write_str(&class.name)
            }
            AnnotatedType::Parameterized(parameterized) => {
                write_annotations(f, &parameterized.annotations)?;
                write!(f, "{}<", parameterized.raw)?;
                write_list(f, &parameterized.arguments, ", ")?;
                f.write_str(">")
            }
            AnnotatedType::Array(_) => {
                // Java order: element type first, then dimensions outermost first.
                let mut dims = Vec::new();
                let mut current = self;
                while let AnnotatedType::Array(array) = current {
                    dims.push(&array.annotations);
                    current = &array.component;
                }
                write!(f, "{current}")?;
                for annotations in dims {
                    if !annotations.is_empty() {
                        f.write_str(" ")?;
                        write_annotations(f, annotations)?;
                    }
                    f.write_str("[]")?;
                }
                Ok(())
            }
            AnnotatedType::Wildcard(wildcard) => {
                write_annotations(f, &wildcard.annotations)?;
                f.write_str("?")?;
                if !wildcard.upper_bounds.is_empty() {
                    f.write_str(" extends ")?;
                    write_list(f, &wildcard.upper_bounds, " & ")?;
                }
                if !wildcard.lower_bounds.is_empty() {
                    f.write_str(" super ")?;
                    write_list(f, &wildcard.lower_bounds, " & ")?;
                }
                Ok(())
            }
            AnnotatedType::TypeVariable(variable) => {
                write_annotations(f, &variable.annotations)?;
                f.write_str(&variable.name)
            }
        }
    }
}
