//! User objects and their declared layout.

use std::{
    borrow::Cow,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError},
};

use super::Value;
use crate::types::AnnotatedType;

// =============================================================================
// Class - declared layout
// =============================================================================

/// How a field is declared. Only instance fields take part in cascading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Instance,
    Static,
    Synthetic,
}

/// A declared field: its name, its annotated type, and its kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    name: Cow<'static, str>,
    annotated_type: AnnotatedType,
    kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<Cow<'static, str>>, annotated_type: AnnotatedType) -> Self {
        Self {
            name: name.into(),
            annotated_type,
            kind: FieldKind::Instance,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annotated_type(&self) -> &AnnotatedType {
        &self.annotated_type
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

/// The declared layout of a user type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Class {
    name: Cow<'static, str>,
    fields: Vec<Field>,
}

impl Class {
    pub fn builder(name: impl Into<Cow<'static, str>>) -> ClassBuilder {
        ClassBuilder {
            class: Class {
                name: name.into(),
                fields: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name() == name)
    }
}

/// Builder for [`Class`]. Fields keep their declaration order.
#[derive(Debug)]
pub struct ClassBuilder {
    class: Class,
}

impl ClassBuilder {
    #[must_use]
    pub fn field(self, name: impl Into<Cow<'static, str>>, annotated_type: AnnotatedType) -> Self {
        self.declare(Field::new(name, annotated_type))
    }

    #[must_use]
    pub fn static_field(
        self,
        name: impl Into<Cow<'static, str>>,
        annotated_type: AnnotatedType,
    ) -> Self {
        self.declare(Field::new(name, annotated_type).with_kind(FieldKind::Static))
    }

    #[must_use]
    pub fn synthetic_field(
        self,
        name: impl Into<Cow<'static, str>>,
        annotated_type: AnnotatedType,
    ) -> Self {
        self.declare(Field::new(name, annotated_type).with_kind(FieldKind::Synthetic))
    }

    #[must_use]
    pub fn declare(mut self, field: Field) -> Self {
        self.class.fields.push(field);
        self
    }

    pub fn build(self) -> Arc<Class> {
        Arc::new(self.class)
    }
}

// =============================================================================
// Object - an instance of a class
// =============================================================================

/// An instance of a [`Class`]. Field values are stored in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    class: Arc<Class>,
    values: Vec<Value>,
}

impl Object {
    /// Creates an instance with every field set to [`Value::Null`].
    pub fn new(class: Arc<Class>) -> Self {
        let values = vec![Value::Null; class.fields().len()];
        Self { class, values }
    }

    /// Creates an instance from values in declaration order.
    ///
    /// Missing trailing values are filled with [`Value::Null`]; extra values
    /// are dropped.
    pub fn from_parts(class: Arc<Class>, mut values: Vec<Value>) -> Self {
        values.resize(class.fields().len(), Value::Null);
        Self { class, values }
    }

    /// Builder-style setter. Unknown field names are ignored.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.class.index_of(name).map(|index| &self.values[index])
    }

    /// Sets a field, returning `false` when the class declares no such field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> bool {
        match self.class.index_of(name) {
            Some(index) => {
                self.values[index] = value.into();
                true
            }
            None => false,
        }
    }

    pub(crate) fn value_at(&self, index: usize) -> &Value {
        &self.values[index]
    }

    pub(crate) fn set_at(&mut self, index: usize, value: Value) {
        self.values[index] = value;
    }

    pub fn into_ref(self) -> ObjectRef {
        ObjectRef::new(self)
    }
}

// =============================================================================
// ObjectRef - shared handle with identity
// =============================================================================

/// Shared handle to an [`Object`].
///
/// Two handles are the same object when [`ObjectRef::ptr_eq`] holds. Cascading
/// mutates the object behind the handle in place, so every clone of the handle
/// observes the redacted fields.
#[derive(Clone)]
pub struct ObjectRef(Arc<Mutex<Object>>);

impl ObjectRef {
    pub fn new(object: Object) -> Self {
        Self(Arc::new(Mutex::new(object)))
    }

    /// Locks the object. A poisoned lock still yields the object.
    pub fn lock(&self) -> MutexGuard<'_, Object> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn try_lock(&self) -> Option<MutexGuard<'_, Object>> {
        match self.0.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    pub fn class(&self) -> Arc<Class> {
        Arc::clone(self.lock().class())
    }

    /// Returns a copy of a field value, or [`Value::Null`] for unknown fields.
    pub fn field(&self, name: &str) -> Value {
        self.lock().get(name).cloned().unwrap_or_default()
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) -> bool {
        self.lock().set(name, value)
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address-based identity, stable for the lifetime of the object.
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Runs `f` on the object unless it is already locked on this path.
    ///
    /// Used by formatting and serialization so that self-referencing objects
    /// render once instead of recursing forever.
    pub(crate) fn with_unlocked<R>(&self, f: impl FnOnce(&Object) -> R) -> Option<R> {
        self.try_lock().map(|guard| f(&guard))
    }
}

impl PartialEq for ObjectRef {
    /// Identical handles are equal. Distinct objects are equal when their
    /// classes and field values are; an object that is currently locked (for
    /// example, because it is being compared further up a cycle) compares
    /// unequal to anything but itself.
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let Some(left) = self.try_lock() else {
            return false;
        };
        let Some(right) = other.try_lock() else {
            return false;
        };
        left.class.name() == right.class.name() && left.values == right.values
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.with_unlocked(|object| {
            let mut debug = f.debug_struct(object.class.name());
            for (field, value) in object.class.fields().iter().zip(&object.values) {
                debug.field(field.name(), value);
            }
            debug.finish()
        });
        match rendered {
            Some(result) => result,
            None => f.write_str("<cycle>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Arc<Class> {
        Class::builder("Person")
            .field("phone_number", AnnotatedType::class("String"))
            .field("email", AnnotatedType::class("String"))
            .field("friend", AnnotatedType::class("Person"))
            .build()
    }

    #[test]
    fn new_object_has_null_fields() {
        let object = Object::new(person());
        assert_eq!(object.values().len(), 3);
        assert!(object.values().iter().all(Value::is_null));
    }

    #[test]
    fn set_rejects_unknown_fields() {
        let mut object = Object::new(person());
        assert!(object.set("email", "a@b.c"));
        assert!(!object.set("address", "nowhere"));
        assert_eq!(object.get("email"), Some(&Value::from("a@b.c")));
    }

    #[test]
    fn from_parts_pads_missing_values() {
        let object = Object::from_parts(person(), vec![Value::from("123")]);
        assert_eq!(object.values().len(), 3);
        assert!(object.get("email").is_some_and(Value::is_null));
    }

    #[test]
    fn clones_share_identity() {
        let first = Object::new(person()).with("email", "x@y.z").into_ref();
        let second = first.clone();
        second.set("email", "changed");
        assert!(first.ptr_eq(&second));
        assert_eq!(first.field("email"), Value::from("changed"));
    }

    #[test]
    fn distinct_objects_compare_by_content() {
        let first = Object::new(person()).with("email", "x@y.z").into_ref();
        let second = Object::new(person()).with("email", "x@y.z").into_ref();
        assert!(!first.ptr_eq(&second));
        assert_eq!(first, second);
    }

    #[test]
    fn debug_terminates_on_self_reference() {
        let object = Object::new(person()).into_ref();
        object.set("friend", object.clone());
        let rendered = format!("{object:?}");
        assert!(rendered.contains("<cycle>"));
    }
}
