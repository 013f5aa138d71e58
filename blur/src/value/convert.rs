//! Typed façade over [`Value`].
//!
//! [`IntoValue`] and [`FromValue`] move Rust values in and out of the dynamic
//! model; [`Describe`] gives the declared annotated type of a Rust type with no
//! annotations attached. `#[derive(Reflect)]` implements all of them, plus
//! [`Reflect`], for structs with named fields.
//!
//! `Option<T>` is transparent: `None` is [`Value::Null`] and the declared type
//! is the declared type of `T`.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    hash::{BuildHasher, Hash},
    marker::PhantomData,
    sync::Arc,
};

use super::{Class, ObjectRef, Value};
use crate::{
    error::{Error, Result},
    types::AnnotatedType,
};

/// Moves a Rust value into the dynamic model.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Rebuilds a Rust value from the dynamic model.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

/// The declared annotated type of a Rust type, without annotations.
pub trait Describe {
    fn annotated_type() -> AnnotatedType;
}

/// A struct whose declared fields are known at runtime.
///
/// Implemented by `#[derive(Reflect)]`; the returned class is what the cascade
/// parser walks.
pub trait Reflect: IntoValue + FromValue + Describe {
    fn class() -> Arc<Class>;
}

fn mismatch(expected: &'static str, found: &Value) -> Error {
    Error::Conversion {
        expected,
        found: found.kind(),
    }
}

// =============================================================================
// Value itself
// =============================================================================

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl IntoValue for ObjectRef {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(object) => Ok(object),
            other => Err(mismatch("object", &other)),
        }
    }
}

// =============================================================================
// Scalars
// =============================================================================

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_owned())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Str(value) => Ok(value),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl Describe for String {
    fn annotated_type() -> AnnotatedType {
        AnnotatedType::class("String")
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(value) => Ok(value),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl Describe for bool {
    fn annotated_type() -> AnnotatedType {
        AnnotatedType::class("bool")
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(value) => Ok(value),
            other => Err(mismatch("f64", &other)),
        }
    }
}

impl Describe for f64 {
    fn annotated_type() -> AnnotatedType {
        AnnotatedType::class("f64")
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl FromValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(value) => Ok(value as f32),
            other => Err(mismatch("f32", &other)),
        }
    }
}

impl Describe for f32 {
    fn annotated_type() -> AnnotatedType {
        AnnotatedType::class("f32")
    }
}

macro_rules! impl_integer {
    ($($ty:ident),* $(,)?) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Int(i64::from(self))
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Int(value) => $ty::try_from(value)
                            .map_err(|_| mismatch(stringify!($ty), &Value::Int(value))),
                        other => Err(mismatch(stringify!($ty), &other)),
                    }
                }
            }

            impl Describe for $ty {
                fn annotated_type() -> AnnotatedType {
                    AnnotatedType::class(stringify!($ty))
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, u8, u16, u32);

// =============================================================================
// Option (transparent)
// =============================================================================

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Describe> Describe for Option<T> {
    fn annotated_type() -> AnnotatedType {
        T::annotated_type()
    }
}

// =============================================================================
// PhantomData (carries no value)
// =============================================================================

impl<T: ?Sized> IntoValue for PhantomData<T> {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl<T: ?Sized> FromValue for PhantomData<T> {
    fn from_value(_value: Value) -> Result<Self> {
        Ok(PhantomData)
    }
}

impl<T: ?Sized> Describe for PhantomData<T> {
    fn annotated_type() -> AnnotatedType {
        AnnotatedType::class("PhantomData")
    }
}

// =============================================================================
// Sequences, sets and arrays
// =============================================================================

fn collect_elements<T: FromValue>(items: Vec<Value>) -> Result<Vec<T>> {
    items.into_iter().map(T::from_value).collect()
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) | Value::Array(items) => collect_elements(items),
            other => Err(mismatch("Vec", &other)),
        }
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn annotated_type() -> AnnotatedType {
        AnnotatedType::parameterized("Vec", vec![T::annotated_type()])
    }
}

impl<T: IntoValue, S> IntoValue for HashSet<T, S> {
    fn into_value(self) -> Value {
        Value::Set(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T, S> FromValue for HashSet<T, S>
where
    T: FromValue + Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Set(items) | Value::List(items) => {
                Ok(collect_elements(items)?.into_iter().collect())
            }
            other => Err(mismatch("HashSet", &other)),
        }
    }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn annotated_type() -> AnnotatedType {
        AnnotatedType::parameterized("HashSet", vec![T::annotated_type()])
    }
}

impl<T: IntoValue> IntoValue for BTreeSet<T> {
    fn into_value(self) -> Value {
        Value::Set(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue + Ord> FromValue for BTreeSet<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Set(items) | Value::List(items) => {
                Ok(collect_elements(items)?.into_iter().collect())
            }
            other => Err(mismatch("BTreeSet", &other)),
        }
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn annotated_type() -> AnnotatedType {
        AnnotatedType::parameterized("BTreeSet", vec![T::annotated_type()])
    }
}

impl<T: IntoValue, const N: usize> IntoValue for [T; N] {
    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue, const N: usize> FromValue for [T; N] {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) if items.len() == N => collect_elements::<T>(items)?
                .try_into()
                .map_err(|_| mismatch("array", &Value::Array(Vec::new()))),
            other => Err(mismatch("array", &other)),
        }
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn annotated_type() -> AnnotatedType {
        AnnotatedType::array(T::annotated_type())
    }
}

// =============================================================================
// Maps
// =============================================================================

fn collect_entries<K: FromValue, V: FromValue>(
    entries: Vec<(Value, Value)>,
) -> Result<Vec<(K, V)>> {
    entries
        .into_iter()
        .map(|(key, value)| Ok((K::from_value(key)?, V::from_value(value)?)))
        .collect()
}

impl<K: IntoValue, V: IntoValue, S> IntoValue for HashMap<K, V, S> {
    fn into_value(self) -> Value {
        Value::Map(
            self.into_iter()
                .map(|(key, value)| (key.into_value(), value.into_value()))
                .collect(),
        )
    }
}

impl<K, V, S> FromValue for HashMap<K, V, S>
where
    K: FromValue + Eq + Hash,
    V: FromValue,
    S: BuildHasher + Default,
{
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(entries) => Ok(collect_entries(entries)?.into_iter().collect()),
            other => Err(mismatch("HashMap", &other)),
        }
    }
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn annotated_type() -> AnnotatedType {
        AnnotatedType::parameterized("HashMap", vec![K::annotated_type(), V::annotated_type()])
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for BTreeMap<K, V> {
    fn into_value(self) -> Value {
        Value::Map(
            self.into_iter()
                .map(|(key, value)| (key.into_value(), value.into_value()))
                .collect(),
        )
    }
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(entries) => Ok(collect_entries(entries)?.into_iter().collect()),
            other => Err(mismatch("BTreeMap", &other)),
        }
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn annotated_type() -> AnnotatedType {
        AnnotatedType::parameterized("BTreeMap", vec![K::annotated_type(), V::annotated_type()])
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use super::*;

    #[test]
    fn option_maps_none_to_null_and_back() {
        assert_eq!(None::<String>.into_value(), Value::Null);
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<String>::from_value(Value::from("x")).unwrap(),
            Some("x".to_string())
        );
    }

    #[test]
    fn option_declares_inner_type() {
        assert_eq!(
            <Option<String>>::annotated_type(),
            AnnotatedType::class("String")
        );
    }

    #[test]
    fn vec_becomes_list() {
        let value = vec!["a".to_string(), "b".to_string()].into_value();
        assert_eq!(value, Value::List(vec![Value::from("a"), Value::from("b")]));
        let back = Vec::<String>::from_value(value).unwrap();
        assert_eq!(back, ["a", "b"]);
    }

    #[test]
    fn set_becomes_set() {
        let set: HashSet<String> = ["a".to_string()].into_iter().collect();
        assert!(matches!(set.into_value(), Value::Set(items) if items.len() == 1));
    }

    #[test]
    fn array_round_trips_with_matching_length() {
        let value = ["a".to_string(), "b".to_string()].into_value();
        assert!(matches!(value, Value::Array(_)));
        let back = <[String; 2]>::from_value(value).unwrap();
        assert_eq!(back, ["a", "b"]);
        assert!(<[String; 3]>::from_value(Value::Array(vec![])).is_err());
    }

    #[test]
    fn btree_map_keeps_key_order() {
        let map: BTreeMap<String, i32> = [("b".to_string(), 2), ("a".to_string(), 1)]
            .into_iter()
            .collect();
        let value = map.into_value();
        let keys: Vec<_> = value
            .as_entries()
            .unwrap()
            .iter()
            .map(|(key, _)| key.as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn integer_out_of_range_is_rejected() {
        let err = u8::from_value(Value::Int(300)).unwrap_err();
        assert!(matches!(err, Error::Conversion { expected: "u8", .. }));
    }

    #[test]
    fn wrong_shape_reports_found_kind() {
        let err = String::from_value(Value::Int(1)).unwrap_err();
        assert!(matches!(
            err,
            Error::Conversion {
                expected: "string",
                found: "int"
            }
        ));
    }

    #[test]
    fn map_declares_two_arguments() {
        let declared = <HashMap<String, Vec<String>>>::annotated_type();
        assert_eq!(declared.arguments().len(), 2);
        assert_eq!(declared.arguments()[1].arguments().len(), 1);
    }
}
