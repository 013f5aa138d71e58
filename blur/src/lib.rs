//! Annotation-driven redaction of values crossing method boundaries.
//!
//! Declared types carry redaction annotations at any position: the type
//! itself, its type arguments, array components, wildcard and type-variable
//! bounds. The engine walks a runtime value alongside its declared
//! [`AnnotatedType`] and masks every position an annotation asks for, keeping
//! the shape of containers, envelopes and user objects.
//!
//! This crate separates:
//! - **Annotations**: what kind of sensitive data a position holds (`Email`,
//!   `PhoneNumber`, `Name`, ...) and the `Cascade` marker.
//! - **Annotation handlers**: how a value under an annotation is rewritten.
//! - **Type parsers**: how the traversal reaches sub-positions of containers,
//!   envelopes and objects.
//!
//! What this crate does:
//! - decides through the presence probe whether a declaration needs any work
//! - applies handlers and parsers in a deterministic order
//! - redacts arguments and return values of intercepted invocations
//!
//! What it does not do:
//! - generate proxies or weave interception into existing code
//! - perform I/O
//!
//! `#[derive(Reflect)]` lives in `blur-derive` and is re-exported from this
//! crate behind the default `derive` feature.
//!
//! ```rust
//! use blur::{AnnotatedType, Blur, Email, Value};
//!
//! let blur = Blur::new();
//! let declared = AnnotatedType::parameterized(
//!     "Vec",
//!     vec![AnnotatedType::class("String").with::<Email>()],
//! );
//! let emails = Value::List(vec![Value::from("123456@qq.com")]);
//! let redacted = blur.redact(emails, &declared).unwrap();
//! assert_eq!(redacted, Value::List(vec![Value::from("1*****@qq.com")]));
//! ```

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::option_if_let_else,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[cfg(feature = "derive")]
pub use blur_derive::Reflect;

#[allow(unused_extern_crates)]
extern crate self as blur;

pub mod annotation;
pub mod config;
pub mod engine;
pub mod error;
pub mod handler;
pub mod intercept;
#[cfg(feature = "json")]
pub mod json;
pub mod parser;
pub mod policy;
#[cfg(feature = "slog")]
pub mod slog;
pub mod types;
pub mod value;

pub use annotation::{
    Annotate, Annotation, AnnotationKind, AnnotationKinds, BankCard, Cascade, Email, IdCard,
    Marker, Name, Parse, Password, PhoneNumber,
};
pub use config::BlurProperties;
pub use engine::{Blur, BlurBuilder, Traversal};
pub use error::{BoxError, Error, Result};
pub use handler::{AnnotationHandler, AnnotationHandlers, PolicyHandler};
pub use intercept::{
    Advisor, BlurInterceptor, Invocation, Method, MethodInvocation, Parameter, Pointcut,
};
#[cfg(feature = "json")]
pub use json::RedactedJson;
pub use parser::{TypeParser, TypeParsers, next_order};
pub use policy::{MASK_CHAR, REDACTED_PLACEHOLDER, TextRedactionPolicy};
pub use types::{
    AnnotatedArray, AnnotatedClass, AnnotatedParameterized, AnnotatedType, AnnotatedTypeVariable,
    AnnotatedWildcard,
};
pub use value::{
    Class, ClassBuilder, Describe, Field, FieldKind, FromValue, IntoValue, Object, ObjectRef,
    Reflect, Value,
};
