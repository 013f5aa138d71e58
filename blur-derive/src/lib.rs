//! Derive macros for `blur`.
//!
//! `#[derive(Reflect)]` describes a struct to the redaction engine. It:
//! - reads `#[blur(...)]` field attributes into annotated field types
//! - emits `Describe`, `Reflect`, `IntoValue` and `FromValue` implementations
//!
//! It does **not** define annotations or handlers. Those live in the main
//! `blur` crate and are resolved at runtime.

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
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, LitStr, Result, parse_macro_input, spanned::Spanned};

mod derive_struct;
mod generics;
mod strategy;
use derive_struct::{DeriveOutput, derive_struct};
use generics::add_value_bounds;
use strategy::parse_container_options;

/// Derives `blur::Reflect` (and the `Describe`, `IntoValue` and `FromValue`
/// impls it requires) for structs with named fields.
///
/// # Container Attributes
///
/// - `#[blur(class = "Name")]` - the class name seen at runtime. Defaults to
///   the struct's identifier. Envelope parsers match on this name.
///
/// # Field Attributes
///
/// - **No annotation**: the field's declared type is `<T as Describe>::annotated_type()`.
///   A field whose type is itself `Reflect` is walked only when annotated with
///   `#[blur(Cascade)]`.
///
/// - `#[blur(Email, Name(mask_char = "#"))]`: annotations on the field's type,
///   applied in the order written. Each name is a type implementing `blur::Annotate`
///   and must be in scope.
///
/// - `#[blur(each(Email))]`: annotations on the first type argument (`Vec<T>`,
///   `HashSet<T>`, a single-argument envelope) or on the component of `[T; N]`.
///
/// - `#[blur(key(Name), value(PhoneNumber))]`: annotations on the first and
///   second type arguments of a map.
///
/// A positioned annotation on a type that visibly lacks the position
/// (`each(..)` on `String`, `value(..)` on `Vec<T>`) is a compile error. When
/// the type is a type parameter, building the class panics instead if the
/// instantiated type lacks the position.
///
/// Generic structs describe themselves as parameterized by the type parameters
/// their fields use, which makes a generic struct usable as an envelope.
/// `PhantomData<T>` fields add no bounds on `T`.
///
/// Enums, unions, tuple structs and unit structs are rejected at compile time.
#[proc_macro_derive(Reflect, attributes(blur))]
pub fn derive_reflect(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    if let Some(lifetime) = generics.lifetimes().next() {
        return Err(syn::Error::new(
            lifetime.span(),
            "`Reflect` cannot be derived for types with lifetime parameters",
        ));
    }

    let options = parse_container_options(&attrs)?;
    let class_name = options
        .class
        .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));

    let DeriveOutput {
        class_body,
        into_value_body,
        from_value_body,
        used_generics,
    } = match data {
        Data::Struct(data) => derive_struct(&class_name, data, &generics)?,
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span(),
                "`Reflect` cannot be derived for enums",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span(),
                "`Reflect` cannot be derived for unions",
            ));
        }
    };

    let bounded = add_value_bounds(generics, &used_generics);
    let (impl_generics, ty_generics, where_clause) = bounded.split_for_impl();

    let annotated_type = crate_path("AnnotatedType");
    let class = crate_path("Class");
    let describe = crate_path("Describe");
    let reflect = crate_path("Reflect");
    let into_value = crate_path("IntoValue");
    let from_value = crate_path("FromValue");
    let value = crate_path("Value");
    let result = crate_path("Result");

    let describe_body = if used_generics.is_empty() {
        quote! { #annotated_type::class(#class_name) }
    } else {
        quote! {
            #annotated_type::parameterized(
                #class_name,
                ::std::vec![#(<#used_generics as #describe>::annotated_type()),*],
            )
        }
    };

    // A static inside a generic fn is shared by every instantiation, so only
    // non-generic classes are cached.
    let class_fn_body = if bounded.type_params().next().is_none() {
        quote! {
            static CLASS: ::std::sync::OnceLock<::std::sync::Arc<#class>> =
                ::std::sync::OnceLock::new();
            ::std::sync::Arc::clone(CLASS.get_or_init(|| #class_body))
        }
    } else {
        class_body
    };

    Ok(quote! {
        impl #impl_generics #describe for #ident #ty_generics #where_clause {
            fn annotated_type() -> #annotated_type {
                #describe_body
            }
        }

        impl #impl_generics #reflect for #ident #ty_generics #where_clause {
            fn class() -> ::std::sync::Arc<#class> {
                #class_fn_body
            }
        }

        impl #impl_generics #into_value for #ident #ty_generics #where_clause {
            fn into_value(self) -> #value {
                #into_value_body
            }
        }

        impl #impl_generics #from_value for #ident #ty_generics #where_clause {
            fn from_value(value: #value) -> #result<Self> {
                #from_value_body
            }
        }
    })
}

/// Returns the token stream to reference the blur crate root.
///
/// Handles crate renaming (e.g., `my_blur = { package = "blur", ... }`).
/// Inside `blur` itself the crate declares `extern crate self as blur`, so the
/// absolute path works for its unit tests, doc tests and integration tests alike.
fn crate_root() -> TokenStream {
    match crate_name("blur") {
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Ok(FoundCrate::Itself) | Err(_) => quote! { ::blur },
    }
}

fn crate_path(item: &str) -> TokenStream {
    let root = crate_root();
    let item = format_ident!("{}", item);
    quote! { #root::#item }
}
