//! Generic type parameter handling and trait bound management.
//!
//! Bounds are added only for type parameters that appear in a field's type.
//!
//! ## PhantomData Handling
//!
//! `PhantomData<T>` fields are skipped when collecting generics. They carry no
//! value, so `T` never has to move through the dynamic model:
//!
//! ```ignore
//! #[derive(Reflect)]
//! struct TypedId<T> {
//!     id: String,
//!     _marker: PhantomData<T>,  // T needs no IntoValue/FromValue/Describe
//! }
//! ```

use syn::{Ident, parse_quote};

use crate::crate_path;

fn push_if_generic(ident: &Ident, generics: &syn::Generics, result: &mut Vec<Ident>) {
    if generics.type_params().any(|param| param.ident == *ident)
        && !result.iter().any(|g| g == ident)
    {
        result.push(ident.clone());
    }
}

fn visit_path_arguments(
    args: &syn::PathArguments,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    if let syn::PathArguments::AngleBracketed(args) = args {
        for arg in &args.args {
            match arg {
                syn::GenericArgument::Type(inner_ty) => visit_type(inner_ty, generics, result),
                syn::GenericArgument::AssocType(assoc) => visit_type(&assoc.ty, generics, result),
                _ => {}
            }
        }
    }
}

fn visit_path(path: &syn::Path, generics: &syn::Generics, result: &mut Vec<Ident>) {
    if path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "PhantomData")
    {
        return;
    }

    for segment in &path.segments {
        push_if_generic(&segment.ident, generics, result);
        visit_path_arguments(&segment.arguments, generics, result);
    }
}

fn visit_type(ty: &syn::Type, generics: &syn::Generics, result: &mut Vec<Ident>) {
    match ty {
        syn::Type::Path(type_path) => {
            if let Some(qself) = &type_path.qself {
                visit_type(&qself.ty, generics, result);
            }
            visit_path(&type_path.path, generics, result);
        }
        syn::Type::Array(array) => visit_type(&array.elem, generics, result),
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                visit_type(elem, generics, result);
            }
        }
        syn::Type::Paren(paren) => visit_type(&paren.elem, generics, result),
        syn::Type::Group(group) => visit_type(&group.elem, generics, result),
        _ => {}
    }
}

/// Collects the type parameters used by `ty`, in order of first appearance.
pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    visit_type(ty, generics, result);
}

/// Requires `IntoValue + FromValue + Describe` of every used type parameter.
pub(crate) fn add_value_bounds(mut generics: syn::Generics, used: &[Ident]) -> syn::Generics {
    let into_value = crate_path("IntoValue");
    let from_value = crate_path("FromValue");
    let describe = crate_path("Describe");
    let where_clause = generics.make_where_clause();
    for ident in used {
        where_clause
            .predicates
            .push(parse_quote!(#ident: #into_value + #from_value + #describe));
    }
    generics
}

#[cfg(test)]
mod tests {
    use quote::{ToTokens, quote};
    use syn::DeriveInput;

    use super::*;

    fn collect(tokens: proc_macro2::TokenStream) -> Vec<String> {
        let input: DeriveInput = syn::parse2(tokens).unwrap();
        let syn::Data::Struct(data) = &input.data else {
            panic!("expected a struct");
        };
        let mut used = Vec::new();
        for field in &data.fields {
            collect_generics_from_type(&field.ty, &input.generics, &mut used);
        }
        used.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn phantom_data_is_skipped() {
        let used = collect(quote! {
            struct TypedId<T> {
                id: String,
                _marker: std::marker::PhantomData<T>,
            }
        });
        assert!(used.is_empty());
    }

    #[test]
    fn nested_arguments_are_found_once() {
        let used = collect(quote! {
            struct Page<K, V, X> {
                items: Vec<HashMap<K, Vec<V>>>,
                first: Option<K>,
                fixed: [V; 4],
            }
        });
        assert_eq!(used, ["K", "V"]);
    }

    #[test]
    fn bounds_are_added_per_used_parameter() {
        let generics: syn::Generics = parse_quote!(<T, U>);
        let ident: Ident = parse_quote!(T);
        let bounded = add_value_bounds(generics, &[ident]);
        let where_clause = bounded.where_clause.unwrap().to_token_stream().to_string();
        assert!(where_clause.contains("T :"));
        assert!(where_clause.contains("Describe"));
        assert!(!where_clause.contains("U :"));
    }
}
