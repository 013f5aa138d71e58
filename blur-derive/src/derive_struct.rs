//! Struct-specific `Reflect` derivation.
//!
//! Generates the declared class (field names plus annotated types), the
//! conversions in and out of `Value`, and collects the type parameters that
//! need bounds.

use proc_macro2::{Ident, TokenStream};
use quote::{quote, quote_spanned};
use syn::{DataStruct, Fields, LitStr, Result, spanned::Spanned};

use crate::{
    crate_path,
    generics::collect_generics_from_type,
    strategy::{AnnotationSpec, Position, parse_field_annotations},
};

pub(crate) struct DeriveOutput {
    /// Expression building the `Arc<Class>`.
    pub(crate) class_body: TokenStream,
    pub(crate) into_value_body: TokenStream,
    pub(crate) from_value_body: TokenStream,
    pub(crate) used_generics: Vec<Ident>,
}

fn annotation_expr(spec: &AnnotationSpec) -> TokenStream {
    let annotate = crate_path("Annotate");
    let marker = &spec.marker;
    let attributes = spec.attributes.iter().map(|(key, value)| {
        quote! { .with_attribute(#key, #value) }
    });
    quote_spanned! { marker.span() =>
        <#marker as #annotate>::annotation() #(#attributes)*
    }
}

/// Strips `Option<T>` (transparent at runtime) and grouping from `ty`.
fn described_type(ty: &syn::Type) -> &syn::Type {
    match ty {
        syn::Type::Group(group) => described_type(&group.elem),
        syn::Type::Paren(paren) => described_type(&paren.elem),
        syn::Type::Path(path) if path.qself.is_none() => {
            let Some(last) = path.path.segments.last() else {
                return ty;
            };
            match type_arguments(last).as_slice() {
                [inner] if last.ident == "Option" => described_type(inner),
                _ => ty,
            }
        }
        _ => ty,
    }
}

fn type_arguments(segment: &syn::PathSegment) -> Vec<&syn::Type> {
    let syn::PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return Vec::new();
    };
    arguments
        .args
        .iter()
        .filter_map(|argument| match argument {
            syn::GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
        .collect()
}

/// Rejects positioned annotations whose position the field's type visibly
/// lacks. Type parameters, qualified paths and other shapes are left to the
/// check in the generated code.
fn check_position(ty: &syn::Type, spec: &AnnotationSpec, generics: &syn::Generics) -> Result<()> {
    let index = match spec.position {
        Position::Direct => return Ok(()),
        Position::Element => 0,
        Position::Argument(index) => index,
    };
    let ty = described_type(ty);
    let missing = match ty {
        syn::Type::Array(_) => spec.position != Position::Element,
        syn::Type::Path(path) if path.qself.is_none() => match path.path.segments.last() {
            Some(last) => {
                let is_type_param = path.path.segments.len() == 1
                    && generics.type_params().any(|param| param.ident == last.ident);
                !is_type_param && index >= type_arguments(last).len()
            }
            None => false,
        },
        _ => false,
    };
    if missing {
        let found = quote!(#ty).to_string().replace(' ', "");
        return Err(syn::Error::new(
            ty.span(),
            format!(
                "`{}` needs a type argument at position {index}, but `{found}` has none there",
                spec.describe()
            ),
        ));
    }
    Ok(())
}

fn declared_type(
    ty: &syn::Type,
    specs: &[AnnotationSpec],
    class_name: &LitStr,
    field_name: &str,
) -> TokenStream {
    let describe = crate_path("Describe");
    if specs.is_empty() {
        return quote! { <#ty as #describe>::annotated_type() };
    }
    let statements = specs.iter().map(|spec| {
        let annotation = annotation_expr(spec);
        let attached = match spec.position {
            Position::Direct => return quote! { declared.annotate(#annotation); },
            Position::Element => quote! { declared.annotate_element(#annotation) },
            Position::Argument(index) => {
                quote! { declared.annotate_argument(#index, #annotation) }
            }
        };
        let context = format!(
            "#[blur({})] on field `{field_name}` of `{}`",
            spec.describe(),
            class_name.value()
        );
        quote! {
            if !#attached {
                ::std::panic!("{}: `{}` has no such type argument", #context, declared);
            }
        }
    });
    quote! {
        {
            let mut declared = <#ty as #describe>::annotated_type();
            #(#statements)*
            declared
        }
    }
}

pub(crate) fn derive_struct(
    class_name: &LitStr,
    data: DataStruct,
    generics: &syn::Generics,
) -> Result<DeriveOutput> {
    let Fields::Named(fields) = data.fields else {
        return Err(syn::Error::new(
            data.struct_token.span(),
            "`Reflect` can only be derived for structs with named fields",
        ));
    };

    let class = crate_path("Class");
    let object = crate_path("Object");
    let object_ref = crate_path("ObjectRef");
    let value = crate_path("Value");
    let into_value = crate_path("IntoValue");
    let from_value = crate_path("FromValue");
    let reflect = crate_path("Reflect");

    let mut declarations = Vec::new();
    let mut conversions = Vec::new();
    let mut extractions = Vec::new();
    let mut used_generics = Vec::new();

    for field in fields.named {
        let span = field.span();
        let specs = parse_field_annotations(&field.attrs)?;
        let Some(ident) = field.ident else {
            return Err(syn::Error::new(span, "named field should have an identifier"));
        };
        let ty = &field.ty;
        let field_name = ident.to_string();
        let field_name = field_name.trim_start_matches("r#");
        collect_generics_from_type(ty, generics, &mut used_generics);
        for spec in &specs {
            check_position(ty, spec, generics)?;
        }

        let declared = declared_type(ty, &specs, class_name, field_name);
        declarations.push(quote_spanned! { span => .field(#field_name, #declared) });
        conversions.push(quote_spanned! { span => #into_value::into_value(self.#ident) });
        extractions.push(quote_spanned! { span =>
            #ident: #from_value::from_value(object.field(#field_name))?
        });
    }

    Ok(DeriveOutput {
        class_body: quote! {
            #class::builder(#class_name)
                #(#declarations)*
                .build()
        },
        into_value_body: quote! {
            let class = <Self as #reflect>::class();
            #value::Object(#object::from_parts(class, ::std::vec![#(#conversions),*]).into_ref())
        },
        from_value_body: quote! {
            let object = <#object_ref as #from_value>::from_value(value)?;
            ::std::result::Result::Ok(Self { #(#extractions),* })
        },
        used_generics,
    })
}
