//! Parsing of `#[blur(...)]` container and field attributes.
//!
//! Field attributes list annotation marker types and where they attach:
//!
//! | Attribute                          | Position                               |
//! |------------------------------------|----------------------------------------|
//! | `#[blur(Email)]`                   | the field's declared type              |
//! | `#[blur(Name(mask_char = "#"))]`   | the field's type, with attributes      |
//! | `#[blur(each(Email))]`             | first type argument or array component |
//! | `#[blur(key(Name), value(Cascade))]` | first and second type arguments      |
//!
//! The only container attribute is `#[blur(class = "Name")]`, which sets the
//! class name the runtime sees.

use syn::{Attribute, LitStr, Result, meta::ParseNestedMeta, spanned::Spanned, token};

/// Where an annotation attaches within the field's declared type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Position {
    /// The field's declared type itself.
    Direct,
    /// The first type argument, or the component of an array.
    Element,
    /// The type argument at this index.
    Argument(usize),
}

impl Position {
    /// The attribute that selects this position, for diagnostics.
    pub(crate) fn attribute(self) -> &'static str {
        match self {
            Position::Direct => "",
            Position::Element => "each",
            Position::Argument(0) => "key",
            Position::Argument(_) => "value",
        }
    }
}

/// One annotation written on a field: the marker type path plus attributes.
#[derive(Clone, Debug)]
pub(crate) struct AnnotationSpec {
    pub(crate) position: Position,
    pub(crate) marker: syn::Path,
    pub(crate) attributes: Vec<(String, LitStr)>,
}

impl AnnotationSpec {
    /// How the annotation was written, e.g. `each(Email)`.
    pub(crate) fn describe(&self) -> String {
        let marker = self
            .marker
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect::<Vec<_>>()
            .join("::");
        match self.position {
            Position::Direct => marker,
            position => format!("{}({marker})", position.attribute()),
        }
    }
}

/// Options read from `#[blur(...)]` on the struct itself.
#[derive(Clone, Debug, Default)]
pub(crate) struct ContainerOptions {
    pub(crate) class: Option<LitStr>,
}

fn parse_annotation(meta: &ParseNestedMeta<'_>, position: Position) -> Result<AnnotationSpec> {
    let mut attributes = Vec::new();
    if meta.input.peek(token::Paren) {
        meta.parse_nested_meta(|attribute| {
            let Some(key) = attribute.path.get_ident() else {
                return Err(attribute.error("expected an attribute name such as `mask_char`"));
            };
            let key = key.to_string();
            let value: LitStr = attribute.value()?.parse()?;
            attributes.push((key, value));
            Ok(())
        })?;
    } else if meta.input.peek(syn::Token![=]) {
        return Err(meta.error("expected an annotation marker type, e.g. #[blur(Email)]"));
    }
    Ok(AnnotationSpec {
        position,
        marker: meta.path.clone(),
        attributes,
    })
}

fn parse_positioned(
    meta: &ParseNestedMeta<'_>,
    position: Position,
    specs: &mut Vec<AnnotationSpec>,
) -> Result<()> {
    if !meta.input.peek(token::Paren) {
        return Err(meta.error("expected a list of annotations, e.g. each(Email)"));
    }
    meta.parse_nested_meta(|inner| {
        specs.push(parse_annotation(&inner, position)?);
        Ok(())
    })
}

/// Reads every `#[blur(...)]` attribute of a field, in declaration order.
pub(crate) fn parse_field_annotations(attrs: &[Attribute]) -> Result<Vec<AnnotationSpec>> {
    let mut specs = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("blur") {
            continue;
        }
        if !matches!(attr.meta, syn::Meta::List(_)) {
            return Err(syn::Error::new(
                attr.span(),
                "expected #[blur(Annotation)] syntax (e.g., #[blur(Email)], #[blur(each(Name))])",
            ));
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("each") {
                parse_positioned(&meta, Position::Element, &mut specs)
            } else if meta.path.is_ident("key") {
                parse_positioned(&meta, Position::Argument(0), &mut specs)
            } else if meta.path.is_ident("value") {
                parse_positioned(&meta, Position::Argument(1), &mut specs)
            } else {
                specs.push(parse_annotation(&meta, Position::Direct)?);
                Ok(())
            }
        })?;
    }
    Ok(specs)
}

/// Reads `#[blur(class = "...")]` from the struct's attributes.
pub(crate) fn parse_container_options(attrs: &[Attribute]) -> Result<ContainerOptions> {
    let mut options = ContainerOptions::default();
    for attr in attrs {
        if !attr.path().is_ident("blur") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("class") {
                if options.class.is_some() {
                    return Err(meta.error("duplicate `class` option"));
                }
                options.class = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown container option, expected `class = \"...\"`"))
            }
        })?;
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::*;

    fn parse_attrs(tokens: proc_macro2::TokenStream) -> Vec<Attribute> {
        let input: DeriveInput = syn::parse2(quote! {
            #tokens
            struct Dummy;
        })
        .expect("should parse as DeriveInput");
        input.attrs
    }

    #[test]
    fn no_attribute_yields_no_annotations() {
        let attrs = parse_attrs(quote! {});
        assert!(parse_field_annotations(&attrs).unwrap().is_empty());
    }

    #[test]
    fn direct_annotations_keep_order() {
        let attrs = parse_attrs(quote! {
            #[blur(PhoneNumber, Email)]
            #[blur(blur::Cascade)]
        });
        let specs = parse_field_annotations(&attrs).unwrap();
        assert_eq!(specs.len(), 3);
        assert!(specs.iter().all(|spec| spec.position == Position::Direct));
        assert!(specs[0].marker.is_ident("PhoneNumber"));
        assert!(specs[1].marker.is_ident("Email"));
        assert_eq!(specs[2].marker.segments.len(), 2);
    }

    #[test]
    fn attributes_are_read() {
        let attrs = parse_attrs(quote! { #[blur(Name(mask_char = "#"))] });
        let specs = parse_field_annotations(&attrs).unwrap();
        assert_eq!(specs[0].attributes.len(), 1);
        assert_eq!(specs[0].attributes[0].0, "mask_char");
        assert_eq!(specs[0].attributes[0].1.value(), "#");
    }

    #[test]
    fn positioned_annotations() {
        let attrs =
            parse_attrs(quote! { #[blur(each(Email), key(Name), value(Cascade, Password))] });
        let specs = parse_field_annotations(&attrs).unwrap();
        let positions: Vec<_> = specs.iter().map(|spec| spec.position).collect();
        assert_eq!(
            positions,
            [
                Position::Element,
                Position::Argument(0),
                Position::Argument(1),
                Position::Argument(1)
            ]
        );
    }

    #[test]
    fn bare_blur_errors() {
        let attrs = parse_attrs(quote! { #[blur] });
        let err = parse_field_annotations(&attrs).unwrap_err();
        assert!(err.to_string().contains("#[blur(Annotation)]"));
    }

    #[test]
    fn name_value_annotation_errors() {
        let attrs = parse_attrs(quote! { #[blur(Email = "x")] });
        let err = parse_field_annotations(&attrs).unwrap_err();
        assert!(err.to_string().contains("marker type"));
    }

    #[test]
    fn each_without_list_errors() {
        let attrs = parse_attrs(quote! { #[blur(each)] });
        let err = parse_field_annotations(&attrs).unwrap_err();
        assert!(err.to_string().contains("list of annotations"));
    }

    #[test]
    fn non_string_attribute_errors() {
        let attrs = parse_attrs(quote! { #[blur(Name(mask_char = 1))] });
        assert!(parse_field_annotations(&attrs).is_err());
    }

    #[test]
    fn other_attributes_ignored() {
        let attrs = parse_attrs(quote! {
            #[derive(Clone)]
            #[serde(skip)]
        });
        assert!(parse_field_annotations(&attrs).unwrap().is_empty());
    }

    #[test]
    fn container_class_option() {
        let attrs = parse_attrs(quote! { #[blur(class = "ResponseEntity")] });
        let options = parse_container_options(&attrs).unwrap();
        assert_eq!(options.class.unwrap().value(), "ResponseEntity");
    }

    #[test]
    fn unknown_container_option_errors() {
        let attrs = parse_attrs(quote! { #[blur(rename = "X")] });
        let err = parse_container_options(&attrs).unwrap_err();
        assert!(err.to_string().contains("unknown container option"));
    }
}
