//! Declaration-text parser for [`AnnotatedType`].
//!
//! Grammar (whitespace between tokens is ignored):
//!
//! ```text
//! type        := annotation* base dimension*
//! base        := wildcard | path arguments?
//! wildcard    := '?' (('extends' | 'super') type ('&' type)*)?
//! arguments   := '<' type (',' type)* '>'
//! dimension   := annotation* '[' ']'
//! annotation  := '@' ident ('(' ident '=' string (',' ident '=' string)* ')')?
//! path        := ident (('::' | '.') ident)*
//! ```
//!
//! Annotations before the base attach to the base, which is the array element
//! when dimensions follow. Annotations before a `[]` attach to that dimension,
//! and the first dimension is the outermost array.

use super::AnnotatedType;
use crate::{
    annotation::{Annotation, AnnotationKinds},
    error::{Error, Result},
};

impl AnnotatedType {
    /// Parses declaration text, resolving annotation names through `kinds`.
    ///
    /// ```rust
    /// use blur::{AnnotatedType, AnnotationKinds};
    ///
    /// let kinds = AnnotationKinds::builtin();
    /// let declared = AnnotatedType::parse("Map<@Name String, @Cascade Person>", &kinds).unwrap();
    /// assert_eq!(declared.arguments().len(), 2);
    /// assert!(declared.requires_redaction());
    /// ```
    pub fn parse(src: &str, kinds: &AnnotationKinds) -> Result<Self> {
        let mut parser = Parser {
            src,
            pos: 0,
            kinds,
        };
        let ty = parser.parse_type()?;
        parser.skip_whitespace();
        if parser.pos < src.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    kinds: &'a AnnotationKinds,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> Error {
        Error::syntax(self.pos, message)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Consumes `token` after optional whitespace.
    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{token}`")))
        }
    }

    /// Consumes the keyword `word` only when it is not a prefix of a longer
    /// identifier.
    fn eat_keyword(&mut self, word: &str) -> bool {
        self.skip_whitespace();
        let rest = self.rest();
        let Some(after) = rest.strip_prefix(word) else {
            return false;
        };
        if after.chars().next().is_none_or(|ch| !is_ident_char(ch)) {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<&'a str> {
        self.skip_whitespace();
        let start = self.pos;
        let rest = self.rest();
        match rest.chars().next() {
            Some(ch) if ch.is_alphabetic() || ch == '_' => {}
            _ => return Err(self.error("expected identifier")),
        }
        let len = rest
            .char_indices()
            .find(|(_, ch)| !is_ident_char(*ch))
            .map_or(rest.len(), |(index, _)| index);
        self.pos += len;
        Ok(&self.src[start..self.pos])
    }

    fn path(&mut self) -> Result<String> {
        let mut path = self.ident()?.to_owned();
        loop {
            let separator = if self.eat("::") {
                "::"
            } else if self.eat(".") {
                "."
            } else {
                return Ok(path);
            };
            path.push_str(separator);
            path.push_str(self.ident()?);
        }
    }

    fn string(&mut self) -> Result<String> {
        self.expect("\"")?;
        let mut value = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((index, ch)) = chars.next() {
            match ch {
                '"' => {
                    self.pos += index + 1;
                    return Ok(value);
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                _ => value.push(ch),
            }
        }
        Err(self.error("unterminated string"))
    }

    fn annotations(&mut self) -> Result<Vec<Annotation>> {
        let mut annotations = Vec::new();
        loop {
            self.skip_whitespace();
            let start = self.pos;
            if !self.eat("@") {
                return Ok(annotations);
            }
            let name = self.ident()?;
            let Some(kind) = self.kinds.get(name) else {
                return Err(Error::syntax(start, format!("unknown annotation `@{name}`")));
            };
            let mut annotation = Annotation::new(kind.clone());
            if self.eat("(") && !self.eat(")") {
                loop {
                    let key = self.ident()?.to_owned();
                    self.expect("=")?;
                    let value = self.string()?;
                    annotation = annotation.with_attribute(key, value);
                    if self.eat(")") {
                        break;
                    }
                    self.expect(",")?;
                }
            }
            annotations.push(annotation);
        }
    }

    fn parse_type(&mut self) -> Result<AnnotatedType> {
        let annotations = self.annotations()?;
        let mut ty = self.base()?;
        for annotation in annotations {
            ty.annotate(annotation);
        }

        let mut dims = Vec::new();
        loop {
            let checkpoint = self.pos;
            let annotations = self.annotations()?;
            if self.eat("[") {
                self.expect("]")?;
                dims.push(annotations);
            } else if annotations.is_empty() {
                self.pos = checkpoint;
                break;
            } else {
                return Err(self.error("expected `[` after dimension annotations"));
            }
        }
        // The last dimension is the innermost array.
        for annotations in dims.into_iter().rev() {
            ty = AnnotatedType::array(ty);
            for annotation in annotations {
                ty.annotate(annotation);
            }
        }
        Ok(ty)
    }

    fn base(&mut self) -> Result<AnnotatedType> {
        if self.eat("?") {
            if self.eat_keyword("extends") {
                return Ok(AnnotatedType::wildcard_extends(self.bounds()?));
            }
            if self.eat_keyword("super") {
                return Ok(AnnotatedType::wildcard_super(self.bounds()?));
            }
            return Ok(AnnotatedType::wildcard());
        }

        let path = self.path()?;
        if !self.eat("<") {
            return Ok(AnnotatedType::class(path));
        }
        let mut arguments = vec![self.parse_type()?];
        while self.eat(",") {
            arguments.push(self.parse_type()?);
        }
        self.expect(">")?;
        Ok(AnnotatedType::parameterized(path, arguments))
    }

    fn bounds(&mut self) -> Result<Vec<AnnotatedType>> {
        let mut bounds = vec![self.parse_type()?];
        while self.eat("&") {
            bounds.push(self.parse_type()?);
        }
        Ok(bounds)
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotate, AnnotationKind, Cascade, Email, Name};

    fn parse(src: &str) -> AnnotatedType {
        AnnotatedType::parse(src, &AnnotationKinds::builtin()).unwrap()
    }

    #[test]
    fn parses_annotated_arguments() {
        let declared = parse("Map<@Name String, @Cascade Person>");
        let expected = AnnotatedType::parameterized(
            "Map",
            vec![
                AnnotatedType::class("String").with::<Name>(),
                AnnotatedType::class("Person").with::<Cascade>(),
            ],
        );
        assert_eq!(declared, expected);
    }

    #[test]
    fn leading_annotations_attach_to_the_element() {
        let declared = parse("@Email String[]");
        assert_eq!(
            declared,
            AnnotatedType::array(AnnotatedType::class("String").with::<Email>())
        );
    }

    #[test]
    fn first_dimension_is_outermost() {
        let declared = parse("String @Email [] []");
        assert!(declared.annotations().iter().any(|a| a.kind() == &Email::KIND));
        let inner = declared.component().unwrap();
        assert!(inner.annotations().is_empty());
        assert_eq!(inner.component(), Some(&AnnotatedType::class("String")));
    }

    #[test]
    fn parses_wildcards() {
        let declared = parse("List<? extends @Email String & Serializable>");
        let AnnotatedType::Wildcard(wildcard) = &declared.arguments()[0] else {
            panic!("expected wildcard");
        };
        assert_eq!(wildcard.upper_bounds().len(), 2);
        assert!(wildcard.lower_bounds().is_empty());

        let lower = parse("List<? super Person>");
        assert!(matches!(
            &lower.arguments()[0],
            AnnotatedType::Wildcard(w) if w.lower_bounds().len() == 1
        ));
        assert_eq!(parse("List<?>").arguments()[0], AnnotatedType::wildcard());
    }

    #[test]
    fn keyword_prefix_is_not_a_keyword() {
        let err =
            AnnotatedType::parse("List<? extendsX>", &AnnotationKinds::builtin()).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn parses_attributes_and_paths() {
        let declared = parse("@Name(mask_char = \"#\") std::string::String");
        assert_eq!(declared.name(), Some("std::string::String"));
        assert_eq!(declared.annotations()[0].attribute("mask_char"), Some("#"));
        assert_eq!(parse("java.lang.String").name(), Some("java.lang.String"));
    }

    #[test]
    fn display_round_trips() {
        for src in [
            "Map<@Name String, @Cascade Person>",
            "@Email String[]",
            "String @Email [][]",
            "List<? super @Name(mask_char = \"#\") String>",
        ] {
            assert_eq!(parse(src).to_string(), src);
        }
    }

    #[test]
    fn unknown_annotation_is_a_syntax_error() {
        let err = AnnotatedType::parse("@Secret String", &AnnotationKinds::builtin()).unwrap_err();
        assert!(matches!(err, Error::Syntax { position: 0, .. }));
    }

    #[test]
    fn custom_kinds_are_resolved() {
        let mut kinds = AnnotationKinds::builtin();
        kinds.insert(AnnotationKind::redaction("Iban", "iban"));
        let declared = AnnotatedType::parse("@Iban String", &kinds).unwrap();
        assert!(declared.requires_redaction());
    }

    #[test]
    fn malformed_input_is_rejected() {
        let kinds = AnnotationKinds::builtin();
        for src in ["", "List<String", "String[", "Map<String,>", "String extra", "@Name"] {
            assert!(AnnotatedType::parse(src, &kinds).is_err(), "{src:?} parsed");
        }
    }
}
