//! Text masking rules for string values.
//!
//! Rules are pure string transformations over Unicode scalar values. They do
//! not know about annotations or traversal; the built-in annotation handlers
//! pick a rule and apply it to every string under the annotation.

use std::borrow::Cow;

/// Placeholder used by [`TextRedactionPolicy::full`].
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

/// Default masking character.
pub const MASK_CHAR: char = '*';

#[derive(Clone, Debug, PartialEq, Eq)]
enum Rule {
    /// Keep `prefix` leading and `suffix` trailing characters, mask the middle.
    Keep { prefix: usize, suffix: usize },
    /// Mask `prefix` leading and `suffix` trailing characters, keep the middle.
    Mask { prefix: usize, suffix: usize },
    /// Keep `prefix` characters of the local part and the whole domain.
    Email { prefix: usize },
    /// Replace the whole value.
    Replace(Cow<'static, str>),
}

/// A masking rule plus the character it masks with.
///
/// ```rust
/// use blur::TextRedactionPolicy;
///
/// let phone = TextRedactionPolicy::keep_both(3, 4);
/// assert_eq!(phone.apply_to("12345678910"), "123****8910");
///
/// let email = TextRedactionPolicy::email_local(1).with_mask_char('#');
/// assert_eq!(email.apply_to("123456@qq.com"), "1#####@qq.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRedactionPolicy {
    rule: Rule,
    mask_char: char,
}

impl TextRedactionPolicy {
    fn from_rule(rule: Rule) -> Self {
        Self {
            rule,
            mask_char: MASK_CHAR,
        }
    }

    #[must_use]
    pub fn keep_first(prefix: usize) -> Self {
        Self::keep_both(prefix, 0)
    }

    #[must_use]
    pub fn keep_last(suffix: usize) -> Self {
        Self::keep_both(0, suffix)
    }

    /// Keeps both ends visible. When the kept spans cover the whole value it
    /// is returned unchanged.
    #[must_use]
    pub fn keep_both(prefix: usize, suffix: usize) -> Self {
        Self::from_rule(Rule::Keep { prefix, suffix })
    }

    #[must_use]
    pub fn mask_first(prefix: usize) -> Self {
        Self::mask_both(prefix, 0)
    }

    #[must_use]
    pub fn mask_last(suffix: usize) -> Self {
        Self::mask_both(0, suffix)
    }

    /// Masks both ends. When the masked spans cover the whole value every
    /// character is masked.
    #[must_use]
    pub fn mask_both(prefix: usize, suffix: usize) -> Self {
        Self::from_rule(Rule::Mask { prefix, suffix })
    }

    /// Masks every character, keeping the length.
    #[must_use]
    pub fn mask_all() -> Self {
        Self::keep_both(0, 0)
    }

    /// Keeps `prefix` characters of the local part and the full domain. Input
    /// without `@` is treated as a bare local part.
    #[must_use]
    pub fn email_local(prefix: usize) -> Self {
        Self::from_rule(Rule::Email { prefix })
    }

    /// Replaces the value with [`REDACTED_PLACEHOLDER`].
    #[must_use]
    pub fn full() -> Self {
        Self::replace(REDACTED_PLACEHOLDER)
    }

    #[must_use]
    pub fn replace(placeholder: impl Into<Cow<'static, str>>) -> Self {
        Self::from_rule(Rule::Replace(placeholder.into()))
    }

    /// Uses `mask_char` instead of [`MASK_CHAR`]. Has no effect on
    /// replacement rules.
    #[must_use]
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    pub fn mask_char(&self) -> char {
        self.mask_char
    }

    /// Applies the rule. Empty input stays empty unless the rule replaces it.
    #[must_use]
    pub fn apply_to(&self, value: &str) -> String {
        match &self.rule {
            Rule::Replace(placeholder) => placeholder.clone().into_owned(),
            _ if value.is_empty() => String::new(),
            Rule::Keep { prefix, suffix } => self.keep(value, *prefix, *suffix),
            Rule::Mask { prefix, suffix } => self.mask(value, *prefix, *suffix),
            Rule::Email { prefix } => match value.split_once('@') {
                Some((local, domain)) => {
                    format!("{}@{domain}", self.keep(local, *prefix, 0))
                }
                None => self.keep(value, *prefix, 0),
            },
        }
    }

    fn keep(&self, value: &str, prefix: usize, suffix: usize) -> String {
        let total = value.chars().count();
        if prefix.saturating_add(suffix) >= total {
            return value.to_owned();
        }
        value
            .chars()
            .enumerate()
            .map(|(index, ch)| {
                if index < prefix || index >= total - suffix {
                    ch
                } else {
                    self.mask_char
                }
            })
            .collect()
    }

    fn mask(&self, value: &str, prefix: usize, suffix: usize) -> String {
        let total = value.chars().count();
        if prefix.saturating_add(suffix) >= total {
            return std::iter::repeat_n(self.mask_char, total).collect();
        }
        value
            .chars()
            .enumerate()
            .map(|(index, ch)| {
                if index < prefix || index >= total - suffix {
                    self.mask_char
                } else {
                    ch
                }
            })
            .collect()
    }
}

impl Default for TextRedactionPolicy {
    fn default() -> Self {
        Self::mask_all()
    }
}
