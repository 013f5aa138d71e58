//! Built-in annotation marker types and the masking rules behind them.
//!
//! Each redaction marker names a handler; [`builtin_policies`] supplies the
//! handler for every name so a default `Blur` can resolve them all.

use super::{Annotate, AnnotationKind};
use crate::policy::TextRedactionPolicy;

/// Email addresses: keeps the first character of the local part and the
/// domain (`"123456@qq.com"` → `"1*****@qq.com"`).
#[derive(Clone, Copy, Debug)]
pub struct Email;

impl Annotate for Email {
    const KIND: AnnotationKind = AnnotationKind::redaction("Email", "email");
}

/// Phone numbers: keeps the first 3 and last 4 characters
/// (`"12345678910"` → `"123****8910"`).
#[derive(Clone, Copy, Debug)]
pub struct PhoneNumber;

impl Annotate for PhoneNumber {
    const KIND: AnnotationKind = AnnotationKind::redaction("PhoneNumber", "phone_number");
}

/// Personal names: keeps the first character (`"allurx"` → `"a*****"`).
#[derive(Clone, Copy, Debug)]
pub struct Name;

impl Annotate for Name {
    const KIND: AnnotationKind = AnnotationKind::redaction("Name", "name");
}

/// Passwords: every character masked, length kept.
#[derive(Clone, Copy, Debug)]
pub struct Password;

impl Annotate for Password {
    const KIND: AnnotationKind = AnnotationKind::redaction("Password", "password");
}

/// Bank card numbers: keeps the last 4 digits.
#[derive(Clone, Copy, Debug)]
pub struct BankCard;

impl Annotate for BankCard {
    const KIND: AnnotationKind = AnnotationKind::redaction("BankCard", "bank_card");
}

/// Identity card numbers: keeps the first and the last character.
#[derive(Clone, Copy, Debug)]
pub struct IdCard;

impl Annotate for IdCard {
    const KIND: AnnotationKind = AnnotationKind::redaction("IdCard", "id_card");
}

/// Walk the annotated value's declared fields.
#[derive(Clone, Copy, Debug)]
pub struct Cascade;

impl Annotate for Cascade {
    const KIND: AnnotationKind = AnnotationKind::cascade();
}

/// Handler name and masking rule for every built-in redaction marker.
pub(crate) fn builtin_policies() -> [(&'static str, TextRedactionPolicy); 6] {
    [
        ("email", TextRedactionPolicy::email_local(1)),
        ("phone_number", TextRedactionPolicy::keep_both(3, 4)),
        ("name", TextRedactionPolicy::keep_first(1)),
        ("password", TextRedactionPolicy::mask_all()),
        ("bank_card", TextRedactionPolicy::keep_last(4)),
        ("id_card", TextRedactionPolicy::keep_both(1, 1)),
    ]
}
