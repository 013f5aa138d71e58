//! Property tests for the traversal driver.
//!
//! These tests verify that:
//! - declarations without redaction annotations leave values untouched
//! - containers keep their size, key order and component length
//! - redaction with the built-in handlers is idempotent
//! - redacting an annotated position leaves its unannotated siblings untouched
//! - an envelope is its payload redacted, with every other field unchanged

use std::sync::Arc;

use blur::{AnnotatedType, Blur, Cascade, Class, Email, Name, Object, PhoneNumber, Value};
use proptest::prelude::*;

fn arb_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9@._-]{0,24}").expect("valid regex")
}

fn arb_email() -> impl Strategy<Value = String> {
    ("[a-z0-9]{1,12}", "[a-z]{1,8}").prop_map(|(local, domain)| format!("{local}@{domain}.com"))
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        arb_text().prop_map(Value::Str),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Set),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec((arb_scalar(), inner), 0..4).prop_map(Value::Map),
        ]
    })
}

/// Declarations that mention no redaction annotation and no cascade marker.
fn arb_plain_type() -> impl Strategy<Value = AnnotatedType> {
    let leaf = prop_oneof![
        Just(AnnotatedType::class("String")),
        Just(AnnotatedType::class("Person")),
        Just(AnnotatedType::wildcard()),
        Just(AnnotatedType::type_variable("T", Vec::new())),
    ];
    leaf.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|element| AnnotatedType::parameterized("List", vec![element])),
            inner.clone().prop_map(|element| AnnotatedType::parameterized("Set", vec![element])),
            (inner.clone(), inner.clone())
                .prop_map(|(key, value)| AnnotatedType::parameterized("Map", vec![key, value])),
            inner.clone().prop_map(AnnotatedType::array),
            inner.prop_map(|bound| AnnotatedType::wildcard_extends(vec![bound])),
        ]
    })
}

fn email() -> AnnotatedType {
    AnnotatedType::class("String").with::<Email>()
}

fn person_class() -> Arc<Class> {
    Class::builder("Person")
        .field(
            "phone_number",
            AnnotatedType::class("String").with::<PhoneNumber>(),
        )
        .field("email", email())
        .build()
}

fn envelope_class() -> Arc<Class> {
    Class::builder("Envelope")
        .field("code", AnnotatedType::class("String"))
        .field("message", AnnotatedType::class("String"))
        .field("payload", AnnotatedType::type_variable("T", Vec::new()))
        .build()
}

proptest! {
    #[test]
    fn unannotated_declarations_pass_values_through(
        value in arb_value(),
        declared in arb_plain_type(),
    ) {
        let blur = Blur::new();
        prop_assert!(!blur.requires_redaction(&declared));
        prop_assert_eq!(blur.redact(value.clone(), &declared).unwrap(), value);
    }

    #[test]
    fn lists_and_sets_keep_their_size(emails in prop::collection::vec(arb_email(), 0..16)) {
        let blur = Blur::new();
        let items: Vec<Value> = emails.iter().cloned().map(Value::from).collect();
        for (container, raw) in [
            (Value::List(items.clone()), "List"),
            (Value::Set(items.clone()), "Set"),
        ] {
            let declared = AnnotatedType::parameterized(raw, vec![email()]);
            let redacted = blur.redact(container, &declared).unwrap();
            prop_assert_eq!(redacted.size(), Some(emails.len()));
        }
    }

    #[test]
    fn arrays_keep_their_length(emails in prop::collection::vec(arb_email(), 0..16)) {
        let blur = Blur::new();
        let array = Value::Array(emails.iter().cloned().map(Value::from).collect());
        let redacted = blur.redact(array, &AnnotatedType::array(email())).unwrap();
        prop_assert!(matches!(redacted, Value::Array(ref items) if items.len() == emails.len()));
    }

    #[test]
    fn maps_keep_key_order(entries in prop::collection::vec((arb_text(), arb_email()), 0..12)) {
        let blur = Blur::new();
        let declared = AnnotatedType::parameterized(
            "Map",
            vec![AnnotatedType::class("String"), email()],
        );
        let map = Value::Map(
            entries
                .iter()
                .map(|(key, value)| (Value::from(key.as_str()), Value::from(value.as_str())))
                .collect(),
        );

        let redacted = blur.redact(map, &declared).unwrap();

        let keys: Vec<_> = redacted
            .as_entries()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect();
        let expected: Vec<_> = entries.iter().map(|(key, _)| Value::from(key.as_str())).collect();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn unannotated_siblings_are_untouched(
        address in arb_email(),
        note in arb_text(),
        extra in arb_value(),
        aliases in prop::collection::vec(arb_text(), 0..4),
    ) {
        let blur = Blur::new();
        let class = Class::builder("Profile")
            .field("email", email())
            .field("note", AnnotatedType::class("String"))
            .field("extra", AnnotatedType::class("Object"))
            .field(
                "aliases",
                AnnotatedType::parameterized("List", vec![AnnotatedType::class("String")]),
            )
            .build();
        let alias_list = Value::List(aliases.into_iter().map(Value::from).collect());
        let profile = Object::new(class)
            .with("email", address.as_str())
            .with("note", note.as_str())
            .with("extra", extra.clone())
            .with("aliases", alias_list.clone())
            .into_ref();
        let declared = AnnotatedType::class("Profile").with::<Cascade>();

        let redacted = blur.redact(Value::Object(profile), &declared).unwrap();

        let (local, domain) = address.split_once('@').unwrap();
        let masked = format!("{}{}@{domain}", &local[..1], "*".repeat(local.len() - 1));
        let redacted = redacted.as_object().unwrap();
        prop_assert_eq!(redacted.field("email"), Value::from(masked));
        prop_assert_eq!(redacted.field("note"), Value::from(note));
        prop_assert_eq!(redacted.field("extra"), extra);
        prop_assert_eq!(redacted.field("aliases"), alias_list);
    }

    #[test]
    fn builtin_redaction_is_idempotent(
        names in prop::collection::vec(arb_text(), 0..8),
        emails in prop::collection::vec(arb_email(), 0..8),
    ) {
        let blur = Blur::new();
        let declared = AnnotatedType::parameterized(
            "Map",
            vec![
                AnnotatedType::class("String").with::<Name>(),
                AnnotatedType::parameterized("List", vec![email()]),
            ],
        );
        let map = Value::Map(
            names
                .into_iter()
                .map(|name| {
                    let list = Value::List(emails.iter().cloned().map(Value::from).collect());
                    (Value::from(name), list)
                })
                .collect(),
        );

        let once = blur.redact(map, &declared).unwrap();
        let twice = blur.redact(once.clone(), &declared).unwrap();
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn envelope_is_its_redacted_payload(
        code in arb_text(),
        message in arb_text(),
        phone in "[0-9]{11}",
        address in arb_email(),
    ) {
        let blur = Blur::builder().envelope("Envelope", "payload").build();
        let payload_type = AnnotatedType::class("Person").with::<Cascade>();
        let declared = AnnotatedType::parameterized("Envelope", vec![payload_type.clone()]);
        let person = || {
            Object::new(person_class())
                .with("phone_number", phone.as_str())
                .with("email", address.as_str())
                .into_ref()
        };
        let envelope = Object::new(envelope_class())
            .with("code", code.as_str())
            .with("message", message.as_str())
            .with("payload", person())
            .into_ref();

        let redacted = blur.redact(Value::Object(envelope), &declared).unwrap();
        let expected_payload = blur.redact(Value::Object(person()), &payload_type).unwrap();

        let redacted = redacted.as_object().unwrap();
        prop_assert_eq!(redacted.field("code"), Value::from(code));
        prop_assert_eq!(redacted.field("message"), Value::from(message));
        prop_assert_eq!(redacted.field("payload"), expected_payload);
    }
}
