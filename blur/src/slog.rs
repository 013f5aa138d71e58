//! Adapters for emitting redacted values through `slog`.
//!
//! [`RedactedJson`] implements `slog::Value` as nested structured JSON, so a
//! value redacted with [`crate::Blur::redact_json`] can be logged directly.
//! Only redacted output reaches the logger; this module never sees the
//! original value.

use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

pub use crate::json::RedactedJson;

/// Marker trait for types whose `slog` integration always emits redacted output.
///
/// ```compile_fail
/// use blur::slog::SlogRedacted;
///
/// fn assert_slog_redacted<T: SlogRedacted>() {}
///
/// assert_slog_redacted::<String>();
/// ```
pub trait SlogRedacted: SlogValue {}

impl<T: SlogRedacted + ?Sized> SlogRedacted for &T {}

impl SlogValue for RedactedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value().clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

impl SlogRedacted for RedactedJson {}
