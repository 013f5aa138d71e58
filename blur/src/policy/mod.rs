//! Masking rules used by the built-in annotation handlers.
//!
//! [`TextRedactionPolicy`] is public so custom handlers can reuse the same
//! rules; see [`crate::PolicyHandler`].

pub mod text;

pub use text::{MASK_CHAR, REDACTED_PLACEHOLDER, TextRedactionPolicy};
