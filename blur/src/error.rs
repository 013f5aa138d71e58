//! Errors raised while redacting, parsing declarations, or intercepting calls.
//!
//! Declared/actual shape mismatches are deliberately absent: a position whose
//! runtime value does not fit its annotated type passes through unchanged.

/// Boxed error produced by annotation handlers and intercepted methods.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A redaction annotation names a handler that was never registered.
    #[error("no handler `{handler}` registered for redaction annotation @{annotation}")]
    MissingHandler { annotation: String, handler: String },

    /// An annotation handler failed; the handler's own error is passed through.
    #[error(transparent)]
    Handler(BoxError),

    /// The intercepted method failed; its error is passed through.
    #[error(transparent)]
    Proceed(BoxError),

    /// Annotated-type or pointcut text could not be parsed.
    #[error("syntax error at offset {position}: {message}")]
    Syntax { position: usize, message: String },

    /// Configuration text could not be read.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A dynamic value did not have the shape a typed conversion expected.
    #[error("cannot convert {found} value into {expected}")]
    Conversion {
        expected: &'static str,
        found: &'static str,
    },
}

impl Error {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }
}
