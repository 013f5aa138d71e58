//! Configuration for the interception glue.
//!
//! Read from a `[blur]` table. Every key is optional so an empty document is
//! a valid configuration:
//!
//! ```toml
//! [blur]
//! pointcut-expression = "execution(* app::web..*.*(..))"
//! ```

use serde::Deserialize;

use crate::error::Result;

/// Settings of the `[blur]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BlurProperties {
    /// Selects the intercepted methods. Unset means every method under the
    /// application's root module.
    #[serde(default, alias = "pointcutExpression")]
    pub pointcut_expression: Option<String>,
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    blur: BlurProperties,
}

impl BlurProperties {
    /// Reads the `[blur]` table of a TOML document. A missing table yields
    /// the defaults.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let document: Document = toml::from_str(src)?;
        Ok(document.blur)
    }

    /// The configured expression, or one selecting every method under
    /// `root_module`.
    pub fn pointcut_expression_or_default(&self, root_module: &str) -> String {
        match &self.pointcut_expression {
            Some(expression) if !expression.trim().is_empty() => expression.clone(),
            _ => format!("execution(* {root_module}..*.*(..))"),
        }
    }
}
