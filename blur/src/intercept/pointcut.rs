//! Pointcut expressions selecting intercepted methods.
//!
//! Two `execution` forms are understood:
//!
//! - `execution(* app::web..*.*(..))`: every method under the module path
//! - `execution(* app::web::UserController::find(..))`: exactly one method
//!
//! `.` and `::` are interchangeable separators in both the expression and the
//! matched method paths.

use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

/// A parsed pointcut expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pointcut {
    /// Methods whose path lies under the module path.
    Within(String),
    /// The method with exactly this path.
    Exact(String),
}

const WITHIN_SUFFIX: &str = "..*.*";

fn normalize(path: &str) -> String {
    path.split("::")
        .flat_map(|segment| segment.split('.'))
        .collect::<Vec<_>>()
        .join("::")
}

fn is_path(path: &str) -> bool {
    !path.is_empty()
        && path.split("::").all(|segment| {
            !segment.is_empty() && segment.chars().all(|ch| ch.is_alphanumeric() || ch == '_')
        })
}

impl Pointcut {
    /// The default pointcut: every method under `root_module`.
    pub fn within(root_module: &str) -> Self {
        Pointcut::Within(normalize(root_module))
    }

    pub fn matches(&self, method_path: &str) -> bool {
        let method_path = normalize(method_path);
        match self {
            Pointcut::Within(prefix) => method_path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with("::")),
            Pointcut::Exact(path) => method_path == *path,
        }
    }
}

impl FromStr for Pointcut {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self> {
        let trimmed = src.trim();
        let offset = src.len() - src.trim_start().len();
        let body = trimmed
            .strip_prefix("execution(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| Error::syntax(offset, "expected `execution(...)`"))?;
        let signature = body
            .trim()
            .strip_prefix('*')
            .ok_or_else(|| {
                Error::syntax(offset + "execution(".len(), "expected `*` return pattern")
            })?
            .trim();
        let target = signature
            .strip_suffix("(..)")
            .ok_or_else(|| Error::syntax(offset, "expected `(..)` parameter pattern"))?
            .trim();

        let pointcut = match target.strip_suffix(WITHIN_SUFFIX) {
            Some(prefix) => Pointcut::Within(normalize(prefix)),
            None => Pointcut::Exact(normalize(target)),
        };
        let path = match &pointcut {
            Pointcut::Within(path) | Pointcut::Exact(path) => path,
        };
        if !is_path(path) {
            return Err(Error::syntax(offset, format!("invalid method path `{target}`")));
        }
        Ok(pointcut)
    }
}

impl fmt::Display for Pointcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pointcut::Within(prefix) => write!(f, "execution(* {prefix}{WITHIN_SUFFIX}(..))"),
            Pointcut::Exact(path) => write!(f, "execution(* {path}(..))"),
        }
    }
}
