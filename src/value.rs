//! Directive values: the raw shapes callers may supply and the canonical
//! tagged representation the rest of the crate operates on.
//!
//! Raw values are coerced exactly once, at the system boundary; internal
//! components never see an untyped shape.

use serde::{Deserialize, Serialize};

use crate::directive::Directive;
use crate::error::{CspError, Result};

/// A directive value as supplied by callers or configuration files.
///
/// Absence is represented by `Option<RawValue>::None` (JSON `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Boolean directive value.
    Flag(bool),
    /// A single source expression, shorthand for a one-element list.
    One(String),
    /// An ordered list of source expressions.
    Many(Vec<String>),
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Flag(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::One(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::One(value)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(values: Vec<String>) -> Self {
        RawValue::Many(values)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(values: Vec<&str>) -> Self {
        RawValue::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// The canonical directive value.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveValue {
    /// Absent: contributes nothing and is omitted from output.
    Unset,
    /// Boolean directive: `true` renders the bare name, `false` removes
    /// the directive entirely.
    Flag(bool),
    /// Ordered source-expression tokens. Order and duplicates preserved.
    Sources(Vec<String>),
    /// Directive names that receive the nonce (`include_nonce_in` only).
    NonceTargets(Vec<Directive>),
}

impl DirectiveValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, DirectiveValue::Unset)
    }
}

/// Coerces a raw value into the canonical representation for `directive`.
///
/// Content directives accept booleans (flag), scalars (one-element source
/// list), and sequences (source list, order kept, no deduplication).
/// `report_only` accepts a boolean; `include_nonce_in` accepts a scalar or
/// sequence of directive names, each validated against the registry.
pub fn normalize(directive: Directive, raw: Option<&RawValue>) -> Result<DirectiveValue> {
    let Some(raw) = raw else {
        return Ok(DirectiveValue::Unset);
    };
    match directive {
        Directive::IncludeNonceIn => {
            let names: Vec<&str> = match raw {
                RawValue::One(name) => vec![name.as_str()],
                RawValue::Many(names) => names.iter().map(String::as_str).collect(),
                RawValue::Flag(_) => {
                    return Err(CspError::InvalidValue {
                        directive,
                        reason: "expected a list of directive names".to_string(),
                    });
                }
            };
            let targets = names
                .into_iter()
                .map(Directive::from_name)
                .collect::<Result<Vec<_>>>()?;
            Ok(DirectiveValue::NonceTargets(targets))
        }
        Directive::ReportOnly => match raw {
            RawValue::Flag(value) => Ok(DirectiveValue::Flag(*value)),
            _ => Err(CspError::InvalidValue {
                directive,
                reason: "expected a boolean".to_string(),
            }),
        },
        _ => match raw {
            RawValue::Flag(value) => Ok(DirectiveValue::Flag(*value)),
            RawValue::One(token) => Ok(DirectiveValue::Sources(vec![token.clone()])),
            RawValue::Many(tokens) => Ok(DirectiveValue::Sources(tokens.clone())),
        },
    }
}
