use thiserror::Error;

use crate::directive::Directive;

#[derive(Error, Debug)]
pub enum CspError {
    #[error("unknown CSP directive: {0}")]
    UnknownDirective(String),

    #[error("invalid value for directive {directive}: {reason}")]
    InvalidValue {
        directive: Directive,
        reason: String,
    },

    #[error("duplicate policy name: {0}")]
    DuplicatePolicy(String),

    #[error("no policy named '{0}' in the composed collection")]
    PolicyNotFound(String),

    #[error("policy index {0} out of range")]
    IndexOutOfRange(usize),

    #[error("append template '{0}' does not resolve to a configured policy")]
    UnknownTemplate(String),

    #[error("configuration parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, CspError>;
