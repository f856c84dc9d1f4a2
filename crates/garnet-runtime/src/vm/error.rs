//! Argument binding errors

use thiserror::Error;

/// Failure to reconcile a call site's arguments with a method's parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A keyword argument names no keyword parameter
    #[error("unknown key {key} for method {method}")]
    UnknownKeyword { key: String, method: String },

    /// A read landed outside the argument window or past the top of the stack
    #[error("argument slot {index} is outside the argument window of method {method}")]
    ArgumentOutOfWindow { index: usize, method: String },

    /// Fewer arguments than required positional parameters
    #[error("method {method} expects at least {expected} arguments, got {given}")]
    WrongArgumentCount {
        method: String,
        expected: usize,
        given: usize,
    },

    /// More arguments than parameters, with nothing to collect the rest
    #[error("method {method} accepts at most {max} arguments, got {given}")]
    TooManyArguments {
        method: String,
        max: usize,
        given: usize,
    },

    /// A required keyword parameter was not passed
    #[error("method {method} requires key argument {key}")]
    MissingKeyword { key: String, method: String },
}

impl BindError {
    /// Name of the method the failed call targeted
    pub fn method(&self) -> &str {
        match self {
            BindError::UnknownKeyword { method, .. }
            | BindError::ArgumentOutOfWindow { method, .. }
            | BindError::WrongArgumentCount { method, .. }
            | BindError::TooManyArguments { method, .. }
            | BindError::MissingKeyword { method, .. } => method,
        }
    }
}
