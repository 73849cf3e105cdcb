//! Error types for expression evaluation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateCalcError {
    #[error("provide a valid operation")]
    MissingOperation,

    #[error("last parameter can't be an operator: '{0}'")]
    TrailingOperator(String),

    #[error("missing format after 'to'")]
    MissingFormat,

    #[error("unrecognized value: {0}")]
    UnrecognizedValue(String),

    #[error("invalid operation '{found}' - allowed values: {allowed}")]
    InvalidOperator { found: String, allowed: String },

    #[error("value on the right of a sum/diff operation cannot be a date: '{0}'")]
    DateOnRight(String),

    #[error("invalid unit '{found}' - allowed values: {allowed}")]
    InvalidUnit { found: String, allowed: String },

    #[error("a comparison result cannot be formatted: 'to {0}'")]
    FormatOnComparison(String),

    #[error("'{operator}' expects {expected}, found {found}")]
    TypeMismatch {
        operator: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot combine durations in {left} and {right}")]
    IncompatibleUnits {
        left: &'static str,
        right: &'static str,
    },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("date out of range: {0}")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, DateCalcError>;
