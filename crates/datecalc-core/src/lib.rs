//! # datecalc-core
//!
//! Left-to-right date/time expression evaluation.
//!
//! An expression is a flat list of command-line tokens such as
//! `today + 10days - 2h to "YYYY-MM-DD HH:mm"` or `2024-01-01 diff 2024-03-01 to d`.
//! Tokens alternate between operands (dates, anchor aliases, durations) and
//! operators, and are folded strictly from the left with no precedence.
//!
//! Nothing here reads the system clock on its own: the caller captures
//! [`Anchors`] once and passes them in, so `now` and `today` are fixed for
//! the whole evaluation and tests can inject any instant.
//!
//! ## Modules
//!
//! - [`classifier`]: raw tokens → typed [`Expression`]
//! - [`engine`]: validation, dispatch and reduction of an expression
//! - [`unit`]: duration units and their aliases
//! - [`operator`]: operator symbols and families
//! - [`datetime`]: free-form date/time parsing
//! - [`template`]: date-print templates for `to <format>`
//! - [`value`]: operands and results
//! - [`zone`]: evaluation timezone and frozen anchors
//! - [`error`]: error types

pub mod classifier;
pub mod datetime;
pub mod engine;
pub mod error;
pub mod operator;
pub mod template;
pub mod unit;
pub mod value;
pub mod zone;

pub use classifier::{
    classify_operand, is_help_request, parse_duration, parse_expression, Expression,
    OutputFormat, Step,
};
pub use engine::{apply, evaluate, reduce, render, Evaluation};
pub use error::{DateCalcError, Result};
pub use operator::{Family, Operator};
pub use unit::Unit;
pub use value::{Duration, Magnitude, Operand, Value};
pub use zone::{Anchors, Zone};
