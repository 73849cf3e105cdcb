//! Token classification: raw command-line words → a typed expression.
//!
//! Tokens alternate strictly between operands and operators, starting and
//! ending with an operand. An optional trailing `to <format>` pair is split
//! off first and interpreted according to the last operator of the chain.

use chrono::{DateTime, FixedOffset};
use tracing::trace;

use crate::datetime::parse_instant;
use crate::error::{DateCalcError, Result};
use crate::operator::{parse_operator, Family, Operator};
use crate::unit::{parse_unit, Unit};
use crate::value::{Duration, Magnitude, Operand};
use crate::zone::Anchors;

pub const TODAY_ALIASES: &[&str] = &["today", "td"];
pub const NOW_ALIASES: &[&str] = &["now"];
pub const TOMORROW_ALIASES: &[&str] = &["tomorrow"];
pub const YESTERDAY_ALIASES: &[&str] = &["yesterday"];

/// Words that request the usage guide wherever they appear.
pub const HELP_ALIASES: &[&str] = &["help", "--help", "-help", "-h"];

/// Keyword introducing the output-format directive.
pub const FORMAT_KEYWORD: &str = "to";

/// How the final result is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// Unit a difference is expressed in.
    Unit(Unit),
    /// Date-print template for an instant.
    Template(String),
}

/// One `<operator> <operand>` link of the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub operator: Operator,
    pub operand: Operand,
    /// The operand as typed, for error messages.
    pub token: String,
}

/// A fully classified expression, ready for reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub first: Operand,
    pub steps: Vec<Step>,
    pub format: Option<OutputFormat>,
}

impl Expression {
    /// Unit differences are expressed in: the format directive's, or milliseconds.
    pub fn diff_unit(&self) -> Unit {
        match self.format {
            Some(OutputFormat::Unit(unit)) => unit,
            _ => Unit::Milliseconds,
        }
    }
}

/// True if any token asks for the usage guide.
pub fn is_help_request<S: AsRef<str>>(tokens: &[S]) -> bool {
    tokens
        .iter()
        .any(|token| HELP_ALIASES.contains(&token.as_ref()))
}

/// Split a trailing `to <format>` pair off the token list.
pub fn split_format<S: AsRef<str>>(tokens: &[S]) -> Result<(&[S], Option<&str>)> {
    match tokens {
        [rest @ .., keyword, format] if keyword.as_ref() == FORMAT_KEYWORD => {
            Ok((rest, Some(format.as_ref())))
        }
        [.., last] if last.as_ref() == FORMAT_KEYWORD => Err(DateCalcError::MissingFormat),
        _ => Ok((tokens, None)),
    }
}

/// Classify a complete token list.
///
/// # Errors
///
/// Argument-shape errors ([`DateCalcError::TrailingOperator`],
/// [`DateCalcError::MissingOperation`], [`DateCalcError::MissingFormat`])
/// are reported before any token is classified. Then each token must be a
/// recognized value or operator, and the format directive must suit the
/// last operator.
pub fn parse_expression<S: AsRef<str>>(tokens: &[S], anchors: &Anchors) -> Result<Expression> {
    let (tokens, format) = split_format(tokens)?;

    if let Some(last) = tokens.last().map(AsRef::as_ref) {
        if Operator::from_symbol(last).is_some() {
            return Err(DateCalcError::TrailingOperator(last.to_string()));
        }
    }
    let (head, tail) = match tokens {
        [head, tail @ ..] if !tail.is_empty() => (head.as_ref(), tail),
        _ => return Err(DateCalcError::MissingOperation),
    };

    let first = classify_operand(head, anchors)?;
    let mut steps = Vec::with_capacity(tail.len() / 2);
    for pair in tail.chunks(2) {
        let operator = parse_operator(pair[0].as_ref())?;
        let token = pair
            .get(1)
            .map(AsRef::as_ref)
            .ok_or_else(|| DateCalcError::TrailingOperator(pair[0].as_ref().to_string()))?;
        steps.push(Step {
            operator,
            operand: classify_operand(token, anchors)?,
            token: token.to_string(),
        });
    }

    let format = match (format, steps.last()) {
        (Some(format), Some(step)) => Some(classify_format(format, step.operator)?),
        _ => None,
    };

    Ok(Expression {
        first,
        steps,
        format,
    })
}

/// Classify one operand token.
///
/// Tried in order: free-form date, `today`/`now` (and `tomorrow`/`yesterday`)
/// aliases, then the duration shape `<magnitude><unit alias>`.
pub fn classify_operand(token: &str, anchors: &Anchors) -> Result<Operand> {
    let operand = parse_instant(token, &anchors.zone)
        .or_else(|| resolve_anchor(token, anchors))
        .map(Operand::Instant)
        .or_else(|| parse_duration(token).map(Operand::Duration))
        .ok_or_else(|| DateCalcError::UnrecognizedValue(token.to_string()))?;

    trace!(token, ?operand, "classified operand");
    Ok(operand)
}

fn resolve_anchor(token: &str, anchors: &Anchors) -> Option<DateTime<FixedOffset>> {
    if TODAY_ALIASES.contains(&token) {
        Some(anchors.today)
    } else if NOW_ALIASES.contains(&token) {
        Some(anchors.now)
    } else if TOMORROW_ALIASES.contains(&token) {
        Some(anchors.tomorrow)
    } else if YESTERDAY_ALIASES.contains(&token) {
        Some(anchors.yesterday)
    } else {
        None
    }
}

/// Parse `<magnitude><unit alias>`, e.g. `10days`, `-3d`, `1.5h`.
///
/// The magnitude is everything before the first alphabetic character: an
/// optional sign, digits, and an optional fraction. A bare alias (`d`) has
/// magnitude 1.
pub fn parse_duration(token: &str) -> Option<Duration> {
    let split = token.find(|c: char| c.is_ascii_alphabetic())?;
    let (magnitude, alias) = token.split_at(split);
    let unit = Unit::from_alias(alias)?;

    let magnitude = if magnitude.is_empty() {
        Magnitude::ONE
    } else {
        Magnitude::parse(magnitude)?
    };
    Some(Duration::new(magnitude, unit))
}

fn classify_format(format: &str, last: Operator) -> Result<OutputFormat> {
    match last.family() {
        Family::Comparison => Err(DateCalcError::FormatOnComparison(format.to_string())),
        Family::Difference => parse_unit(format).map(OutputFormat::Unit),
        Family::Additive => Ok(OutputFormat::Template(format.to_string())),
    }
}
