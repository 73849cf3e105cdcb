//! Date-print templates for the `to <format>` directive.
//!
//! Two syntaxes are understood:
//!
//! - moment-style tokens (`YYYY-MM-DD HH:mm`, `dddd, MMMM Do`), with `[...]`
//!   for literal text;
//! - chrono strftime strings, recognized by the presence of `%`.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, Timelike};

use crate::error::{DateCalcError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    /// Rendered through chrono's strftime.
    Spec(&'static str),
    Quarter,
    /// Two-letter weekday, e.g. `We`.
    MinWeekday,
    Ordinal,
    Centis,
    Decis,
    UnixMillis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Field(Field),
}

/// Tokens in matching priority order (longest spelling first).
const TOKENS: &[(&str, Field)] = &[
    ("YYYY", Field::Spec("%Y")),
    ("YY", Field::Spec("%y")),
    ("Q", Field::Quarter),
    ("MMMM", Field::Spec("%B")),
    ("MMM", Field::Spec("%b")),
    ("MM", Field::Spec("%m")),
    ("M", Field::Spec("%-m")),
    ("DDDD", Field::Spec("%j")),
    ("DDD", Field::Spec("%-j")),
    ("Do", Field::Ordinal),
    ("DD", Field::Spec("%d")),
    ("D", Field::Spec("%-d")),
    ("dddd", Field::Spec("%A")),
    ("ddd", Field::Spec("%a")),
    ("dd", Field::MinWeekday),
    ("d", Field::Spec("%w")),
    ("E", Field::Spec("%u")),
    ("WW", Field::Spec("%V")),
    ("W", Field::Spec("%-V")),
    ("HH", Field::Spec("%H")),
    ("H", Field::Spec("%-H")),
    ("hh", Field::Spec("%I")),
    ("h", Field::Spec("%-I")),
    ("mm", Field::Spec("%M")),
    ("m", Field::Spec("%-M")),
    ("ss", Field::Spec("%S")),
    ("s", Field::Spec("%-S")),
    ("SSS", Field::Spec("%3f")),
    ("SS", Field::Centis),
    ("S", Field::Decis),
    ("A", Field::Spec("%p")),
    ("a", Field::Spec("%P")),
    ("ZZ", Field::Spec("%z")),
    ("Z", Field::Spec("%:z")),
    ("X", Field::Spec("%s")),
    ("x", Field::UnixMillis),
];

/// Render `dt` with a user template.
pub fn render(dt: &DateTime<FixedOffset>, template: &str) -> Result<String> {
    if template.contains('%') {
        return render_strftime(dt, template);
    }

    let mut out = String::new();
    for piece in tokenize(template)? {
        match piece {
            Piece::Literal(text) => out.push_str(&text),
            Piece::Field(Field::Spec(spec)) => out.push_str(&dt.format(spec).to_string()),
            Piece::Field(Field::Quarter) => out.push_str(&((dt.month() - 1) / 3 + 1).to_string()),
            Piece::Field(Field::MinWeekday) => {
                out.extend(dt.format("%a").to_string().chars().take(2))
            }
            Piece::Field(Field::Ordinal) => out.push_str(&ordinal(dt.day())),
            Piece::Field(Field::Centis) => out.push_str(&format!("{:02}", millis(dt) / 10)),
            Piece::Field(Field::Decis) => out.push_str(&(millis(dt) / 100).to_string()),
            Piece::Field(Field::UnixMillis) => out.push_str(&dt.timestamp_millis().to_string()),
        }
    }
    Ok(out)
}

fn render_strftime(dt: &DateTime<FixedOffset>, template: &str) -> Result<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(template).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(DateCalcError::InvalidFormat(format!(
            "'{template}' is not a valid strftime string"
        )));
    }
    Ok(dt.format_with_items(items.into_iter()).to_string())
}

fn tokenize(template: &str) -> Result<Vec<Piece>> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while !rest.is_empty() {
        if let Some(escaped) = rest.strip_prefix('[') {
            let end = escaped.find(']').ok_or_else(|| {
                DateCalcError::InvalidFormat(format!("unclosed '[' in '{template}'"))
            })?;
            literal.push_str(&escaped[..end]);
            rest = &escaped[end + 1..];
            continue;
        }

        if let Some((token, field)) = TOKENS.iter().find(|(token, _)| rest.starts_with(token)) {
            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Field(*field));
            rest = &rest[token.len()..];
            continue;
        }

        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            literal.push(ch);
        }
        rest = chars.as_str();
    }

    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}

fn millis(dt: &DateTime<FixedOffset>) -> u32 {
    dt.nanosecond() % 1_000_000_000 / 1_000_000
}

/// 1 → "1st", 2 → "2nd", 11 → "11th", 23 → "23rd".
fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
