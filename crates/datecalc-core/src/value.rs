//! Operands and results of an expression.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Serialize, Serializer};

use crate::unit::Unit;

/// Fractional digits a magnitude keeps.
const SCALE_DIGITS: usize = 9;
const SCALE: i128 = 1_000_000_000;

/// An exact signed decimal such as `10`, `-3` or `1.5`, held in billionths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Magnitude(i128);

impl Magnitude {
    pub const ONE: Magnitude = Magnitude(SCALE);

    pub fn whole(n: i64) -> Self {
        Magnitude(i128::from(n) * SCALE)
    }

    /// Parse an optional sign, digits, and an optional fraction of at most
    /// nine digits.
    pub fn parse(s: &str) -> Option<Self> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (digits, None),
        };

        let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(whole)
            || fraction.is_some_and(|f| !is_digits(f) || f.len() > SCALE_DIGITS)
        {
            return None;
        }

        let fraction = fraction.unwrap_or_default();
        let scaled: i128 = format!("{whole}{fraction:0<SCALE_DIGITS$}").parse().ok()?;
        Some(Magnitude(if negative { -scaled } else { scaled }))
    }

    pub fn checked_add(self, other: Magnitude) -> Option<Magnitude> {
        self.0.checked_add(other.0).map(Magnitude)
    }

    pub fn checked_neg(self) -> Option<Magnitude> {
        self.0.checked_neg().map(Magnitude)
    }

    /// `self * factor` rounded half away from zero, if it fits an `i64`.
    pub fn round_times(self, factor: i64) -> Option<i64> {
        let product = self.0.checked_mul(i128::from(factor))?;
        let (quotient, remainder) = (product / SCALE, product % SCALE);
        let rounded = if remainder.abs() * 2 >= SCALE {
            quotient + product.signum()
        } else {
            quotient
        };
        i64::try_from(rounded).ok()
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let (whole, fraction) = (abs / SCALE as u128, abs % SCALE as u128);
        if fraction == 0 {
            return write!(f, "{sign}{whole}");
        }
        let fraction = format!("{fraction:0SCALE_DIGITS$}");
        write!(f, "{sign}{whole}.{}", fraction.trim_end_matches('0'))
    }
}

/// Serialized as a decimal string so no precision is lost.
impl Serialize for Magnitude {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A signed magnitude in a canonical unit, e.g. `10days` or `-1.5h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Duration {
    pub magnitude: Magnitude,
    pub unit: Unit,
}

impl Duration {
    pub fn new(magnitude: Magnitude, unit: Unit) -> Self {
        Duration { magnitude, unit }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit)
    }
}

/// A classified expression token that carries a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Instant(DateTime<FixedOffset>),
    Duration(Duration),
}

/// The accumulator of a reduction and the final result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Value {
    Instant(DateTime<FixedOffset>),
    Duration(Duration),
    Boolean(bool),
    Number(i64),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Instant(_) => "a date",
            Value::Duration(_) => "a duration",
            Value::Boolean(_) => "a boolean",
            Value::Number(_) => "a number",
        }
    }
}

impl From<Operand> for Value {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Instant(dt) => Value::Instant(dt),
            Operand::Duration(d) => Value::Duration(d),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Instant(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%:z")),
            Value::Duration(d) => write!(f, "{d}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn magnitude(s: &str) -> Magnitude {
        Magnitude::parse(s).unwrap()
    }

    #[test]
    fn test_duration_display_uses_canonical_unit() {
        assert_eq!(Duration::new(Magnitude::whole(10), Unit::Days).to_string(), "10days");
        assert_eq!(Duration::new(magnitude("-1.5"), Unit::Hours).to_string(), "-1.5hours");
    }

    #[test]
    fn test_magnitude_parse_and_display() {
        assert_eq!(magnitude("10").to_string(), "10");
        assert_eq!(magnitude("+2").to_string(), "2");
        assert_eq!(magnitude("-0.25").to_string(), "-0.25");
        assert_eq!(magnitude("0.000000001").to_string(), "0.000000001");
        assert_eq!(magnitude("007.50").to_string(), "7.5");
        assert_eq!(magnitude("-0"), Magnitude::whole(0));
    }

    #[test]
    fn test_magnitude_rejects_malformed() {
        for s in ["", "-", "1.", ".5", "1.2.3", "1e3", "0.0000000001", "--1"] {
            assert_eq!(Magnitude::parse(s), None, "accepted '{s}'");
        }
    }

    #[test]
    fn test_magnitude_addition_is_exact() {
        let sum = magnitude("0.1").checked_add(magnitude("0.2")).unwrap();
        assert_eq!(sum, magnitude("0.3"));
        assert_eq!(sum.to_string(), "0.3");
    }

    #[test]
    fn test_magnitude_rounds_half_away_from_zero() {
        assert_eq!(magnitude("0.5").round_times(1), Some(1));
        assert_eq!(magnitude("-0.5").round_times(1), Some(-1));
        assert_eq!(magnitude("2.4999").round_times(1), Some(2));
        assert_eq!(magnitude("1.5").round_times(12), Some(18));
        assert_eq!(magnitude("0.0015").round_times(1_000), Some(2));
        assert_eq!(Magnitude::whole(i64::MAX).round_times(12), None);
    }

    #[test]
    fn test_duration_serializes_magnitude_as_decimal_string() {
        let json = serde_json::to_value(Duration::new(magnitude("0.3"), Unit::Hours)).unwrap();
        assert_eq!(json["magnitude"], "0.3");
        assert_eq!(json["unit"], "hours");
    }

    #[test]
    fn test_instant_display_is_iso_with_offset() {
        let dt = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 11, 0, 0, 0)
            .unwrap();
        assert_eq!(Value::Instant(dt).to_string(), "2024-01-11T00:00:00+01:00");
    }

    #[test]
    fn test_value_serializes_with_kind_tag() {
        let json = serde_json::to_value(Value::Number(10)).unwrap();
        assert_eq!(json["kind"], "number");
        assert_eq!(json["value"], 10);
    }
}
