//! Left-to-right reduction of a classified expression.
//!
//! There is no precedence: `a op1 b op2 c` is `(a op1 b) op2 c`. Each step
//! validates the operand types for its operator family before computing,
//! and the first failure aborts the whole evaluation.

use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDateTime, TimeDelta};
use serde::Serialize;
use tracing::debug;

use crate::classifier::{parse_expression, Expression, OutputFormat};
use crate::error::{DateCalcError, Result};
use crate::operator::Operator;
use crate::template;
use crate::unit::{Reckoning, Unit};
use crate::value::{Duration, Operand, Value};
use crate::zone::{Anchors, Zone};

/// The outcome of evaluating a token list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub result: Value,
    /// `result` rendered with the output-format directive.
    pub text: String,
}

/// Classify, reduce and render a token list.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use datecalc_core::{evaluate, Anchors, Zone};
///
/// let now = Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap();
/// let anchors = Anchors::at(now, Zone::parse("UTC").unwrap()).unwrap();
///
/// let sum = evaluate(&["2024-01-01", "+", "10days", "to", "YYYY-MM-DD"], &anchors).unwrap();
/// assert_eq!(sum.text, "2024-01-11");
///
/// let diff = evaluate(&["2024-01-01", "diff", "2024-01-11", "to", "days"], &anchors).unwrap();
/// assert_eq!(diff.text, "10");
/// ```
pub fn evaluate<S: AsRef<str>>(tokens: &[S], anchors: &Anchors) -> Result<Evaluation> {
    let expression = parse_expression(tokens, anchors)?;
    let result = reduce(&expression, &anchors.zone)?;
    let text = render(&result, expression.format.as_ref())?;
    Ok(Evaluation { result, text })
}

/// Fold the expression from the left until one value remains.
pub fn reduce(expression: &Expression, zone: &Zone) -> Result<Value> {
    let diff_unit = expression.diff_unit();
    let mut acc = Value::from(expression.first.clone());

    for step in &expression.steps {
        let next = apply(&acc, step.operator, &step.operand, &step.token, diff_unit, zone)?;
        debug!(
            operator = %step.operator,
            left = %acc,
            right = %step.token,
            result = %next,
            "reduced"
        );
        acc = next;
    }
    Ok(acc)
}

/// Validate and compute one `left operator right` step.
///
/// `token` is the right operand as typed; `diff_unit` is the unit a
/// difference is expressed in.
pub fn apply(
    left: &Value,
    operator: Operator,
    right: &Operand,
    token: &str,
    diff_unit: Unit,
    zone: &Zone,
) -> Result<Value> {
    match operator {
        Operator::Add => sum(left, operator, right, token, 1, zone),
        Operator::Subtract => sum(left, operator, right, token, -1, zone),
        Operator::Same => instants(left, operator, right).map(|(l, r)| Value::Boolean(l == r)),
        Operator::After => instants(left, operator, right).map(|(l, r)| Value::Boolean(l > r)),
        Operator::SameOrAfter => {
            instants(left, operator, right).map(|(l, r)| Value::Boolean(l >= r))
        }
        Operator::Before => instants(left, operator, right).map(|(l, r)| Value::Boolean(l < r)),
        Operator::SameOrBefore => {
            instants(left, operator, right).map(|(l, r)| Value::Boolean(l <= r))
        }
        Operator::Diff => {
            let (l, r) = instants(left, operator, right)?;
            difference(&l, &r, diff_unit, zone).map(Value::Number)
        }
    }
}

/// Render the final value.
pub fn render(value: &Value, format: Option<&OutputFormat>) -> Result<String> {
    match (value, format) {
        (Value::Instant(dt), Some(OutputFormat::Template(template))) => {
            template::render(dt, template)
        }
        (Value::Duration(_), Some(OutputFormat::Template(template))) => Err(
            DateCalcError::InvalidFormat(format!("'{template}' cannot format {}", value.kind())),
        ),
        _ => Ok(value.to_string()),
    }
}

// ── Additive ────────────────────────────────────────────────────────────────

fn sum(
    left: &Value,
    operator: Operator,
    right: &Operand,
    token: &str,
    sign: i64,
    zone: &Zone,
) -> Result<Value> {
    let right = match right {
        Operand::Duration(d) => d,
        Operand::Instant(_) => return Err(DateCalcError::DateOnRight(token.to_string())),
    };

    match left {
        Value::Instant(dt) => shift(dt, right, sign, zone).map(Value::Instant),
        Value::Duration(acc) if acc.unit == right.unit => {
            let step = if sign < 0 {
                right.magnitude.checked_neg()
            } else {
                Some(right.magnitude)
            };
            step.and_then(|step| acc.magnitude.checked_add(step))
                .map(|magnitude| Value::Duration(Duration::new(magnitude, acc.unit)))
                .ok_or_else(|| DateCalcError::OutOfRange(format!("{acc} {operator} {right}")))
        }
        Value::Duration(acc) => Err(DateCalcError::IncompatibleUnits {
            left: acc.unit.canonical(),
            right: right.unit.canonical(),
        }),
        other => Err(DateCalcError::TypeMismatch {
            operator: operator.to_string(),
            expected: "a date or a duration on the left",
            found: other.kind(),
        }),
    }
}

/// Move an instant by a duration. Calendar units keep the wall-clock time
/// in `zone`; sub-day units move the absolute instant.
fn shift(
    dt: &DateTime<FixedOffset>,
    duration: &Duration,
    sign: i64,
    zone: &Zone,
) -> Result<DateTime<FixedOffset>> {
    let out_of_range = || {
        let op = if sign < 0 { '-' } else { '+' };
        DateCalcError::OutOfRange(format!("{} {op} {duration}", dt.to_rfc3339()))
    };

    match duration
        .unit
        .reckon(duration.magnitude)
        .ok_or_else(out_of_range)?
    {
        Reckoning::Months(n) => {
            let n = n.checked_mul(sign).ok_or_else(out_of_range)?;
            let months = Months::new(u32::try_from(n.unsigned_abs()).map_err(|_| out_of_range())?);
            let wall = zone.wall_clock(dt);
            let moved = if n >= 0 {
                wall.checked_add_months(months)
            } else {
                wall.checked_sub_months(months)
            };
            zone.resolve(moved.ok_or_else(out_of_range)?)
        }
        Reckoning::Days(n) => {
            let n = n.checked_mul(sign).ok_or_else(out_of_range)?;
            let days = Days::new(n.unsigned_abs());
            let wall = zone.wall_clock(dt);
            let moved = if n >= 0 {
                wall.checked_add_days(days)
            } else {
                wall.checked_sub_days(days)
            };
            zone.resolve(moved.ok_or_else(out_of_range)?)
        }
        Reckoning::Exact(millis) => {
            let delta = millis
                .checked_mul(sign)
                .and_then(TimeDelta::try_milliseconds)
                .ok_or_else(out_of_range)?;
            dt.checked_add_signed(delta)
                .map(|moved| zone.convert(&moved))
                .ok_or_else(out_of_range)
        }
    }
}

// ── Comparison and difference ───────────────────────────────────────────────

/// Both operands of a comparison or difference must be dates.
fn instants(
    left: &Value,
    operator: Operator,
    right: &Operand,
) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let mismatch = |found: &'static str| DateCalcError::TypeMismatch {
        operator: operator.to_string(),
        expected: "two dates",
        found,
    };
    match (left, right) {
        (Value::Instant(l), Operand::Instant(r)) => Ok((*l, *r)),
        (Value::Instant(_), Operand::Duration(_)) => Err(mismatch("a duration")),
        (other, _) => Err(mismatch(other.kind())),
    }
}

/// Elapsed span between two instants, truncated toward zero in `unit`.
///
/// Never negative. Weeks and days compare wall-clock readings in `zone`;
/// months and years count whole calendar months.
fn difference(
    a: &DateTime<FixedOffset>,
    b: &DateTime<FixedOffset>,
    unit: Unit,
    zone: &Zone,
) -> Result<i64> {
    let (earlier, later) = if a <= b { (a, b) } else { (b, a) };

    let value = match unit.span() {
        Reckoning::Months(per) => {
            whole_months(&zone.wall_clock(earlier), &zone.wall_clock(later))? / per
        }
        Reckoning::Days(per) => {
            let span = zone.wall_clock(later) - zone.wall_clock(earlier);
            span.max(TimeDelta::zero()).num_days() / per
        }
        Reckoning::Exact(per) => (*later - *earlier).num_milliseconds() / per,
    };
    Ok(value)
}

/// Largest `n` with `earlier + n months <= later`.
fn whole_months(earlier: &NaiveDateTime, later: &NaiveDateTime) -> Result<i64> {
    let mut months = i64::from(later.year() - earlier.year()) * 12
        + i64::from(later.month())
        - i64::from(earlier.month());

    while months > 0 {
        let step = u32::try_from(months)
            .map_err(|_| DateCalcError::OutOfRange(format!("{months} months")))?;
        match earlier.checked_add_months(Months::new(step)) {
            Some(anchor) if anchor <= *later => break,
            _ => months -= 1,
        }
    }
    Ok(months.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Magnitude;
    use chrono::{TimeZone, Utc};

    fn anchors() -> Anchors {
        // Wednesday, February 18, 2026, 14:30:00 UTC
        let now = Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap();
        Anchors::at(now, Zone::parse("UTC").unwrap()).unwrap()
    }

    fn eval(tokens: &[&str]) -> Result<Evaluation> {
        evaluate(tokens, &anchors())
    }

    fn text(tokens: &[&str]) -> String {
        eval(tokens).unwrap().text
    }

    // ── sums ────────────────────────────────────────────────────────────

    #[test]
    fn test_add_days() {
        assert_eq!(text(&["2024-01-01", "+", "10days"]), "2024-01-11T00:00:00+00:00");
    }

    #[test]
    fn test_subtract_hours_with_template() {
        // 400 hours = 16 days 16 hours before 2026-02-18T14:30
        assert_eq!(text(&["now", "-", "400hours", "to", "YYYY-MM-DD HH:mm"]), "2026-02-01 22:30");
    }

    #[test]
    fn test_add_month_clamps_to_month_end() {
        assert_eq!(text(&["2024-01-31", "+", "1M", "to", "YYYY-MM-DD"]), "2024-02-29");
        assert_eq!(text(&["2023-01-31", "+", "1month", "to", "YYYY-MM-DD"]), "2023-02-28");
    }

    #[test]
    fn test_add_years_and_weeks() {
        assert_eq!(text(&["2024-02-29", "+", "1y", "to", "YYYY-MM-DD"]), "2025-02-28");
        assert_eq!(text(&["2024-01-01", "+", "2w", "to", "YYYY-MM-DD"]), "2024-01-15");
    }

    #[test]
    fn test_negative_magnitude_subtracts() {
        assert_eq!(text(&["2024-01-10", "+", "-3d", "to", "YYYY-MM-DD"]), "2024-01-07");
        assert_eq!(text(&["2024-01-10", "-", "-3d", "to", "YYYY-MM-DD"]), "2024-01-13");
    }

    #[test]
    fn test_fractional_exact_units() {
        assert_eq!(text(&["2024-01-01", "+", "1.5h", "to", "HH:mm"]), "01:30");
    }

    #[test]
    fn test_chain_is_left_to_right() {
        assert_eq!(
            text(&["2024-01-01", "+", "1d", "+", "2h", "-", "30min", "to", "YYYY-MM-DD HH:mm"]),
            "2024-01-02 01:30"
        );
    }

    #[test]
    fn test_day_arithmetic_keeps_wall_clock_across_dst() {
        let zone = Zone::parse("America/New_York").unwrap();
        let anchors = Anchors::at(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(), zone).unwrap();
        // March 8, 2026 is the US spring-forward date
        let days = evaluate(&["2026-03-07T10:00", "+", "1d"], &anchors).unwrap();
        assert_eq!(days.text, "2026-03-08T10:00:00-04:00");
        let hours = evaluate(&["2026-03-07T10:00", "+", "24h"], &anchors).unwrap();
        assert_eq!(hours.text, "2026-03-08T11:00:00-04:00");
    }

    #[test]
    fn test_sum_accepts_loose_date_shapes() {
        for (input, expected) in [
            ("2024", "2024-01-02"),
            ("2024-032", "2024-02-02"),
            ("2024-01-01T10", "2024-01-02 10"),
            ("2024/01/31", "2024-02-01"),
        ] {
            let format = if expected.len() > 10 { "YYYY-MM-DD HH" } else { "YYYY-MM-DD" };
            assert_eq!(text(&[input, "+", "1d", "to", format]), expected, "input {input}");
        }
    }

    #[test]
    fn test_date_on_right_of_sum_is_rejected() {
        assert_eq!(
            eval(&["2024-01-01", "+", "2024-01-02"]).unwrap_err(),
            DateCalcError::DateOnRight("2024-01-02".to_string())
        );
        assert_eq!(
            eval(&["now", "-", "today"]).unwrap_err(),
            DateCalcError::DateOnRight("today".to_string())
        );
    }

    #[test]
    fn test_duration_accumulator() {
        let result = eval(&["2d", "+", "3d"]).unwrap();
        assert_eq!(
            result.result,
            Value::Duration(Duration::new(Magnitude::whole(5), Unit::Days))
        );
        assert_eq!(result.text, "5days");
    }

    #[test]
    fn test_duration_accumulator_is_exact_for_decimals() {
        assert_eq!(text(&["0.1h", "+", "0.2h"]), "0.3hours");
        assert_eq!(text(&["1.1d", "-", "0.3d", "-", "0.8d"]), "0days");
        assert_eq!(text(&["2w", "-", "2.75w"]), "-0.75weeks");
    }

    #[test]
    fn test_duration_accumulator_rejects_mixed_units() {
        let err = eval(&["2d", "+", "3h"]).unwrap_err();
        assert_eq!(
            err,
            DateCalcError::IncompatibleUnits {
                left: "days",
                right: "hours"
            }
        );
    }

    #[test]
    fn test_template_on_duration_is_rejected() {
        let err = eval(&["2d", "+", "3d", "to", "YYYY"]).unwrap_err();
        assert!(matches!(err, DateCalcError::InvalidFormat(_)), "got: {err}");
    }

    #[test]
    fn test_sum_onto_boolean_is_type_mismatch() {
        let err = eval(&["now", ">", "today", "+", "1d"]).unwrap_err();
        assert!(matches!(err, DateCalcError::TypeMismatch { found: "a boolean", .. }));
    }

    #[test]
    fn test_out_of_range_sum() {
        let err = eval(&["2024-01-01", "+", "999999999y"]).unwrap_err();
        assert!(matches!(err, DateCalcError::OutOfRange(_)), "got: {err}");
    }

    // ── comparisons ─────────────────────────────────────────────────────

    #[test]
    fn test_comparisons() {
        assert_eq!(text(&["2024-01-01", "=", "2024-01-01T00:00:00Z"]), "true");
        assert_eq!(text(&["2024-01-01", "==", "2024-01-02"]), "false");
        assert_eq!(text(&["2024-01-02", ">", "2024-01-01"]), "true");
        assert_eq!(text(&["2024-01-02", "after", "2024-01-02"]), "false");
        assert_eq!(text(&["2024-01-02", ">=", "2024-01-02"]), "true");
        assert_eq!(text(&["2024-01-01", "<", "2024-01-02"]), "true");
        assert_eq!(text(&["2024-01-01", "before", "2024-01-01"]), "false");
        assert_eq!(text(&["2024-01-01", "<=", "2024-01-01"]), "true");
        assert_eq!(text(&["2024-01-01", "same-or-before", "2023-12-31"]), "false");
    }

    #[test]
    fn test_anchors_are_frozen_within_one_evaluation() {
        assert_eq!(text(&["today", "+", "1d", "=", "tomorrow"]), "true");
        assert_eq!(text(&["now", "=", "now"]), "true");
        assert_eq!(text(&["td", "==", "today"]), "true");
    }

    #[test]
    fn test_comparison_rejects_duration() {
        let err = eval(&["now", ">", "1d"]).unwrap_err();
        assert_eq!(
            err,
            DateCalcError::TypeMismatch {
                operator: ">".to_string(),
                expected: "two dates",
                found: "a duration",
            }
        );
    }

    #[test]
    fn test_comparison_with_format_is_rejected() {
        let err = eval(&["2024-01-01", "=", "2024-01-02", "to", "h"]).unwrap_err();
        assert_eq!(err, DateCalcError::FormatOnComparison("h".to_string()));
    }

    // ── differences ─────────────────────────────────────────────────────

    #[test]
    fn test_diff_in_days() {
        assert_eq!(text(&["2024-01-01", "diff", "2024-01-11", "to", "days"]), "10");
        assert_eq!(text(&["2024-01-11", "--", "2024-01-01", "to", "d"]), "10");
    }

    #[test]
    fn test_diff_defaults_to_milliseconds() {
        assert_eq!(text(&["now", "--", "today"]), "52200000");
        assert_eq!(eval(&["now", "diff", "today"]).unwrap().result, Value::Number(52_200_000));
    }

    #[test]
    fn test_diff_truncates_toward_zero() {
        assert_eq!(text(&["now", "--", "today", "to", "h"]), "14");
        assert_eq!(text(&["2024-01-01", "diff", "2024-01-20", "to", "w"]), "2");
    }

    #[test]
    fn test_diff_in_calendar_months() {
        assert_eq!(text(&["2024-01-31", "diff", "2024-02-29", "to", "M"]), "1");
        assert_eq!(text(&["2024-01-31", "diff", "2024-02-28", "to", "M"]), "0");
        assert_eq!(text(&["2024-01-15", "diff", "2024-03-15", "to", "months"]), "2");
        assert_eq!(text(&["2024-03-15", "diff", "2024-01-15", "to", "months"]), "2");
        assert_eq!(text(&["2020-06-01", "diff", "2024-05-31", "to", "y"]), "3");
    }

    #[test]
    fn test_diff_rejects_non_unit_format() {
        let err = eval(&["now", "diff", "today", "to", "YYYY-MM-DD"]).unwrap_err();
        assert!(matches!(err, DateCalcError::InvalidUnit { .. }), "got: {err}");
    }

    #[test]
    fn test_diff_rejects_duration_operand() {
        let err = eval(&["now", "diff", "3d"]).unwrap_err();
        assert!(matches!(err, DateCalcError::TypeMismatch { found: "a duration", .. }));
    }

    #[test]
    fn test_number_cannot_be_reduced_further() {
        let err = eval(&["now", "diff", "today", "+", "1d"]).unwrap_err();
        assert!(matches!(err, DateCalcError::TypeMismatch { found: "a number", .. }));
    }

    // ── rendering ───────────────────────────────────────────────────────

    #[test]
    fn test_render_default_instant() {
        let value = Value::Instant(anchors().now);
        assert_eq!(render(&value, None).unwrap(), "2026-02-18T14:30:00+00:00");
    }

    #[test]
    fn test_evaluation_serializes() {
        let evaluation = eval(&["2024-01-01", "<", "2024-01-02"]).unwrap();
        let json = serde_json::to_value(&evaluation).unwrap();
        assert_eq!(json["result"]["kind"], "boolean");
        assert_eq!(json["result"]["value"], true);
        assert_eq!(json["text"], "true");
    }
}
