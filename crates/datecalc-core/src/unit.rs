//! Time units and their command-line aliases.
//!
//! Every unit owns a fixed, case-sensitive alias set. The sets are disjoint,
//! and the first alias of each set is the canonical spelling used when a
//! duration is printed or handed to the date arithmetic.

use std::fmt;

use serde::Serialize;

use crate::error::DateCalcError;
use crate::value::Magnitude;

/// One of the eight unit categories a duration can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

/// How a unit is applied to an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reckoning {
    /// Calendar months (a year counts as 12).
    Months(i64),
    /// Calendar days at the same wall-clock time (a week counts as 7).
    Days(i64),
    /// A fixed number of milliseconds.
    Exact(i64),
}

const YEARS: &[&str] = &["years", "year", "y"];
const MONTHS: &[&str] = &["months", "month", "M"];
const WEEKS: &[&str] = &["weeks", "week", "W", "w"];
const DAYS: &[&str] = &["days", "day", "D", "d"];
const HOURS: &[&str] = &["hours", "hour", "h", "H"];
const MINUTES: &[&str] = &["minutes", "minute", "m", "min"];
const SECONDS: &[&str] = &["seconds", "second", "s", "S"];
const MILLISECONDS: &[&str] = &["milliseconds", "millisecond", "ms", "MS", "milli", "millis"];

impl Unit {
    /// All units, largest first.
    pub const ALL: [Unit; 8] = [
        Unit::Years,
        Unit::Months,
        Unit::Weeks,
        Unit::Days,
        Unit::Hours,
        Unit::Minutes,
        Unit::Seconds,
        Unit::Milliseconds,
    ];

    /// The recognized aliases, canonical spelling first.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Unit::Years => YEARS,
            Unit::Months => MONTHS,
            Unit::Weeks => WEEKS,
            Unit::Days => DAYS,
            Unit::Hours => HOURS,
            Unit::Minutes => MINUTES,
            Unit::Seconds => SECONDS,
            Unit::Milliseconds => MILLISECONDS,
        }
    }

    pub fn canonical(self) -> &'static str {
        self.aliases()[0]
    }

    /// Look up the unit an alias belongs to (exact, case-sensitive match).
    pub fn from_alias(alias: &str) -> Option<Unit> {
        Unit::ALL
            .into_iter()
            .find(|unit| unit.aliases().contains(&alias))
    }

    /// Length in milliseconds for units with a fixed length.
    ///
    /// Months and years have no fixed length and return `None`.
    pub fn fixed_millis(self) -> Option<i64> {
        match self {
            Unit::Years | Unit::Months => None,
            Unit::Weeks => Some(7 * 86_400_000),
            Unit::Days => Some(86_400_000),
            Unit::Hours => Some(3_600_000),
            Unit::Minutes => Some(60_000),
            Unit::Seconds => Some(1_000),
            Unit::Milliseconds => Some(1),
        }
    }

    /// Convert a magnitude in this unit to the quantity the arithmetic works on.
    ///
    /// Calendar quantities are rounded half away from zero; exact quantities
    /// are rounded to the nearest millisecond. `None` if the result does not
    /// fit an `i64`.
    pub fn reckon(self, magnitude: Magnitude) -> Option<Reckoning> {
        Some(match self.span() {
            Reckoning::Months(per) => Reckoning::Months(magnitude.round_times(per)?),
            Reckoning::Days(per) => Reckoning::Days(magnitude.round_times(per)?),
            Reckoning::Exact(per) => Reckoning::Exact(magnitude.round_times(per)?),
        })
    }

    /// One of this unit, as the arithmetic sees it.
    pub fn span(self) -> Reckoning {
        match self {
            Unit::Years => Reckoning::Months(12),
            Unit::Months => Reckoning::Months(1),
            Unit::Weeks => Reckoning::Days(7),
            Unit::Days => Reckoning::Days(1),
            Unit::Hours | Unit::Minutes | Unit::Seconds | Unit::Milliseconds => {
                Reckoning::Exact(self.fixed_millis().unwrap_or(1))
            }
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

/// Every alias of every unit, in table order.
pub fn all_aliases() -> impl Iterator<Item = &'static str> {
    Unit::ALL
        .into_iter()
        .flat_map(|unit| unit.aliases().iter().copied())
}

/// Resolve an output-format directive that must name a unit.
pub(crate) fn parse_unit(alias: &str) -> Result<Unit, DateCalcError> {
    Unit::from_alias(alias).ok_or_else(|| DateCalcError::InvalidUnit {
        found: alias.to_string(),
        allowed: all_aliases().collect::<Vec<_>>().join(", "),
    })
}
