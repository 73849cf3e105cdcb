//! Free-form date/time input.
//!
//! Accepts the ISO 8601 shapes people type on a command line (down to a bare
//! year, ordinal dates and hour-only times), slash-separated dates, RFC 3339
//! and RFC 2822. Inputs without an offset are read as wall-clock time in the
//! evaluation zone; inputs with an offset are converted into it.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::zone::Zone;

/// Date-times carrying an offset. `%#z` also accepts `Z`, `+hh` and `+hhmm`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y%m%d",
    "%G-W%V-%u",
    "%Y/%m/%d",
    "%m/%d/%Y",
];

/// Parse a token as a calendar instant, or `None` if it is not one.
pub fn parse_instant(token: &str, zone: &Zone) -> Option<DateTime<FixedOffset>> {
    let s = token.trim();
    if s.is_empty() {
        return None;
    }

    try_offset(s)
        .map(|dt| zone.convert(&dt))
        .or_else(|| try_naive_datetime(s).and_then(|naive| zone.resolve(naive).ok()))
        .or_else(|| try_naive_date(s).and_then(|naive| zone.resolve(naive).ok()))
}

fn try_offset(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .or_else(|| DateTime::parse_from_rfc2822(s).ok())
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        })
}

fn try_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| try_date_hour(s))
}

fn try_naive_date(s: &str) -> Option<NaiveDateTime> {
    let date = NAIVE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| try_year_month(s))
        .or_else(|| try_ordinal(s))
        .or_else(|| try_year(s))?;
    Some(date.and_time(NaiveTime::MIN))
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// `YYYY-MM-DDTHH` (or with a space) → on the hour.
fn try_date_hour(s: &str) -> Option<NaiveDateTime> {
    let (date, hour) = s.split_once(['T', ' '])?;
    if !is_digits(hour, 2) {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(hour.parse().ok()?, 0, 0)
}

/// `YYYY-MM` → first day of that month.
fn try_year_month(s: &str) -> Option<NaiveDate> {
    let (year, month) = s.split_once('-')?;
    if !is_digits(year, 4) || !is_digits(month, 2) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// `YYYY-DDD` → that day of the year.
fn try_ordinal(s: &str) -> Option<NaiveDate> {
    let (year, day) = s.split_once('-')?;
    if !is_digits(year, 4) || !is_digits(day, 3) {
        return None;
    }
    NaiveDate::from_yo_opt(year.parse().ok()?, day.parse().ok()?)
}

/// `YYYY` → January 1 of that year.
fn try_year(s: &str) -> Option<NaiveDate> {
    if !is_digits(s, 4) {
        return None;
    }
    NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1)
}
