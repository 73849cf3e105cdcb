//! Evaluation timezone and the frozen "now"/"today" anchors.
//!
//! Nothing in the evaluator reads the system clock. The caller captures an
//! [`Anchors`] value once per invocation and passes it in, so every reference
//! to `now` or `today` within one expression resolves to the same instant.

use chrono::{
    DateTime, Days, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
    Utc,
};
use chrono_tz::Tz;

use crate::error::{DateCalcError, Result};

/// The timezone naive inputs are read in and results are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The system's local timezone.
    #[default]
    Local,
    /// An IANA timezone.
    Named(Tz),
}

impl Zone {
    /// Parse `"local"` or an IANA timezone name.
    pub fn parse(name: &str) -> Result<Zone> {
        if name.eq_ignore_ascii_case("local") {
            return Ok(Zone::Local);
        }
        name.parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| DateCalcError::InvalidTimezone(format!("'{name}'")))
    }

    /// Read the system clock.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.convert(&Utc::now())
    }

    /// Express an instant in this zone.
    pub fn convert<T: TimeZone>(&self, dt: &DateTime<T>) -> DateTime<FixedOffset> {
        match self {
            Zone::Local => dt.with_timezone(&Local).fixed_offset(),
            Zone::Named(tz) => dt.with_timezone(tz).fixed_offset(),
        }
    }

    /// Wall-clock reading of an instant in this zone.
    pub fn wall_clock<T: TimeZone>(&self, dt: &DateTime<T>) -> NaiveDateTime {
        self.convert(dt).naive_local()
    }

    /// Place a wall-clock reading in this zone.
    ///
    /// Ambiguous readings (DST fall-back) take the earlier instant. Readings
    /// inside a DST gap are pushed forward by an hour.
    pub fn resolve(&self, naive: NaiveDateTime) -> Result<DateTime<FixedOffset>> {
        self.resolve_exact(naive)
            .or_else(|| {
                naive
                    .checked_add_signed(TimeDelta::hours(1))
                    .and_then(|shifted| self.resolve_exact(shifted))
            })
            .ok_or_else(|| {
                DateCalcError::OutOfRange(format!("nonexistent local time {naive}"))
            })
    }

    fn resolve_exact(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Zone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
            Zone::Named(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
        }
    }
}

/// Instants captured once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchors {
    pub zone: Zone,
    pub now: DateTime<FixedOffset>,
    pub today: DateTime<FixedOffset>,
    pub tomorrow: DateTime<FixedOffset>,
    pub yesterday: DateTime<FixedOffset>,
}

impl Anchors {
    /// Capture the anchors from the system clock.
    pub fn capture(zone: Zone) -> Result<Self> {
        Self::at(zone.now(), zone)
    }

    /// Build the anchors around a given "now".
    pub fn at<T: TimeZone>(now: DateTime<T>, zone: Zone) -> Result<Self> {
        let now = zone.convert(&now);
        let date = now.date_naive();
        let start_of_day = |d: NaiveDate| zone.resolve(d.and_time(NaiveTime::MIN));

        let out_of_range = || DateCalcError::OutOfRange(format!("day after or before {date}"));
        let tomorrow = date.checked_add_days(Days::new(1)).ok_or_else(out_of_range)?;
        let yesterday = date.checked_sub_days(Days::new(1)).ok_or_else(out_of_range)?;

        Ok(Anchors {
            zone,
            now,
            today: start_of_day(date)?,
            tomorrow: start_of_day(tomorrow)?,
            yesterday: start_of_day(yesterday)?,
        })
    }
}
