//! Calendar-day identifiers.
//!
//! Every date the tracker stores goes through [`DateStamp`], which always
//! renders as ISO 8601 (`YYYY-MM-DD`). The only other shape accepted is the
//! `M/D/YYYY` form some older clients persisted, and it is normalised the
//! moment it is read.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const ISO_FORMAT: &str = "%Y-%m-%d";
const LEGACY_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateStamp(NaiveDate);

impl DateStamp {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Today in the local calendar of the process.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Strips the time of day from an instant, in that instant's own zone.
    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.date_naive())
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// Whole days from `earlier` to `self`; negative when `earlier` is later.
    pub fn days_since(self, earlier: DateStamp) -> i64 {
        (self.0 - earlier.0).num_days()
    }

    pub fn parse(value: &str) -> Result<Self, ParseDateStampError> {
        let trimmed = value.trim();
        NaiveDate::parse_from_str(trimmed, ISO_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(trimmed, LEGACY_FORMAT))
            .map(Self)
            .map_err(|_| ParseDateStampError(value.to_string()))
    }
}

impl fmt::Display for DateStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_FORMAT))
    }
}

impl FromStr for DateStamp {
    type Err = ParseDateStampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date-stamp '{0}', expected YYYY-MM-DD")]
pub struct ParseDateStampError(String);

impl Serialize for DateStamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateStamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateStamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn renders_iso() {
        let stamp = DateStamp::from_ymd(2024, 1, 2).unwrap();
        assert_eq!(stamp.to_string(), "2024-01-02");
    }

    #[test]
    fn accepts_legacy_locale_form() {
        let legacy = DateStamp::parse("1/2/2024").unwrap();
        assert_eq!(legacy, DateStamp::from_ymd(2024, 1, 2).unwrap());
        assert_eq!(legacy.to_string(), "2024-01-02");
    }

    #[test]
    fn rejects_garbage() {
        assert!(DateStamp::parse("yesterday").is_err());
        assert!(DateStamp::parse("2024-13-01").is_err());
    }

    #[test]
    fn strips_time_of_day_in_the_instant_zone() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let instant = tz.with_ymd_and_hms(2024, 1, 2, 1, 30, 0).unwrap();
        assert_eq!(DateStamp::of(&instant).to_string(), "2024-01-02");
        assert_eq!(DateStamp::of(&instant.with_timezone(&Utc)).to_string(), "2024-01-01");
    }

    #[test]
    fn days_since_counts_calendar_days() {
        let a = DateStamp::from_ymd(2024, 2, 27).unwrap();
        let b = DateStamp::from_ymd(2024, 3, 1).unwrap();
        assert_eq!(b.days_since(a), 3);
        assert_eq!(a.days_since(b), -3);
    }
}
