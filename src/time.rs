//! Canonicalization of dates and times
//!
//! Two representations coexist on purpose:
//! * the language model exchanges naive local times (`2024-09-25T09:00:00`), which is what [`Normalizer::normalize`] produces,
//! * the iCal serializer needs zoned values, which is what [`Normalizer::to_zoned`] produces.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

/// The format of every normalized time string
pub const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const NAIVE_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A date-time, either as received or already parsed
#[derive(Clone, Debug, PartialEq)]
pub enum TimeValue {
    Text(String),
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

impl From<&str> for TimeValue {
    fn from(s: &str) -> Self {
        TimeValue::Text(s.to_string())
    }
}

impl From<String> for TimeValue {
    fn from(s: String) -> Self {
        TimeValue::Text(s)
    }
}

impl From<NaiveDateTime> for TimeValue {
    fn from(dt: NaiveDateTime) -> Self {
        TimeValue::Naive(dt)
    }
}

impl From<DateTime<FixedOffset>> for TimeValue {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        TimeValue::Zoned(dt)
    }
}

/// Converts time values to and from the configured timezone
#[derive(Clone, Copy, Debug)]
pub struct Normalizer {
    timezone: Tz,
}

impl Normalizer {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Render a value as a naive `YYYY-MM-DDTHH:MM:SS` string.
    ///
    /// Values that carry an offset are first converted into the configured timezone.
    /// Returns `None` when a string is not a readable ISO-8601 date.
    pub fn normalize(&self, value: &TimeValue) -> Option<String> {
        let naive = match value {
            TimeValue::Naive(dt) => *dt,
            TimeValue::Zoned(dt) => dt.with_timezone(&self.timezone).naive_local(),
            TimeValue::Text(s) => match parse_iso(s)? {
                ParsedTime::Naive(dt) => dt,
                ParsedTime::Zoned(dt) => dt.with_timezone(&self.timezone).naive_local(),
            },
        };
        Some(naive.format(NAIVE_FORMAT).to_string())
    }

    /// Parse an ISO-8601 string and attach the configured timezone to it.
    ///
    /// Naive strings are interpreted as local times in that timezone.
    /// For local times that happen twice (DST end), the earliest one is picked.
    /// Local times that are skipped (DST start) are read with the offset in force before the change,
    /// so that `02:30` on a day clocks jump from 02:00 to 03:00 becomes `03:30`.
    pub fn to_zoned(&self, s: &str) -> Option<DateTime<Tz>> {
        match parse_iso(s)? {
            ParsedTime::Zoned(dt) => Some(dt.with_timezone(&self.timezone)),
            ParsedTime::Naive(dt) => match self.timezone.from_local_datetime(&dt) {
                LocalResult::None => Some(self.skip_gap(&dt)),
                local => local.earliest(),
            },
        }
    }

    fn skip_gap(&self, local: &NaiveDateTime) -> DateTime<Tz> {
        let previous_offset = self.timezone.offset_from_utc_datetime(&(*local - Duration::days(1))).fix();
        let utc = *local - Duration::seconds(i64::from(previous_offset.local_minus_utc()));
        self.timezone.from_utc_datetime(&utc)
    }
}

enum ParsedTime {
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

fn parse_iso(s: &str) -> Option<ParsedTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(ParsedTime::Zoned(dt));
    }
    // RFC 3339 requires seconds, ISO-8601 does not
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return Some(ParsedTime::Zoned(dt));
    }

    for format in NAIVE_INPUT_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(ParsedTime::Naive(dt));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(ParsedTime::Naive)
}

/// Whether a string is a readable ISO-8601 date or date-time
pub fn is_iso_date(s: &str) -> bool {
    parse_iso(s).is_some()
}

/// Parse an ISO-8601 string into a naive local time, without any timezone conversion
pub fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    parse_iso(s).map(|parsed| parsed.naive_local())
}

/// Compare two ISO-8601 strings in time.
///
/// Two offset-bearing values are compared as instants, anything else as local wall-clock times.
pub fn compare(a: &str, b: &str) -> Option<Ordering> {
    match (parse_iso(a)?, parse_iso(b)?) {
        (ParsedTime::Zoned(a), ParsedTime::Zoned(b)) => Some(a.cmp(&b)),
        (a, b) => Some(a.naive_local().cmp(&b.naive_local())),
    }
}

impl ParsedTime {
    fn naive_local(&self) -> NaiveDateTime {
        match self {
            ParsedTime::Naive(dt) => *dt,
            ParsedTime::Zoned(dt) => dt.naive_local(),
        }
    }
}
