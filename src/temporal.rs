//! Calendar values: [`Date`], [`Time`] and [`DateTime`].
//!
//! Fields are validated on construction. Calendar arithmetic (epoch
//! conversion, the current clock) goes through `chrono`.
//!
//! Each type implements `FromStr` for its Zinc literal form and `Display`
//! for the inverse:
//!
//! ```rust
//! use haystack_zinc::{Date, DateTime, Time};
//!
//! let date: Date = "2011-06-07".parse().unwrap();
//! let time: Time = "09:51:27.354".parse().unwrap();
//! let ts: DateTime = "2011-06-07T09:51:27-04:00 New_York".parse().unwrap();
//!
//! assert_eq!(ts.date(), date);
//! assert_eq!(time.to_string(), "09:51:27.354");
//! assert_eq!(ts.tz(), "New_York");
//! assert_eq!(ts.tz_offset(), -4 * 3600);
//! ```

use crate::{Error, Result};
use chrono::{Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

/// A calendar date.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::Date;
///
/// let d = Date::new(2011, 6, 7).unwrap();
/// assert_eq!(d.to_string(), "2011-06-07");
/// assert!(Date::new(1899, 12, 31).is_err());
/// assert!(Date::new(2011, 13, 1).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date {
    year: i32,
    month: u8,
    day: u8,
}

impl Date {
    /// Creates a date, validating year ≥ 1900, month 1–12 and day 1–31.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(Error::invalid("date", format!("invalid year {}", year)));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::invalid("date", format!("invalid month {}", month)));
        }
        if !(1..=31).contains(&day) {
            return Err(Error::invalid("date", format!("invalid day {}", day)));
        }
        Ok(Date {
            year,
            month: month as u8,
            day: day as u8,
        })
    }

    /// Today's date in UTC.
    #[must_use]
    pub fn today() -> Self {
        Self::from_naive(Utc::now().date_naive())
    }

    pub(crate) fn from_naive(d: NaiveDate) -> Self {
        Date {
            year: d.year(),
            month: d.month() as u8,
            day: d.day() as u8,
        }
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month as u32
    }

    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day as u32
    }

    /// Converts to a `chrono` date. A day past the end of its month rolls
    /// into the following month.
    #[must_use]
    pub fn to_naive(&self) -> NaiveDate {
        // the first of a validated month always exists
        NaiveDate::from_ymd_opt(self.year, self.month(), 1)
            .and_then(|first| first.checked_add_days(Days::new(u64::from(self.day) - 1)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Midnight of this date in the given zone.
    pub fn midnight(&self, tz: &str, tz_offset: i32) -> Result<DateTime> {
        DateTime::new(*self, Time::MIDNIGHT, tz, tz_offset)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for Date {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if !s.is_ascii() || bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(Error::invalid("date", format!("invalid date '{}'", s)));
        }
        let year = parse_digits(&s[0..4], "date", s)?;
        let month = parse_digits(&s[5..7], "date", s)?;
        let day = parse_digits(&s[8..10], "date", s)?;
        Date::new(year as i32, month, day)
    }
}

/// A time of day with millisecond precision.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::Time;
///
/// let t = Time::new(23, 59, 59, 999).unwrap();
/// assert_eq!(t.to_string(), "23:59:59.999");
/// assert!(Time::new(24, 0, 0, 0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Time {
    hour: u8,
    min: u8,
    sec: u8,
    ms: u16,
}

impl Time {
    pub const MIDNIGHT: Time = Time {
        hour: 0,
        min: 0,
        sec: 0,
        ms: 0,
    };

    pub fn new(hour: u32, min: u32, sec: u32, ms: u32) -> Result<Self> {
        if hour > 23 {
            return Err(Error::invalid("time", format!("invalid hour {}", hour)));
        }
        if min > 59 {
            return Err(Error::invalid("time", format!("invalid minute {}", min)));
        }
        if sec > 59 {
            return Err(Error::invalid("time", format!("invalid second {}", sec)));
        }
        if ms > 999 {
            return Err(Error::invalid("time", format!("invalid millisecond {}", ms)));
        }
        Ok(Time {
            hour: hour as u8,
            min: min as u8,
            sec: sec as u8,
            ms: ms as u16,
        })
    }

    pub(crate) fn from_naive(t: NaiveTime) -> Self {
        Time {
            hour: t.hour() as u8,
            min: t.minute() as u8,
            // leap seconds fold into :59
            sec: t.second().min(59) as u8,
            ms: (t.nanosecond() / 1_000_000).min(999) as u16,
        }
    }

    #[must_use]
    pub const fn hour(&self) -> u32 {
        self.hour as u32
    }

    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min as u32
    }

    #[must_use]
    pub const fn sec(&self) -> u32 {
        self.sec as u32
    }

    #[must_use]
    pub const fn ms(&self) -> u32 {
        self.ms as u32
    }

    #[must_use]
    pub fn to_naive(&self) -> NaiveTime {
        NaiveTime::from_hms_milli_opt(self.hour(), self.min(), self.sec(), self.ms())
            .unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.min, self.sec)?;
        if self.ms != 0 {
            write!(f, ".{:03}", self.ms)?;
        }
        Ok(())
    }
}

impl FromStr for Time {
    type Err = Error;

    /// Parses `hh:mm:ss` with an optional fraction of up to nine digits;
    /// digits past the third are truncated.
    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if !s.is_ascii() || bytes.len() < 8 || bytes[2] != b':' || bytes[5] != b':' {
            return Err(Error::invalid("time", format!("invalid time '{}'", s)));
        }
        let hour = parse_digits(&s[0..2], "time", s)?;
        let min = parse_digits(&s[3..5], "time", s)?;
        let sec = parse_digits(&s[6..8], "time", s)?;
        let ms = match &s[8..] {
            "" => 0,
            frac if frac.starts_with('.') && (2..=10).contains(&frac.len()) => {
                let digits = &frac[1..];
                let mut padded = digits.chars().take(3).collect::<String>();
                while padded.len() < 3 {
                    padded.push('0');
                }
                parse_digits(digits, "time", s)?;
                parse_digits(&padded, "time", s)?
            }
            _ => return Err(Error::invalid("time", format!("invalid time '{}'", s))),
        };
        Time::new(hour, min, sec, ms)
    }
}

/// A timestamp: date, time, timezone name and UTC offset in seconds.
///
/// Equality considers all four fields, so two timestamps naming the same
/// instant in different zones are not equal. Ordering is by instant.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::DateTime;
///
/// let ny: DateTime = "2011-06-07T09:51:27-04:00 New_York".parse().unwrap();
/// let utc: DateTime = "2011-06-07T13:51:27Z".parse().unwrap();
/// assert_eq!(ny.millis(), utc.millis());
/// assert_ne!(ny, utc);
/// assert_eq!(utc.to_string(), "2011-06-07T13:51:27Z UTC");
/// ```
#[derive(Clone, Debug)]
pub struct DateTime {
    date: Date,
    time: Time,
    tz: String,
    tz_offset: i32,
    millis: OnceLock<i64>,
}

impl DateTime {
    /// Creates a timestamp. The offset must be a whole number of minutes
    /// below 24 hours and the zone name must be a valid Zinc zone name.
    pub fn new(date: Date, time: Time, tz: &str, tz_offset: i32) -> Result<Self> {
        if !Self::is_tz_name(tz) {
            return Err(Error::invalid("datetime", format!("invalid timezone '{}'", tz)));
        }
        if tz_offset % 60 != 0 || tz_offset.abs() >= 24 * 3600 {
            return Err(Error::invalid(
                "datetime",
                format!("invalid offset {}", tz_offset),
            ));
        }
        Ok(DateTime {
            date,
            time,
            tz: tz.to_string(),
            tz_offset,
            millis: OnceLock::new(),
        })
    }

    /// Creates a UTC timestamp.
    pub fn utc(date: Date, time: Time) -> Self {
        DateTime {
            date,
            time,
            tz: "UTC".to_string(),
            tz_offset: 0,
            millis: OnceLock::new(),
        }
    }

    /// The current instant in UTC.
    #[must_use]
    pub fn now() -> Self {
        let now = Utc::now().naive_utc();
        Self::utc(Date::from_naive(now.date()), Time::from_naive(now.time()))
    }

    /// Creates a timestamp from epoch milliseconds, rendered in the given zone.
    pub fn from_millis(millis: i64, tz: &str, tz_offset: i32) -> Result<Self> {
        let local = millis
            .checked_add(i64::from(tz_offset) * 1000)
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| Error::invalid("datetime", format!("invalid millis {}", millis)))?;
        let naive = local.naive_utc();
        let ts = Self::from_naive(naive, tz, tz_offset)?;
        let _ = ts.millis.set(millis);
        Ok(ts)
    }

    /// Creates a timestamp from a `chrono` value with a fixed offset.
    pub fn from_chrono(dt: &chrono::DateTime<FixedOffset>, tz: &str) -> Result<Self> {
        Self::from_naive(dt.naive_local(), tz, dt.offset().local_minus_utc())
    }

    fn from_naive(naive: NaiveDateTime, tz: &str, tz_offset: i32) -> Result<Self> {
        let date = Date::new(naive.year(), naive.month(), naive.day())?;
        Self::new(date, Time::from_naive(naive.time()), tz, tz_offset)
    }

    /// A zone name starts with an uppercase ASCII letter followed by ASCII
    /// letters, digits, `_`, `-` or `+`.
    #[must_use]
    pub fn is_tz_name(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c.is_ascii_uppercase() => chars.all(Self::is_tz_char),
            _ => false,
        }
    }

    #[inline]
    pub(crate) fn is_tz_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+')
    }

    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    #[must_use]
    pub const fn time(&self) -> Time {
        self.time
    }

    #[must_use]
    pub fn tz(&self) -> &str {
        &self.tz
    }

    /// Offset from UTC in seconds, including any daylight saving adjustment.
    #[must_use]
    pub const fn tz_offset(&self) -> i32 {
        self.tz_offset
    }

    /// Milliseconds since the Unix epoch. Computed on first use.
    #[must_use]
    pub fn millis(&self) -> i64 {
        *self.millis.get_or_init(|| {
            let local = self.date.to_naive().and_time(self.time.to_naive());
            local.and_utc().timestamp_millis() - i64::from(self.tz_offset) * 1000
        })
    }

    /// Converts to a `chrono` timestamp with this value's fixed offset.
    #[must_use]
    pub fn to_chrono(&self) -> Option<chrono::DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.tz_offset)?;
        offset.timestamp_millis_opt(self.millis()).single()
    }
}

impl PartialEq for DateTime {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
            && self.time == other.time
            && self.tz_offset == other.tz_offset
            && self.tz == other.tz
    }
}

impl Eq for DateTime {}

impl Hash for DateTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.date.hash(state);
        self.time.hash(state);
        self.tz.hash(state);
        self.tz_offset.hash(state);
    }
}

impl PartialOrd for DateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.millis()
            .cmp(&other.millis())
            .then_with(|| self.tz.cmp(&other.tz))
            .then_with(|| self.tz_offset.cmp(&other.tz_offset))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}T{}", self.date, self.time)?;
        if self.tz_offset == 0 {
            f.write_str("Z")?;
        } else {
            let sign = if self.tz_offset < 0 { '-' } else { '+' };
            let abs = self.tz_offset.abs();
            write!(f, "{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)?;
        }
        write!(f, " {}", self.tz)
    }
}

impl FromStr for DateTime {
    type Err = Error;

    /// Parses `YYYY-MM-DDThh:mm:ss[.fff](Z|±hh:mm)[ Zone]`. The zone may be
    /// omitted only when the offset is `Z`, in which case it is `UTC`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::invalid("datetime", format!("invalid datetime '{}'", s));
        let (body, tz) = match s.split_once(' ') {
            Some((body, tz)) => (body, Some(tz)),
            None => (s, None),
        };
        if !body.is_ascii() || body.len() < 11 || body.as_bytes()[10] != b'T' {
            return Err(invalid());
        }
        let date: Date = body[..10].parse()?;
        let rest = &body[11..];

        let (time_str, offset) = if let Some(time_str) = rest.strip_suffix('Z') {
            (time_str, 0)
        } else {
            let idx = rest.rfind(['+', '-']).ok_or_else(invalid)?;
            let (time_str, offset_str) = rest.split_at(idx);
            (time_str, parse_offset(offset_str).ok_or_else(invalid)?)
        };
        let time: Time = time_str.parse()?;

        let tz = match tz {
            Some(tz) => tz,
            None if offset == 0 && rest.ends_with('Z') => "UTC",
            None => return Err(invalid()),
        };
        DateTime::new(date, time, tz, offset)
    }
}

// "+hh:mm" or "-hh:mm" to seconds
fn parse_offset(s: &str) -> Option<i32> {
    let bytes = s.as_bytes();
    if bytes.len() != 6 || bytes[3] != b':' {
        return None;
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours: i32 = s[1..3].parse().ok()?;
    let mins: i32 = s[4..6].parse().ok()?;
    if mins > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + mins * 60))
}

fn parse_digits(digits: &str, kind: &'static str, whole: &str) -> Result<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid(kind, format!("invalid {} '{}'", kind, whole)));
    }
    digits
        .parse()
        .map_err(|_| Error::invalid(kind, format!("invalid {} '{}'", kind, whole)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_boundaries() {
        assert!(Date::new(1900, 1, 1).is_ok());
        assert!(Date::new(1899, 1, 1).is_err());
        assert!(Date::new(2011, 0, 1).is_err());
        assert!(Date::new(2011, 13, 1).is_err());
        assert!(Date::new(2011, 1, 0).is_err());
        assert!(Date::new(2011, 1, 32).is_err());
    }

    #[test]
    fn test_date_order_is_field_order() {
        let a = Date::new(2010, 12, 31).unwrap();
        let b = Date::new(2011, 1, 1).unwrap();
        let c = Date::new(2011, 1, 2).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_date_parse() {
        assert_eq!("2011-06-07".parse::<Date>().unwrap(), Date::new(2011, 6, 7).unwrap());
        assert!("2011-6-07".parse::<Date>().is_err());
        assert!("2011-06-07x".parse::<Date>().is_err());
        assert!("20x1-06-07".parse::<Date>().is_err());
    }

    #[test]
    fn test_time_boundaries() {
        assert!(Time::new(23, 59, 59, 999).is_ok());
        assert!(Time::new(24, 0, 0, 0).is_err());
        assert!(Time::new(0, 60, 0, 0).is_err());
        assert!(Time::new(0, 0, 60, 0).is_err());
        assert!(Time::new(0, 0, 0, 1000).is_err());
    }

    #[test]
    fn test_time_parse_fraction() {
        let t: Time = "02:03:04.5".parse().unwrap();
        assert_eq!(t.ms(), 500);
        let t: Time = "02:03:04.123456789".parse().unwrap();
        assert_eq!(t.ms(), 123);
        assert!("02:03:04.".parse::<Time>().is_err());
        assert!("02:03".parse::<Time>().is_err());
        assert_eq!(Time::new(2, 3, 4, 0).unwrap().to_string(), "02:03:04");
        assert_eq!(Time::new(2, 3, 4, 7).unwrap().to_string(), "02:03:04.007");
    }

    #[test]
    fn test_datetime_millis() {
        let ts: DateTime = "1970-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(ts.millis(), 0);

        let ts: DateTime = "1970-01-01T01:00:00.250+01:00 Paris".parse().unwrap();
        assert_eq!(ts.millis(), 250);
    }

    #[test]
    fn test_datetime_from_millis() {
        let ts = DateTime::from_millis(1_307_454_687_000, "New_York", -4 * 3600).unwrap();
        assert_eq!(ts.to_string(), "2011-06-07T09:51:27-04:00 New_York");
        assert_eq!(ts.millis(), 1_307_454_687_000);
    }

    #[test]
    fn test_datetime_equality_vs_order() {
        let a: DateTime = "2011-06-07T09:51:27-04:00 New_York".parse().unwrap();
        let b: DateTime = "2011-06-07T13:51:27Z UTC".parse().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.millis(), b.millis());
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_datetime_requires_zone_unless_z() {
        assert!("2011-06-07T09:51:27-04:00".parse::<DateTime>().is_err());
        assert!("2011-06-07T09:51:27Z".parse::<DateTime>().is_ok());
        assert!("2011-06-07T09:51:27Z London".parse::<DateTime>().is_ok());
        assert!("2011-06-07T09:51:27-04:00 new_york".parse::<DateTime>().is_err());
    }

    #[test]
    fn test_datetime_offset_validation() {
        let d = Date::new(2020, 1, 1).unwrap();
        assert!(DateTime::new(d, Time::MIDNIGHT, "UTC", 30).is_err());
        assert!(DateTime::new(d, Time::MIDNIGHT, "UTC", 24 * 3600).is_err());
        assert!(DateTime::new(d, Time::MIDNIGHT, "Kolkata", 5 * 3600 + 1800).is_ok());
    }

    #[test]
    fn test_chrono_roundtrip() {
        let ts: DateTime = "2021-03-04T05:06:07.008+02:00 Athens".parse().unwrap();
        let chrono_ts = ts.to_chrono().unwrap();
        let back = DateTime::from_chrono(&chrono_ts, "Athens").unwrap();
        assert_eq!(ts, back);
    }

    #[test]
    fn test_overflowing_day_rolls_forward() {
        let d = Date::new(2011, 2, 30).unwrap();
        assert_eq!(d.to_naive(), NaiveDate::from_ymd_opt(2011, 3, 2).unwrap());
    }
}
