use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// The single timezone all events are scheduled in.
pub const TIMEZONE: Tz = chrono_tz::Europe::Prague;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Time of day assumed when an event only declares a date.
pub fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(19, 0, 0).unwrap_or_default()
}

/// Attach [`TIMEZONE`] to a wall-clock time. Ambiguous times resolve to the
/// earlier instant; times skipped by a DST change yield `None`.
pub fn localize(naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    TIMEZONE.from_local_datetime(&naive).earliest()
}

/// Midnight at the start of `date` in [`TIMEZONE`].
pub fn start_of_day(date: NaiveDate) -> DateTime<Tz> {
    localize(date.and_time(NaiveTime::MIN))
        .unwrap_or_else(|| TIMEZONE.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Parse an event `start` value.
///
/// Accepts a bare date (the time defaults to 19:00) or a YAML timestamp:
/// `T`, `t` or a space between date and time, optional fractional seconds.
/// An explicit UTC offset is discarded: the wall-clock time is kept and
/// re-interpreted in [`TIMEZONE`].
pub fn parse_start(text: &str) -> Option<DateTime<Tz>> {
    let text = text.trim();
    let normalized;
    let text = if text.as_bytes().get(10) == Some(&b't') {
        normalized = format!("{}T{}", &text[..10], &text[11..]);
        normalized.as_str()
    } else {
        text
    };
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return localize(with_offset.naive_local());
    }
    if let Ok(with_offset) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return localize(with_offset.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return localize(naive);
        }
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    localize(date.and_time(default_start_time()))
}
