//! GPS time helpers. Leap seconds are ignored: the logs and the reference
//! files both count GPS seconds, so only the calendar labels are affected.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

pub use rinexcheck_parser::day_seconds_from_decimal_hour;

/// 1980-01-06T00:00:00 expressed as a Unix timestamp.
pub const GPS_EPOCH_UNIX_SECONDS: i64 = 315_964_800;

pub fn gps_epoch() -> NaiveDateTime {
    DateTime::<Utc>::from_timestamp(GPS_EPOCH_UNIX_SECONDS, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}

pub fn gps_to_datetime(gps_seconds: f64) -> Option<NaiveDateTime> {
    if !gps_seconds.is_finite() {
        return None;
    }
    let whole = gps_seconds.floor();
    let nanos = (((gps_seconds - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::<Utc>::from_timestamp(GPS_EPOCH_UNIX_SECONDS.checked_add(whole as i64)?, nanos)
        .map(|dt| dt.naive_utc())
}

/// Whole GPS seconds elapsed since the GPS epoch.
pub fn datetime_to_gps(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp() - GPS_EPOCH_UNIX_SECONDS
}

/// `HH:MM` label of a GPS time (seconds since epoch or into the week).
pub fn format_hhmm(gps_seconds: f64) -> Option<String> {
    gps_to_datetime(gps_seconds).map(|dt| dt.format("%H:%M").to_string())
}

/// Calendar timestamp for a seconds-of-day offset within a year/day-of-year.
pub fn datetime_from_year_day(year: i64, day_of_year: i64, day_seconds: i64) -> Option<NaiveDateTime> {
    let date = NaiveDate::from_yo_opt(i32::try_from(year).ok()?, u32::try_from(day_of_year).ok()?)?;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::try_seconds(day_seconds)?)
}

/// `YYYYMMDD_HHMMSS`, appended to report file names.
pub fn timetag(now: NaiveDateTime) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}
