//! Date grammar and query windows
//!
//! Input dates use `MM/DD/YYYY HH:MM:SS`, output dates use
//! `yyyy-MM-ddTHH:mm:ss`. Both are wall-clock local time with no offset.

use chrono::{DateTime, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::{Error, Result};

/// `MM/DD/YYYY HH:MM:SS`
pub const INPUT_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// `yyyy-MM-ddTHH:mm:ss`
pub const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Largest `lookup_windows` horizon; larger values are clamped.
pub const MAX_LOOKUP_HORIZON_YEARS: u32 = 100;

/// Parse a CLI date argument.
pub fn parse_input(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), INPUT_FORMAT)
        .map_err(|_| Error::InvalidDate(value.to_string()))
}

/// Format a local timestamp for JSON output.
pub fn format_output(value: &NaiveDateTime) -> String {
    value.format(OUTPUT_FORMAT).to_string()
}

/// Current local wall-clock time.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Seconds since the Unix epoch for a local wall-clock time.
///
/// Ambiguous times (DST fold) resolve to the earlier instant; times inside a
/// DST gap are read as UTC.
pub fn local_to_timestamp(value: &NaiveDateTime) -> f64 {
    let instant = match Local.from_local_datetime(value).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => value.and_utc(),
    };
    instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_nanos()) / 1e9
}

/// Local wall-clock time for seconds since the Unix epoch.
pub fn timestamp_to_local(seconds: f64) -> Option<NaiveDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos).map(|utc| utc.with_timezone(&Local).naive_local())
}

/// Serde adapter for [`OUTPUT_FORMAT`].
pub mod iso_local {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::OUTPUT_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_output(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, OUTPUT_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Half-open time range `[start, end)` handed to a host date predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// `days` whole days starting at the midnight that opens `reference`'s day.
    ///
    /// The end saturates at [`latest`].
    pub fn days_from_midnight(reference: NaiveDateTime, days: u32) -> Self {
        let start = reference.date().and_time(NaiveTime::MIN);
        let end = Duration::try_days(i64::from(days))
            .and_then(|span| start.checked_add_signed(span))
            .map_or_else(latest, |end| end.min(latest()));
        Self::new(start, end)
    }

    /// `years` either side of `reference`.
    pub fn around(reference: NaiveDateTime, years: u32) -> Self {
        let years = i32::try_from(years).unwrap_or(i32::MAX);
        Self::new(shift_years(reference, -years), shift_years(reference, years))
    }

    /// Whether an event spanning `[start, end]` falls in this window.
    ///
    /// Zero-length events count when their instant is inside the window.
    pub fn overlaps(&self, start: &NaiveDateTime, end: &NaiveDateTime) -> bool {
        if start == end {
            return *start >= self.start && *start < self.end;
        }
        *start < self.end && *end > self.start
    }
}

/// Windows scanned by calendar+title lookups, nearest first.
///
/// One year either side of `reference`, then one-year steps alternating
/// forward and backward until `horizon_years` either side is covered.
/// The horizon is clamped to `1..=MAX_LOOKUP_HORIZON_YEARS`.
pub fn lookup_windows(reference: NaiveDateTime, horizon_years: u32) -> Vec<DateWindow> {
    let horizon = horizon_years.clamp(1, MAX_LOOKUP_HORIZON_YEARS) as i32;
    let mut windows = vec![DateWindow::around(reference, 1)];
    for step in 1..horizon {
        windows.push(DateWindow::new(
            shift_years(reference, step),
            shift_years(reference, step + 1),
        ));
        windows.push(DateWindow::new(
            shift_years(reference, -(step + 1)),
            shift_years(reference, -step),
        ));
    }
    windows
}

/// Latest instant a window may reach, the end of year 9999.
pub fn latest() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|day| day.and_hms_opt(23, 59, 59))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Earliest instant a window may reach, the start of year 1.
pub fn earliest() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .map(|day| day.and_time(NaiveTime::MIN))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Move `reference` by whole years, saturating at [`earliest`] / [`latest`].
fn shift_years(reference: NaiveDateTime, years: i32) -> NaiveDateTime {
    let months = years.unsigned_abs().checked_mul(12).map(Months::new);
    let shifted = if years >= 0 {
        months.and_then(|m| reference.checked_add_months(m))
    } else {
        months.and_then(|m| reference.checked_sub_months(m))
    };
    match shifted {
        Some(value) => value.clamp(earliest(), latest()),
        None if years >= 0 => latest(),
        None => earliest(),
    }
}
