//! Date composition and calendar checks for day/month/year inputs

use chrono::NaiveDate;

/// Compose `YYYY-MM-DD` from raw parts, zero-padding day and month.
///
/// No validation happens here, so the result is also usable for display of
/// partially entered dates.
pub fn compose_date(day: &str, month: &str, year: &str) -> String {
    format!("{year}-{:0>2}-{:0>2}", month, day)
}

/// Whether the parts form a real calendar date, including month lengths and
/// leap years. Years outside `0..=9999` have no four-digit form and are
/// rejected.
pub fn is_valid_calendar_date(day: u32, month: u32, year: i32) -> bool {
    (0..=9999).contains(&year) && NaiveDate::from_ymd_opt(year, month, day).is_some()
}
