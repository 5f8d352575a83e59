//! Calendar date helpers.
//!
//! Months are zero-based (`0` = January) throughout the calendar crate, the
//! way the navigator and the grid index them. Dates travel as `YYYY-MM-DD`.

use chrono::{Datelike, NaiveDate};
use hwcal_core::ValidationError;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weekday column headers, Monday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// Carry an out-of-range zero-based month into the year.
///
/// `normalize_month(2024, -1)` is December 2023, `normalize_month(2024, 12)`
/// is January 2025.
pub fn normalize_month(year: i32, month: i32) -> (i32, u32) {
    (year + month.div_euclid(12), month.rem_euclid(12) as u32)
}

/// First day of a zero-based month.
pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month + 1, 1)
}

/// Number of days in a zero-based month, or 0 outside chrono's range.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = normalize_month(year, month as i32 + 1);
    first_of_month(next_year, next_month)
        .and_then(|d| d.pred_opt())
        .map_or(0, |d| d.day())
}

/// Last day of a zero-based month.
pub fn last_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month + 1, days_in_month(year, month))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a strict `YYYY-MM-DD` string.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = input.trim();
    let invalid = || ValidationError::InvalidDate(input.to_string());

    if trimmed.len() != 10 {
        return Err(invalid());
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| invalid())?;

    // chrono accepts unpadded fields; the wire format does not
    if format_date(date) != trimmed {
        return Err(invalid());
    }

    Ok(date)
}
