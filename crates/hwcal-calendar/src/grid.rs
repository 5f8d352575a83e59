//! Month grid computation.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::date::{days_in_month, first_of_month, format_date, normalize_month};

/// One cell of the month grid. Padding cells carry no day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateCell {
    pub day: Option<u32>,
    pub date: Option<NaiveDate>,
    pub is_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub has_entry: bool,
}

impl DateCell {
    fn padding() -> Self {
        Self {
            day: None,
            date: None,
            is_current_month: false,
            is_today: false,
            is_selected: false,
            has_entry: false,
        }
    }

    pub fn is_padding(&self) -> bool {
        self.day.is_none()
    }

    pub fn date_string(&self) -> Option<String> {
        self.date.map(format_date)
    }
}

/// Lay out a month Monday-first.
///
/// `month` is zero-based and may lie outside `0..12`; it is carried into the
/// year first, so `-1` is the previous December. The result holds the leading
/// padding cells followed by one cell per day. The last row is never padded.
pub fn compute_grid(
    year: i32,
    month: i32,
    selected: Option<NaiveDate>,
    dates_with_entries: &BTreeSet<NaiveDate>,
    today: NaiveDate,
) -> Vec<DateCell> {
    let (year, month) = normalize_month(year, month);

    let Some(first) = first_of_month(year, month) else {
        tracing::warn!("Month {}-{} is outside the representable range", year, month + 1);
        return Vec::new();
    };

    let padding = first.weekday().num_days_from_monday() as usize;
    let days = days_in_month(year, month);

    let mut cells = Vec::with_capacity(padding + days as usize);
    cells.extend(std::iter::repeat_with(DateCell::padding).take(padding));

    for date in first.iter_days().take(days as usize) {
        cells.push(DateCell {
            day: Some(date.day()),
            date: Some(date),
            is_current_month: true,
            is_today: date == today,
            is_selected: selected == Some(date),
            has_entry: dates_with_entries.contains(&date),
        });
    }

    cells
}
