//! Month/year navigation bounded to a fixed range of years.
//!
//! Stepping past either end is a no-op; absolute jumps outside the range are
//! rejected without touching the cursor.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use hwcal_core::{CalendarConfig, ValidationError};
use serde::Serialize;

/// Inclusive range of selectable years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    min: i32,
    max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Result<Self, ValidationError> {
        if min > max {
            return Err(ValidationError::OutOfRange {
                field: "max_year",
                value: i64::from(max),
                min: i64::from(min),
                max: i64::from(i32::MAX),
            });
        }
        Ok(Self { min, max })
    }

    /// `span` consecutive years starting at `base` (a span of 0 is treated as 1).
    pub fn from_base(base: i32, span: u32) -> Self {
        let span = span.max(1) as i32;
        Self {
            min: base,
            max: base.saturating_add(span - 1),
        }
    }

    pub fn from_config(config: &CalendarConfig) -> Self {
        Self::from_base(config.base_year, config.year_span)
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    /// Years offered by a picker.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.min..=self.max
    }

    fn clamp(&self, cursor: CalendarCursor) -> CalendarCursor {
        if cursor.year < self.min {
            CalendarCursor::new(self.min, 0)
        } else if cursor.year > self.max {
            CalendarCursor::new(self.max, 11)
        } else {
            cursor
        }
    }
}

/// The month shown by the calendar. `month` is zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarCursor {
    pub year: i32,
    pub month: u32,
}

impl CalendarCursor {
    fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month: month.min(11),
        }
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month0())
    }

    /// Whether `date` falls inside the month under the cursor.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month
    }
}

#[derive(Debug, Clone)]
pub struct MonthNavigator {
    range: YearRange,
    cursor: CalendarCursor,
}

impl MonthNavigator {
    /// Start at the month containing `date`, clamped into `range`.
    pub fn starting_at(range: YearRange, date: NaiveDate) -> Self {
        Self {
            range,
            cursor: range.clamp(CalendarCursor::of_date(date)),
        }
    }

    pub fn cursor(&self) -> CalendarCursor {
        self.cursor
    }

    pub fn range(&self) -> YearRange {
        self.range
    }

    pub fn can_step_prev(&self) -> bool {
        !(self.cursor.year <= self.range.min && self.cursor.month == 0)
    }

    pub fn can_step_next(&self) -> bool {
        !(self.cursor.year >= self.range.max && self.cursor.month == 11)
    }

    /// Move one month back, borrowing from the year. Returns whether the cursor moved.
    pub fn step_prev(&mut self) -> bool {
        if !self.can_step_prev() {
            return false;
        }
        self.cursor = if self.cursor.month == 0 {
            CalendarCursor::new(self.cursor.year - 1, 11)
        } else {
            CalendarCursor::new(self.cursor.year, self.cursor.month - 1)
        };
        true
    }

    /// Move one month forward, carrying into the year. Returns whether the cursor moved.
    pub fn step_next(&mut self) -> bool {
        if !self.can_step_next() {
            return false;
        }
        self.cursor = if self.cursor.month == 11 {
            CalendarCursor::new(self.cursor.year + 1, 0)
        } else {
            CalendarCursor::new(self.cursor.year, self.cursor.month + 1)
        };
        true
    }

    /// Absolute month change (zero-based). Out-of-range values are rejected.
    pub fn set_month(&mut self, month: i32) -> Result<bool, ValidationError> {
        self.jump_to(self.cursor.year, month)
    }

    /// Absolute year change. Years outside the range are rejected.
    pub fn set_year(&mut self, year: i32) -> Result<bool, ValidationError> {
        self.jump_to(year, self.cursor.month as i32)
    }

    pub fn jump_to(&mut self, year: i32, month: i32) -> Result<bool, ValidationError> {
        if !(0..=11).contains(&month) {
            return Err(ValidationError::OutOfRange {
                field: "month",
                value: i64::from(month),
                min: 0,
                max: 11,
            });
        }
        if !self.range.contains(year) {
            return Err(ValidationError::OutOfRange {
                field: "year",
                value: i64::from(year),
                min: i64::from(self.range.min),
                max: i64::from(self.range.max),
            });
        }

        let next = CalendarCursor::new(year, month as u32);
        let changed = next != self.cursor;
        self.cursor = next;
        Ok(changed)
    }

    /// Show the month containing `date`, clamped into the range.
    pub fn jump_to_date(&mut self, date: NaiveDate) -> bool {
        let next = self.range.clamp(CalendarCursor::of_date(date));
        let changed = next != self.cursor;
        self.cursor = next;
        changed
    }
}
