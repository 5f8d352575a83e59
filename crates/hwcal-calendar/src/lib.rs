//! Month calendar computations for the homework tracker.
//!
//! Provides the date grid and the bounded month navigator. Everything here is
//! pure; no I/O happens in this crate.

pub mod date;
pub mod grid;
pub mod navigator;

pub use date::{
    days_in_month, first_of_month, format_date, last_of_month, normalize_month, parse_date,
    MONTH_NAMES, WEEKDAY_LABELS,
};
pub use grid::{compute_grid, DateCell};
pub use navigator::{CalendarCursor, MonthNavigator, YearRange};
