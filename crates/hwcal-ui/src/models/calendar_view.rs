//! Calendar view state shared by the Home and Admin views.
//!
//! All transitions are synchronous and return the refreshes they require.
//! Each refresh carries a ticket; a fetched result is applied only if its
//! ticket is still the latest one issued for that slice.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use hwcal_calendar::{compute_grid, CalendarCursor, DateCell, MonthNavigator, YearRange};
use hwcal_core::{StoreError, ValidationError};
use hwcal_store::Entry;

/// A data reload a transition asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Entries { date: NaiveDate, ticket: u64 },
    /// `month` is 0-based
    Dates { year: i32, month: u32, ticket: u64 },
}

#[derive(Debug, Clone)]
pub struct CalendarView {
    navigator: MonthNavigator,
    today: NaiveDate,
    selected: NaiveDate,
    entries: Vec<Entry>,
    dates: BTreeSet<NaiveDate>,
    entries_ticket: u64,
    dates_ticket: u64,
    entries_loading: bool,
    dates_loading: bool,
}

impl CalendarView {
    /// Start on `today`, both as the shown month and the selection.
    pub fn new(range: YearRange, today: NaiveDate) -> Self {
        Self {
            navigator: MonthNavigator::starting_at(range, today),
            today,
            selected: today,
            entries: Vec::new(),
            dates: BTreeSet::new(),
            entries_ticket: 0,
            dates_ticket: 0,
            entries_loading: false,
            dates_loading: false,
        }
    }

    pub fn cursor(&self) -> CalendarCursor {
        self.navigator.cursor()
    }

    pub fn navigator(&self) -> &MonthNavigator {
        &self.navigator
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn dates(&self) -> &BTreeSet<NaiveDate> {
        &self.dates
    }

    pub fn is_loading(&self) -> bool {
        self.entries_loading || self.dates_loading
    }

    pub fn grid(&self) -> Vec<DateCell> {
        let cursor = self.cursor();
        compute_grid(
            cursor.year,
            cursor.month as i32,
            Some(self.selected),
            &self.dates,
            self.today,
        )
    }

    /// Reload both slices.
    pub fn refresh_all(&mut self) -> Vec<Refresh> {
        vec![self.refresh_entries(), self.refresh_dates()]
    }

    pub fn refresh_entries(&mut self) -> Refresh {
        self.entries_ticket += 1;
        Refresh::Entries {
            date: self.selected,
            ticket: self.entries_ticket,
        }
    }

    pub fn refresh_dates(&mut self) -> Refresh {
        self.dates_ticket += 1;
        let cursor = self.cursor();
        Refresh::Dates {
            year: cursor.year,
            month: cursor.month,
            ticket: self.dates_ticket,
        }
    }

    /// Mark a refresh as in flight.
    pub fn begin(&mut self, refresh: &Refresh) {
        match refresh {
            Refresh::Entries { .. } => self.entries_loading = true,
            Refresh::Dates { .. } => self.dates_loading = true,
        }
    }

    /// Select `date`, moving the shown month along if it lies elsewhere.
    pub fn select_date(&mut self, date: NaiveDate) -> Vec<Refresh> {
        let mut refreshes = Vec::new();
        if !self.cursor().contains(date) && self.navigator.jump_to_date(date) {
            refreshes.push(self.refresh_dates());
        }
        if date != self.selected {
            self.selected = date;
            refreshes.push(self.refresh_entries());
        }
        refreshes
    }

    pub fn step_prev(&mut self) -> Vec<Refresh> {
        if self.navigator.step_prev() {
            vec![self.refresh_dates()]
        } else {
            Vec::new()
        }
    }

    pub fn step_next(&mut self) -> Vec<Refresh> {
        if self.navigator.step_next() {
            vec![self.refresh_dates()]
        } else {
            Vec::new()
        }
    }

    pub fn set_month(&mut self, month: i32) -> Result<Vec<Refresh>, ValidationError> {
        let moved = self.navigator.set_month(month)?;
        Ok(if moved { vec![self.refresh_dates()] } else { Vec::new() })
    }

    pub fn set_year(&mut self, year: i32) -> Result<Vec<Refresh>, ValidationError> {
        let moved = self.navigator.set_year(year)?;
        Ok(if moved { vec![self.refresh_dates()] } else { Vec::new() })
    }

    /// Show and select `today` in one step.
    pub fn jump_to_today(&mut self, today: NaiveDate) -> Vec<Refresh> {
        self.today = today;
        let mut refreshes = Vec::new();
        if self.navigator.jump_to_date(today) {
            refreshes.push(self.refresh_dates());
        }
        if self.selected != today {
            self.selected = today;
            refreshes.push(self.refresh_entries());
        }
        refreshes
    }

    /// Apply a fetched entry list. Returns false if the result is stale.
    ///
    /// A failed fetch shows as an empty list.
    pub fn apply_entries(
        &mut self,
        date: NaiveDate,
        ticket: u64,
        result: Result<Vec<Entry>, StoreError>,
    ) -> bool {
        if ticket != self.entries_ticket || date != self.selected {
            tracing::debug!("Discarding stale entries for {} (ticket {})", date, ticket);
            return false;
        }

        self.entries_loading = false;
        self.entries = result.unwrap_or_else(|e| {
            tracing::warn!("Failed to fetch entries for {}: {}", date, e);
            Vec::new()
        });
        true
    }

    /// Apply a fetched date set (`month` 0-based). Returns false if the result is stale.
    pub fn apply_dates(
        &mut self,
        year: i32,
        month: u32,
        ticket: u64,
        result: Result<BTreeSet<NaiveDate>, StoreError>,
    ) -> bool {
        let cursor = self.cursor();
        if ticket != self.dates_ticket || cursor.year != year || cursor.month != month {
            tracing::debug!(
                "Discarding stale dates for {}-{} (ticket {})",
                year,
                month + 1,
                ticket
            );
            return false;
        }

        self.dates_loading = false;
        self.dates = result.unwrap_or_else(|e| {
            tracing::warn!("Failed to fetch dates for {}-{}: {}", year, month + 1, e);
            BTreeSet::new()
        });
        true
    }

    /// Drop all loaded data and invalidate in-flight fetches.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.dates.clear();
        self.entries_ticket += 1;
        self.dates_ticket += 1;
        self.entries_loading = false;
        self.dates_loading = false;
    }

    /// Append a created entry if it belongs to the selected date.
    pub fn insert_entry(&mut self, entry: Entry) -> bool {
        if entry.homework_date != self.selected || self.entry(&entry.id).is_some() {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Replace an entry by id. Returns whether its date changed, in which
    /// case it leaves the list when it no longer matches the selection.
    pub fn replace_entry(&mut self, entry: Entry) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.id == entry.id) else {
            return false;
        };

        let moved = self.entries[index].homework_date != entry.homework_date;
        if entry.homework_date == self.selected {
            self.entries[index] = entry;
        } else {
            self.entries.remove(index);
        }
        moved
    }

    pub fn remove_entry(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(id: &str, day: NaiveDate) -> Entry {
        Entry {
            id: id.to_string(),
            subject: "Math".to_string(),
            task: "p. 12".to_string(),
            homework_date: day,
            created_at: None,
        }
    }

    fn view() -> CalendarView {
        CalendarView::new(YearRange::from_base(2024, 6), date(2024, 2, 10))
    }

    fn entries_ticket(refresh: &Refresh) -> u64 {
        match refresh {
            Refresh::Entries { ticket, .. } => *ticket,
            Refresh::Dates { .. } => panic!("expected entries refresh"),
        }
    }

    #[test]
    fn test_starts_on_today() {
        let view = view();
        assert_eq!(view.selected(), date(2024, 2, 10));
        assert_eq!(view.cursor(), CalendarCursor { year: 2024, month: 1 });
    }

    #[test]
    fn test_select_date_refreshes_entries_only() {
        let mut view = view();
        let refreshes = view.select_date(date(2024, 2, 14));
        assert_eq!(refreshes.len(), 1);
        assert!(matches!(refreshes[0], Refresh::Entries { date: d, .. } if d == date(2024, 2, 14)));

        // Same date again needs nothing
        assert!(view.select_date(date(2024, 2, 14)).is_empty());
    }

    #[test]
    fn test_select_date_in_other_month_moves_cursor() {
        let mut view = view();
        let refreshes = view.select_date(date(2024, 3, 2));
        assert_eq!(refreshes.len(), 2);
        assert_eq!(view.cursor(), CalendarCursor { year: 2024, month: 2 });
    }

    #[test]
    fn test_navigation_refreshes_dates_only() {
        let mut view = view();
        let refreshes = view.step_next();
        assert!(matches!(refreshes.as_slice(), [Refresh::Dates { year: 2024, month: 2, .. }]));
        assert_eq!(view.selected(), date(2024, 2, 10));

        assert!(view.set_month(2).unwrap().is_empty());
        assert!(view.set_year(2031).is_err());
        assert_eq!(view.cursor(), CalendarCursor { year: 2024, month: 2 });
    }

    #[test]
    fn test_step_at_bound_is_noop() {
        let mut view = CalendarView::new(YearRange::from_base(2024, 6), date(2029, 12, 1));
        assert!(view.step_next().is_empty());
        assert!(view.step_next().is_empty());
        assert_eq!(view.cursor(), CalendarCursor { year: 2029, month: 11 });
    }

    #[test]
    fn test_stale_entries_discarded() {
        let mut view = view();
        let first = view.select_date(date(2024, 2, 14));
        let second = view.select_date(date(2024, 2, 15));

        let b = vec![entry("2", date(2024, 2, 15))];
        assert!(view.apply_entries(date(2024, 2, 15), entries_ticket(&second[0]), Ok(b.clone())));

        let a = vec![entry("1", date(2024, 2, 14))];
        assert!(!view.apply_entries(date(2024, 2, 14), entries_ticket(&first[0]), Ok(a)));
        assert_eq!(view.entries(), &b[..]);
    }

    #[test]
    fn test_failed_fetch_degrades_to_empty() {
        let mut view = view();
        view.insert_entry(entry("1", date(2024, 2, 10)));
        let refresh = view.refresh_entries();
        view.begin(&refresh);
        assert!(view.is_loading());

        assert!(view.apply_entries(
            date(2024, 2, 10),
            entries_ticket(&refresh),
            Err(StoreError::Timeout)
        ));
        assert!(view.entries().is_empty());
        assert!(!view.is_loading());
    }

    #[test]
    fn test_jump_to_today_updates_cursor_and_selection() {
        let mut view = view();
        view.step_next();
        view.select_date(date(2024, 3, 5));

        let refreshes = view.jump_to_today(date(2024, 2, 10));
        assert_eq!(refreshes.len(), 2);
        assert_eq!(view.cursor(), CalendarCursor { year: 2024, month: 1 });
        assert_eq!(view.selected(), date(2024, 2, 10));
    }

    #[test]
    fn test_patches_are_idempotent_by_id() {
        let mut view = view();
        let today = date(2024, 2, 10);

        assert!(view.insert_entry(entry("1", today)));
        assert!(!view.insert_entry(entry("1", today)));
        assert!(!view.insert_entry(entry("2", date(2024, 2, 11))));

        let mut edited = entry("1", today);
        edited.subject = "Algebra".into();
        assert!(!view.replace_entry(edited));
        assert_eq!(view.entries()[0].subject, "Algebra");

        assert!(view.replace_entry(entry("1", date(2024, 2, 12))));
        assert!(view.entries().is_empty());

        assert!(!view.remove_entry("1"));
    }

    #[test]
    fn test_clear_invalidates_in_flight() {
        let mut view = view();
        let refreshes = view.refresh_all();
        view.clear();

        for refresh in refreshes {
            let applied = match refresh {
                Refresh::Entries { date, ticket } => view.apply_entries(date, ticket, Ok(vec![])),
                Refresh::Dates { year, month, ticket } => {
                    view.apply_dates(year, month, ticket, Ok(BTreeSet::new()))
                }
            };
            assert!(!applied);
        }
    }

    #[test]
    fn test_grid_marks_dates() {
        let mut view = view();
        let refresh = view.refresh_dates();
        let Refresh::Dates { year, month, ticket } = refresh else {
            panic!("expected dates refresh");
        };
        view.apply_dates(year, month, ticket, Ok([date(2024, 2, 14)].into_iter().collect()));

        let grid = view.grid();
        let fourteenth = grid.iter().find(|c| c.day == Some(14)).unwrap();
        assert!(fourteenth.has_entry);
        let tenth = grid.iter().find(|c| c.day == Some(10)).unwrap();
        assert!(tenth.is_today && tenth.is_selected);
    }
}
