//! Public read-only calendar view.

use std::sync::Arc;

use chrono::NaiveDate;
use hwcal_calendar::YearRange;
use hwcal_core::ValidationError;
use hwcal_store::EntryStore;
use tokio::runtime::Handle;

use super::calendar_view::CalendarView;
use super::feed::CalendarFeed;

pub struct HomeModel {
    feed: CalendarFeed,
}

impl HomeModel {
    pub fn new(
        store: Arc<dyn EntryStore>,
        runtime: Handle,
        range: YearRange,
        today: NaiveDate,
    ) -> Self {
        Self {
            feed: CalendarFeed::new(CalendarView::new(range, today), store, runtime),
        }
    }

    pub fn view(&self) -> &CalendarView {
        self.feed.view()
    }

    /// Load the selected day's entries and the shown month's dates.
    pub fn activate(&mut self) {
        tracing::debug!("Home view activated");
        self.feed.update(CalendarView::refresh_all);
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.feed.update(|view| view.select_date(date));
    }

    pub fn step_prev(&mut self) {
        self.feed.update(CalendarView::step_prev);
    }

    pub fn step_next(&mut self) {
        self.feed.update(CalendarView::step_next);
    }

    pub fn set_month(&mut self, month: i32) -> Result<(), ValidationError> {
        let refreshes = self.feed.update_local(|view| view.set_month(month))?;
        self.feed.run(refreshes);
        Ok(())
    }

    pub fn set_year(&mut self, year: i32) -> Result<(), ValidationError> {
        let refreshes = self.feed.update_local(|view| view.set_year(year))?;
        self.feed.run(refreshes);
        Ok(())
    }

    pub fn jump_to_today(&mut self, today: NaiveDate) {
        self.feed.update(|view| view.jump_to_today(today));
    }

    /// Apply every result that has already arrived. Never blocks.
    pub fn poll_channel(&mut self) {
        while let Some(msg) = self.feed.try_next() {
            if let Some(other) = self.feed.apply(msg) {
                tracing::debug!("Home view ignoring {:?}", other);
            }
        }
    }

    /// Wait until no request is in flight.
    pub async fn settle(&mut self) {
        while self.feed.in_flight() > 0 {
            let Some(msg) = self.feed.next().await else {
                break;
            };
            self.feed.apply(msg);
        }
    }
}
