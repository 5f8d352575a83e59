//! Connects a [`CalendarView`] to an entry store.
//!
//! Dispatches the refreshes a transition asks for, counts requests in flight
//! and applies fetch results as they arrive.

use std::sync::Arc;

use hwcal_store::EntryStore;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::calendar_view::{CalendarView, Refresh};
use crate::services::{request_fetch_dates, request_fetch_entries, EntryServiceMessage};

pub struct CalendarFeed {
    view: CalendarView,
    store: Arc<dyn EntryStore>,
    runtime: Handle,
    tx: UnboundedSender<EntryServiceMessage>,
    rx: UnboundedReceiver<EntryServiceMessage>,
    in_flight: usize,
}

impl CalendarFeed {
    pub fn new(view: CalendarView, store: Arc<dyn EntryStore>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            view,
            store,
            runtime,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn view(&self) -> &CalendarView {
        &self.view
    }

    /// Run a view transition and dispatch the refreshes it returns.
    pub fn update<F>(&mut self, transition: F)
    where
        F: FnOnce(&mut CalendarView) -> Vec<Refresh>,
    {
        let refreshes = transition(&mut self.view);
        self.run(refreshes);
    }

    /// Run a view transition without fetching anything.
    pub fn update_local<F, R>(&mut self, transition: F) -> R
    where
        F: FnOnce(&mut CalendarView) -> R,
    {
        transition(&mut self.view)
    }

    pub fn run(&mut self, refreshes: Vec<Refresh>) {
        for refresh in refreshes {
            self.view.begin(&refresh);
            self.in_flight += 1;
            match refresh {
                Refresh::Entries { date, ticket } => request_fetch_entries(
                    &self.tx,
                    &self.runtime,
                    self.store.clone(),
                    date,
                    ticket,
                ),
                Refresh::Dates {
                    year,
                    month,
                    ticket,
                } => request_fetch_dates(
                    &self.tx,
                    &self.runtime,
                    self.store.clone(),
                    year,
                    month,
                    ticket,
                ),
            }
        }
    }

    /// Hand out what a mutation request needs, counting it as in flight.
    pub fn begin_request(
        &mut self,
    ) -> (&UnboundedSender<EntryServiceMessage>, &Handle, Arc<dyn EntryStore>) {
        self.in_flight += 1;
        (&self.tx, &self.runtime, self.store.clone())
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn try_next(&mut self) -> Option<EntryServiceMessage> {
        let msg = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(msg)
    }

    /// Wait for the next result. Pending forever when nothing is in flight.
    pub async fn next(&mut self) -> Option<EntryServiceMessage> {
        if self.in_flight == 0 {
            std::future::pending::<()>().await;
        }
        let msg = self.rx.recv().await;
        if msg.is_some() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        msg
    }

    /// Apply a fetch result. Anything else is handed back to the caller.
    pub fn apply(&mut self, msg: EntryServiceMessage) -> Option<EntryServiceMessage> {
        match msg {
            EntryServiceMessage::EntriesLoaded {
                date,
                ticket,
                result,
            } => {
                self.view.apply_entries(date, ticket, result);
                None
            }
            EntryServiceMessage::DatesLoaded {
                year,
                month,
                ticket,
                result,
            } => {
                self.view.apply_dates(year, month, ticket, result);
                None
            }
            other => Some(other),
        }
    }
}
