//! Entry store backend: async operations on the shared runtime.
//! Results are sent back over a channel and applied by the owning model.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use hwcal_core::StoreError;
use hwcal_store::{Entry, EntryStore, EntryUpdate, NewEntry};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

/// Messages sent from async operations back to the model.
#[derive(Debug)]
pub enum EntryServiceMessage {
    /// Entries for one date, tagged with the ticket the fetch was issued under.
    EntriesLoaded {
        date: NaiveDate,
        ticket: u64,
        result: Result<Vec<Entry>, StoreError>,
    },
    /// Dates with entries for a month (`month` is 0-based).
    DatesLoaded {
        year: i32,
        month: u32,
        ticket: u64,
        result: Result<BTreeSet<NaiveDate>, StoreError>,
    },
    Created(Result<Entry, StoreError>),
    Updated {
        id: String,
        result: Result<Entry, StoreError>,
    },
    Deleted {
        id: String,
        result: Result<(), StoreError>,
    },
}

pub fn request_fetch_entries(
    tx: &UnboundedSender<EntryServiceMessage>,
    runtime: &Handle,
    store: Arc<dyn EntryStore>,
    date: NaiveDate,
    ticket: u64,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = store.fetch_by_date(date).await;
        let _ = tx.send(EntryServiceMessage::EntriesLoaded {
            date,
            ticket,
            result,
        });
    });
}

pub fn request_fetch_dates(
    tx: &UnboundedSender<EntryServiceMessage>,
    runtime: &Handle,
    store: Arc<dyn EntryStore>,
    year: i32,
    month: u32,
    ticket: u64,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        // The store speaks 1-based months
        let result = store.fetch_dates_in_month(year, month + 1).await;
        let _ = tx.send(EntryServiceMessage::DatesLoaded {
            year,
            month,
            ticket,
            result,
        });
    });
}

pub fn request_create(
    tx: &UnboundedSender<EntryServiceMessage>,
    runtime: &Handle,
    store: Arc<dyn EntryStore>,
    entry: NewEntry,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = store.create(entry).await;
        let _ = tx.send(EntryServiceMessage::Created(result));
    });
}

pub fn request_update(
    tx: &UnboundedSender<EntryServiceMessage>,
    runtime: &Handle,
    store: Arc<dyn EntryStore>,
    id: String,
    update: EntryUpdate,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = store.update(&id, update).await;
        let _ = tx.send(EntryServiceMessage::Updated { id, result });
    });
}

pub fn request_delete(
    tx: &UnboundedSender<EntryServiceMessage>,
    runtime: &Handle,
    store: Arc<dyn EntryStore>,
    id: String,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = store.delete(&id).await;
        let _ = tx.send(EntryServiceMessage::Deleted { id, result });
    });
}
