//! Shared fixtures for the view model tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use hwcal_calendar::YearRange;
use hwcal_core::StoreError;
use hwcal_store::{Entry, EntryStore, EntryUpdate, MemoryStore, NewEntry};
use parking_lot::Mutex;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchByDate(NaiveDate),
    FetchDates { year: i32, month: u32 },
    Create(NewEntry),
    Update(String),
    Delete(String),
}

/// A [`MemoryStore`] that records calls, can hold a date's fetch until
/// released and can fail on demand.
#[derive(Default)]
pub struct ScriptedStore {
    inner: MemoryStore,
    calls: Mutex<Vec<Call>>,
    gates: Mutex<HashMap<NaiveDate, Arc<Notify>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = NewEntry>,
    {
        Self {
            inner: MemoryStore::with_entries(entries),
            ..Self::default()
        }
    }

    /// Hold the next fetch for `date` until the returned handle is notified.
    pub fn gate(&self, date: NaiveDate) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(date, gate.clone());
        gate
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Call) -> bool,
    {
        self.calls.lock().iter().filter(|c| predicate(c)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn failure() -> StoreError {
        StoreError::Server {
            status: 503,
            message: "unavailable".into(),
        }
    }
}

#[async_trait]
impl EntryStore for ScriptedStore {
    async fn fetch_by_date(&self, date: NaiveDate) -> Result<Vec<Entry>, StoreError> {
        self.record(Call::FetchByDate(date));
        let gate = self.gates.lock().remove(&date);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        self.inner.fetch_by_date(date).await
    }

    async fn fetch_dates_in_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<BTreeSet<NaiveDate>, StoreError> {
        self.record(Call::FetchDates { year, month });
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        self.inner.fetch_dates_in_month(year, month).await
    }

    async fn create(&self, entry: NewEntry) -> Result<Entry, StoreError> {
        self.record(Call::Create(entry.clone()));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        self.inner.create(entry).await
    }

    async fn update(&self, id: &str, update: EntryUpdate) -> Result<Entry, StoreError> {
        self.record(Call::Update(id.to_string()));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        self.inner.update(id, update).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.record(Call::Delete(id.to_string()));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        self.inner.delete(id).await
    }
}

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

pub fn range() -> YearRange {
    YearRange::from_base(2024, 6)
}

pub fn entry(subject: &str, task: &str, on: NaiveDate) -> NewEntry {
    NewEntry::new(subject, task, on).unwrap()
}

/// Let spawned store calls run up to their next await point.
pub async fn yield_a_few() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
