//! In-process entry store.
//!
//! Assigns ids and creation timestamps the way the remote store does. Backs
//! the view model tests.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use hwcal_core::StoreError;
use parking_lot::Mutex;

use crate::store::EntryStore;
use crate::types::{Entry, EntryUpdate, NewEntry};

#[derive(Default)]
struct Inner {
    next_id: u64,
    // Insertion order doubles as creation order
    entries: Vec<Entry>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with entries, assigning ids in order.
    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = NewEntry>,
    {
        let store = Self::new();
        for entry in entries {
            store.insert(entry);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, entry: NewEntry) -> Entry {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let created = Entry {
            id: inner.next_id.to_string(),
            subject: entry.subject,
            task: entry.task,
            homework_date: entry.homework_date,
            created_at: Some(Utc::now()),
        };
        inner.entries.push(created.clone());
        created
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn fetch_by_date(&self, date: NaiveDate) -> Result<Vec<Entry>, StoreError> {
        Ok(self
            .inner
            .lock()
            .entries
            .iter()
            .filter(|e| e.homework_date == date)
            .cloned()
            .collect())
    }

    async fn fetch_dates_in_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<BTreeSet<NaiveDate>, StoreError> {
        use chrono::Datelike;

        Ok(self
            .inner
            .lock()
            .entries
            .iter()
            .map(|e| e.homework_date)
            .filter(|d| d.year() == year && d.month() == month)
            .collect())
    }

    async fn create(&self, entry: NewEntry) -> Result<Entry, StoreError> {
        Ok(self.insert(entry))
    }

    async fn update(&self, id: &str, update: EntryUpdate) -> Result<Entry, StoreError> {
        let mut inner = self.inner.lock();
        let entry = inner
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        update.apply_to(entry);
        Ok(entry.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|e| e.id != id);
        if inner.entries.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
