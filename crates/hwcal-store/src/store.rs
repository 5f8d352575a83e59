use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use hwcal_core::StoreError;

use crate::types::{Entry, EntryUpdate, NewEntry};

/// Remote persistence for homework entries.
///
/// Every call may fail with a `StoreError`; callers must not assume success.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Entries due on `date`, oldest first. No entries is an empty list, not an error.
    async fn fetch_by_date(&self, date: NaiveDate) -> Result<Vec<Entry>, StoreError>;

    /// Distinct dates in a month (`month` is 1-based) that have at least one entry.
    async fn fetch_dates_in_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<BTreeSet<NaiveDate>, StoreError>;

    async fn create(&self, entry: NewEntry) -> Result<Entry, StoreError>;

    async fn update(&self, id: &str, update: EntryUpdate) -> Result<Entry, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
