//! Homework entry storage.
//!
//! Defines the entry model, the `EntryStore` capability the views consume,
//! the PostgREST client used in production and an in-memory store.

pub mod client;
pub mod memory;
pub mod store;
pub mod types;

pub use client::HomeworkClient;
pub use memory::MemoryStore;
pub use store::EntryStore;
pub use types::{Entry, EntryUpdate, NewEntry};
