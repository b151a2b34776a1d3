//! Historical record storage
//!
//! The store trait the analysis layer reads through, an in-memory store,
//! SQLite persistence and CSV file import.

pub mod database;
pub mod import;
pub mod store;

#[cfg(test)]
pub mod fixtures;

pub use database::{Database, DatabaseStats};
pub use store::{HistoricalRecordStore, MemoryStore};
