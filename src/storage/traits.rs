//! Storage traits and error types

use crate::crawler::Listing;
use crate::storage::{ListingRecord, RunRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for listing storage backends
///
/// The listing id is the conflict key everywhere: upserting a listing whose
/// id already exists is a successful no-op, never an error. Any other storage
/// failure propagates to the caller.
pub trait ListingStore {
    // ===== Listings =====

    /// Upserts one listing
    ///
    /// Returns true if the listing was newly inserted, false if its id was
    /// already present (in which case the stored record is left untouched).
    fn upsert_listing(&mut self, listing: &Listing, run_id: i64) -> StorageResult<bool>;

    /// Upserts a batch of listings, returning how many were newly inserted
    fn upsert_all(&mut self, listings: &[Listing], run_id: i64) -> StorageResult<usize>;

    /// Gets a stored listing by id
    fn get_listing(&self, id: i64) -> StorageResult<Option<ListingRecord>>;

    /// Counts all stored listings
    fn count_listings(&self) -> StorageResult<u64>;

    // ===== Run Management =====

    /// Creates a new crawl run, returning its id
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file driving the run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as completed with its final counters
    fn complete_run(&mut self, run_id: i64, pages: u32, inserted: u64) -> StorageResult<()>;

    /// Marks a run as failed, recording the error message
    fn fail_run(&mut self, run_id: i64, error: &str) -> StorageResult<()>;

    /// Gets the most recent run, if any
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
