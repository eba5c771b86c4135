//! SQLite storage implementation

use crate::crawler::Listing;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ListingStore, StorageResult};
use crate::storage::{ListingRecord, RunRecord, RunStatus};
use crate::CrawlError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
///
/// One connection is opened per process lifetime and reused for every
/// persistence call; the crawl loop borrows it as a collaborator rather than
/// owning or closing it per page.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> Result<Self, CrawlError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, CrawlError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl ListingStore for SqliteStorage {
    // ===== Listings =====

    fn upsert_listing(&mut self, listing: &Listing, run_id: i64) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();

        // An existing id is left untouched; only a genuinely new listing
        // counts as a change.
        let changed = self.conn.execute(
            "INSERT INTO listings (id, price, url, first_seen_at, discovered_run)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO NOTHING",
            params![listing.id, listing.price, listing.url, now, run_id],
        )?;

        Ok(changed > 0)
    }

    fn upsert_all(&mut self, listings: &[Listing], run_id: i64) -> StorageResult<usize> {
        let mut inserted = 0;
        for listing in listings {
            if self.upsert_listing(listing, run_id)? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    fn get_listing(&self, id: i64) -> StorageResult<Option<ListingRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, price, url, first_seen_at, discovered_run FROM listings WHERE id = ?1",
        )?;

        let listing = stmt
            .query_row(params![id], |row| {
                Ok(ListingRecord {
                    id: row.get(0)?,
                    price: row.get(1)?,
                    url: row.get(2)?,
                    first_seen_at: row.get(3)?,
                    discovered_run: row.get(4)?,
                })
            })
            .optional()?;

        Ok(listing)
    }

    fn count_listings(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64, pages: u32, inserted: u64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_fetched = ?3,
             listings_inserted = ?4 WHERE id = ?5",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                pages,
                inserted as i64,
                run_id
            ],
        )?;
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64, error: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, error_message = ?3 WHERE id = ?4",
            params![RunStatus::Failed.to_db_string(), now, error, run_id],
        )?;
        Ok(())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, status, pages_fetched,
             listings_inserted, error_message
             FROM runs ORDER BY id DESC LIMIT 1",
        )?;

        let run = stmt
            .query_row([], |row| {
                Ok(RunRecord {
                    id: row.get(0)?,
                    started_at: row.get(1)?,
                    finished_at: row.get(2)?,
                    config_hash: row.get(3)?,
                    status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
                        .unwrap_or(RunStatus::Running),
                    pages_fetched: row.get(5)?,
                    listings_inserted: row.get::<_, i64>(6)? as u64,
                    error_message: row.get(7)?,
                })
            })
            .optional()?;

        Ok(run)
    }
}
