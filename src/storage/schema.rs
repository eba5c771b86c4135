//! Database schema definitions

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_fetched INTEGER NOT NULL DEFAULT 0,
    listings_inserted INTEGER NOT NULL DEFAULT 0,
    error_message TEXT
);

-- Deduplicated listing store; the listing id from the site is the primary key
CREATE TABLE IF NOT EXISTS listings (
    id INTEGER PRIMARY KEY,
    price TEXT,
    url TEXT,
    first_seen_at TEXT NOT NULL,
    discovered_run INTEGER REFERENCES runs(id)
);

CREATE INDEX IF NOT EXISTS idx_listings_run ON listings(discovered_run);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
