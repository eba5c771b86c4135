//! Roost: a classifieds listing harvester
//!
//! This crate implements a crawl-and-ingest pipeline for paginated classifieds
//! search results: it fetches listing pages one at a time, extracts structured
//! records from the markup, stops when pagination runs dry, and persists newly
//! seen listings into a deduplicated SQLite store keyed by listing id.

pub mod config;
pub mod crawler;
pub mod query;
pub mod storage;

use thiserror::Error;

/// Main error type for roost operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Fetch of {url} returned HTTP {status}")]
    Fetch { url: String, status: u16 },

    #[error("Listing container not found in page markup")]
    MissingContainer,

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for roost operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlSummary, Crawler, Listing, ParsedPage};
pub use storage::{ListingStore, SqliteStorage};
