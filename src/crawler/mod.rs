//! Crawler module for fetching and processing listing pages
//!
//! This module contains the core crawl-and-ingest logic:
//! - HTTP fetching with strict success/failure signaling
//! - Page-level parsing and the pagination termination rule
//! - Fragment-level listing extraction
//! - The sequential crawl loop tying it all together

mod coordinator;
mod fetcher;
mod listing;
mod parser;

pub use coordinator::{run_crawl, CrawlSummary, Crawler};
pub use fetcher::{build_http_client, fetch_page};
pub use listing::{extract_listing, Listing};
pub use parser::{parse_listing_page, ParsedPage};

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl. It opens the store, builds the
/// HTTP client, walks the paginated search results until they run dry, and
/// records the run.
pub async fn crawl(config: Config, config_hash: &str) -> Result<CrawlSummary, CrawlError> {
    run_crawl(config, config_hash).await
}
