//! Crawl coordinator - the pagination loop
//!
//! This module orchestrates one crawl invocation: build the URL for the
//! current page, fetch it, parse it, stop when the results run dry, persist
//! what was found, and advance the cursor. The loop is strictly sequential;
//! one page is fully fetched, parsed, and persisted before the next fetch
//! begins, and the pagination cursor is owned by the loop alone.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::parser::parse_listing_page;
use crate::query::{build_url, default_query};
use crate::storage::{ListingStore, SqliteStorage};
use crate::CrawlError;
use reqwest::Client;
use std::collections::BTreeMap;
use std::path::Path;

/// Counters for one finished crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    pub run_id: i64,
    pub pages_fetched: u32,
    pub listings_inserted: u64,
}

/// Main crawler structure
///
/// Owns the HTTP client and the store for the duration of a process; the
/// store connection is opened once here and reused across every page.
pub struct Crawler {
    config: Config,
    config_hash: String,
    client: Client,
    storage: SqliteStorage,
}

impl Crawler {
    /// Creates a new crawler from a validated configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `config_hash` - Hash of the config file, recorded on the run
    pub fn new(config: Config, config_hash: &str) -> Result<Self, CrawlError> {
        let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
        let client = build_http_client(&config.crawler)?;

        Ok(Self {
            config,
            config_hash: config_hash.to_string(),
            client,
            storage,
        })
    }

    /// Runs one crawl invocation to completion
    ///
    /// A run record is created up front and resolved on exit: completed when
    /// pagination ends naturally (an empty page, or the configured page cap),
    /// failed when a fetch, structural parse, or persistence error stops the
    /// loop. Errors are propagated to the caller after the run is marked;
    /// nothing in this loop retries.
    pub async fn run(&mut self) -> Result<CrawlSummary, CrawlError> {
        let run_id = self.storage.create_run(&self.config_hash)?;
        tracing::info!("Starting crawl run {}", run_id);

        match self.crawl_pages(run_id).await {
            Ok((pages_fetched, listings_inserted)) => {
                self.storage
                    .complete_run(run_id, pages_fetched, listings_inserted)?;
                tracing::info!(
                    "Crawl run {} completed: {} pages fetched, {} new listings",
                    run_id,
                    pages_fetched,
                    listings_inserted
                );
                Ok(CrawlSummary {
                    run_id,
                    pages_fetched,
                    listings_inserted,
                })
            }
            Err(e) => {
                tracing::error!("Crawl run {} failed: {}", run_id, e);
                self.storage.fail_run(run_id, &e.to_string())?;
                Err(e)
            }
        }
    }

    /// The pagination loop proper
    ///
    /// The cursor is a zero-based page index; the request offset is
    /// `page * results-per-page`. It advances only after a non-empty page has
    /// been persisted successfully.
    async fn crawl_pages(&mut self, run_id: i64) -> Result<(u32, u64), CrawlError> {
        let base_query = default_query(&self.config.search);

        let mut page: u32 = 0;
        let mut pages_fetched: u32 = 0;
        let mut listings_inserted: u64 = 0;

        loop {
            if let Some(max_pages) = self.config.crawler.max_pages {
                if page >= max_pages {
                    tracing::info!("Reached configured page cap of {}", max_pages);
                    break;
                }
            }

            let offset =
                u64::from(page) * u64::from(self.config.search.results_per_page);
            let mut overrides = BTreeMap::new();
            overrides.insert("s".to_string(), offset.to_string());

            let url = build_url(&self.config.search.base_url, &base_query, &overrides)?;
            tracing::debug!("Fetching page {} at {}", page, url);

            let body = fetch_page(&self.client, url.as_str()).await?;
            pages_fetched += 1;

            let parsed = parse_listing_page(&body)?;
            if parsed.is_empty {
                tracing::info!("Page {} has no listings, pagination exhausted", page);
                break;
            }

            let inserted = self.storage.upsert_all(&parsed.listings, run_id)?;
            listings_inserted += inserted as u64;
            tracing::info!(
                "Page {}: {} listings extracted, {} newly stored",
                page,
                parsed.listings.len(),
                inserted
            );

            page += 1;
        }

        Ok((pages_fetched, listings_inserted))
    }

    /// Read access to the underlying store (stats reporting)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }
}

/// Runs a complete crawl with a freshly constructed crawler
pub async fn run_crawl(config: Config, config_hash: &str) -> Result<CrawlSummary, CrawlError> {
    let mut crawler = Crawler::new(config, config_hash)?;
    crawler.run().await
}
