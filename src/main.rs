//! Roost main entry point
//!
//! Command-line interface for the roost listing harvester.

use clap::Parser;
use roost::config::load_config_with_hash;
use roost::crawler::crawl;
use roost::storage::{ListingStore, SqliteStorage};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Roost: a classifieds listing harvester
///
/// Roost walks a paginated listing search page by page, extracts listing
/// records from the markup, and persists newly seen listings into a
/// deduplicated SQLite store.
#[derive(Parser, Debug)]
#[command(name = "roost")]
#[command(version)]
#[command(about = "A classifieds listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("roost=info,warn"),
            1 => EnvFilter::new("roost=debug,info"),
            2 => EnvFilter::new("roost=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the effective search
fn handle_dry_run(config: &roost::config::Config) -> Result<(), Box<dyn std::error::Error>> {
    use roost::query::{build_url, default_query};
    use std::collections::BTreeMap;

    println!("=== Roost Dry Run ===\n");

    println!("Search:");
    println!("  Endpoint: {}", config.search.base_url);
    println!(
        "  Price range: {} - {}",
        config.search.min_price, config.search.max_price
    );
    println!("  Results per page: {}", config.search.results_per_page);

    println!("\nCrawler:");
    println!("  User agent: {}", config.crawler.user_agent);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    match config.crawler.max_pages {
        Some(max) => println!("  Page cap: {}", max),
        None => println!("  Page cap: none (runs until results are exhausted)"),
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let mut overrides = BTreeMap::new();
    overrides.insert("s".to_string(), "0".to_string());
    let first_url = build_url(
        &config.search.base_url,
        &default_query(&config.search),
        &overrides,
    )?;

    println!("\n✓ Configuration is valid");
    println!("✓ First request would be: {}", first_url);

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &roost::config::Config) -> Result<(), Box<dyn std::error::Error>> {
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    let total = storage.count_listings()?;
    println!("Stored listings: {}", total);

    match storage.get_latest_run()? {
        Some(run) => {
            println!("\nLatest run: #{}", run.id);
            println!("  Started:  {}", run.started_at);
            println!(
                "  Finished: {}",
                run.finished_at.as_deref().unwrap_or("(still running)")
            );
            println!("  Status:   {}", run.status.to_db_string());
            println!("  Pages fetched: {}", run.pages_fetched);
            println!("  New listings:  {}", run.listings_inserted);
            if let Some(error) = &run.error_message {
                println!("  Error: {}", error);
            }
        }
        None => println!("\nNo runs recorded yet"),
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: roost::config::Config,
    config_hash: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Crawling {} (price {}-{})",
        config.search.base_url,
        config.search.min_price,
        config.search.max_price
    );

    match crawl(config, config_hash).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl completed: {} pages, {} new listings",
                summary.pages_fetched,
                summary.listings_inserted
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
