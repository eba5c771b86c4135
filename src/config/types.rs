use serde::Deserialize;

/// Main configuration structure for roost
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Search query configuration
///
/// These values parameterize the listing search the crawler walks through.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the listing search endpoint (without query string)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Minimum listing price filter
    #[serde(rename = "min-price")]
    pub min_price: u32,

    /// Maximum listing price filter
    #[serde(rename = "max-price")]
    pub max_price: u32,

    /// Number of results the site returns per page; the pagination offset
    /// advances by this amount per page
    #[serde(rename = "results-per-page", default = "default_results_per_page")]
    pub results_per_page: u32,
}

fn default_results_per_page() -> u32 {
    120
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User agent string sent with each request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional hard cap on the number of pages fetched per run; the natural
    /// stopping condition is an empty results page
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,
}

fn default_user_agent() -> String {
    format!("roost/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}
