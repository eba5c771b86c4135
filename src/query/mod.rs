//! Request URL construction
//!
//! The listing site takes every search parameter as a query string on a fixed
//! endpoint. This module builds that query from the configured search bounds
//! plus per-request overrides (the pagination offset).

use crate::config::SearchConfig;
use std::collections::BTreeMap;
use url::Url;

/// Builds the fixed base query for a search configuration
///
/// These keys match what the site expects for a filtered listing search:
/// picture-only results, bundled duplicates, a price band, immediate
/// availability, and all posting dates.
pub fn default_query(search: &SearchConfig) -> BTreeMap<String, String> {
    let mut query = BTreeMap::new();
    query.insert("hasPic".to_string(), "1".to_string());
    query.insert("bundleDuplicates".to_string(), "1".to_string());
    query.insert("min_price".to_string(), search.min_price.to_string());
    query.insert("max_price".to_string(), search.max_price.to_string());
    query.insert("availabilityMode".to_string(), "0".to_string());
    query.insert("sale_date".to_string(), "all dates".to_string());
    query
}

/// Builds a request URL from a base endpoint, a base query, and overrides
///
/// Overrides merge into (replace) the base query. The merged parameters are
/// emitted in key order, so the same inputs always produce the same URL.
pub fn build_url(
    base: &str,
    query: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> Result<Url, url::ParseError> {
    let mut merged = query.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }

    let mut url = Url::parse(base)?;
    url.query_pairs_mut().clear().extend_pairs(merged.iter());
    Ok(url)
}
