//! Page-level parsing of listing search results
//!
//! One fetched page holds a results container with listing fragments as its
//! children, interleaved with whitespace text nodes the template emits. This
//! module splits the container into fragments, classifies the page as empty
//! or not, and delegates each fragment to the record extractor.

use crate::crawler::listing::{extract_listing, Listing};
use crate::CrawlError;
use scraper::{ElementRef, Html, Selector};

/// Selector for the container holding all listing fragments
const CONTAINER_SELECTOR: &str = "ul.rows";

/// The parsed form of one results page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// Listings successfully extracted from the page's fragments
    pub listings: Vec<Listing>,

    /// Whether the page marks the end of pagination
    pub is_empty: bool,
}

/// Parses a results page into listings plus an emptiness classification
///
/// # Emptiness rule
///
/// A page is empty when its container has at most one element child. The
/// boundary is `<= 1`, not `== 0`: the template may emit a single trailing
/// non-listing node on the last page, and treating that as content would keep
/// the crawl loop running forever.
///
/// # Errors
///
/// A page without the container at all is a structural failure
/// (`CrawlError::MissingContainer`) — the template has changed upstream.
/// That is distinct from a page that merely has zero listings.
///
/// Fragments the extractor rejects (no id) are dropped silently; they do not
/// abort the page.
pub fn parse_listing_page(markup: &str) -> Result<ParsedPage, CrawlError> {
    let document = Html::parse_document(markup);

    let container_selector =
        Selector::parse(CONTAINER_SELECTOR).map_err(|e| CrawlError::Selector {
            selector: CONTAINER_SELECTOR.to_string(),
            message: e.to_string(),
        })?;

    let container = document
        .select(&container_selector)
        .next()
        .ok_or(CrawlError::MissingContainer)?;

    // Element children only; the whitespace text nodes between rows are not
    // fragments.
    let fragments: Vec<ElementRef> = container.children().filter_map(ElementRef::wrap).collect();

    let is_empty = fragments.len() <= 1;

    let listings = fragments
        .into_iter()
        .filter_map(extract_listing)
        .collect::<Vec<_>>();

    Ok(ParsedPage { listings, is_empty })
}
