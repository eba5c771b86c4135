//! Listing record extraction
//!
//! A fragment is the markup subtree for exactly one listing inside the page's
//! results container. Extraction is pure: it reads the fragment and either
//! produces a `Listing` or nothing, never touching network or storage.

use scraper::{ElementRef, Selector};

/// Selector for the row marker carrying the listing id
const ROW_SELECTOR: &str = "li.result-row";

/// Selector for the price element
const PRICE_SELECTOR: &str = "span.result-price";

/// Selector for the gallery link holding the listing URL
const URL_SELECTOR: &str = "a.result-image.gallery";

/// A single extracted listing
///
/// `id` is the natural key; the store never holds two records with the same
/// id. Price and URL are taken verbatim from the markup when present — the
/// price stays site-formatted text (e.g. `"$1,500"`), with no normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub id: i64,
    pub price: Option<String>,
    pub url: Option<String>,
}

/// Extracts a listing from one fragment
///
/// The id comes from the row marker's `data-pid` attribute. A fragment with
/// no marker, no `data-pid`, or a non-numeric value yields `None` — it
/// contributes nothing to the page, and that is not an error. Price and URL
/// are optional; their absence leaves the field unset.
pub fn extract_listing(fragment: ElementRef) -> Option<Listing> {
    let row = find_in_fragment(fragment, ROW_SELECTOR)?;
    let id: i64 = row.value().attr("data-pid")?.parse().ok()?;

    let price = find_in_fragment(fragment, PRICE_SELECTOR)
        .map(|el| el.text().collect::<String>());

    let url = find_in_fragment(fragment, URL_SELECTOR)
        .and_then(|el| el.value().attr("href"))
        .map(str::to_string);

    Some(Listing { id, price, url })
}

/// Finds the first element matching `selector` within a fragment
///
/// The fragment element itself counts as a match; otherwise its descendants
/// are searched in document order.
fn find_in_fragment<'a>(fragment: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    if selector.matches(&fragment) {
        return Some(fragment);
    }
    fragment.select(&selector).next()
}
