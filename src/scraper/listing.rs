//! Listing resolution: fetch every listing page in turn and merge their chapter links.

use crate::model::ChapterLocator;
use crate::scraper::error::ScraperError;
use crate::scraper::extract::extract_listing;
use crate::scraper::{site_origin, Fetch, LabelKey};
use std::time::Duration;
use tracing::{info, warn};

/// Fetch each listing page in order and return every chapter locator, sorted by the
/// number in its label.
///
/// Pages are fetched one at a time with `delay` between them. Any fetch error aborts
/// resolution. A page without a chapter section or without links only logs a warning.
pub fn resolve_listing<F: Fetch + ?Sized>(
    fetcher: &F,
    listing_urls: &[String],
    delay: Duration,
) -> Result<Vec<ChapterLocator>, ScraperError> {
    if listing_urls.is_empty() {
        return Err(ScraperError::NoListingUrls);
    }

    let mut locators = Vec::new();
    for (i, url) in listing_urls.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }
        let origin = site_origin(url)?;
        let markup = fetcher.fetch(url)?;
        let page = extract_listing(&markup, &origin)?;
        if !page.has_chapter_section() {
            warn!(
                %url,
                sections = page.section_count,
                "listing page has fewer than two chapter sections"
            );
        }
        if page.locators.is_empty() {
            warn!(%url, "no chapter links found on listing page");
        } else {
            info!(%url, "found {} chapter links", page.locators.len());
        }
        locators.extend(page.locators);
    }

    sort_by_label_number(&mut locators);
    Ok(locators)
}

/// Stable sort by [LabelKey]; equal keys keep their input order.
pub fn sort_by_label_number(locators: &mut [ChapterLocator]) {
    locators.sort_by_cached_key(|l| LabelKey::from_label(&l.label));
}
