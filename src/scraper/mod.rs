//! Fetching and extraction: listing resolution, chapter fetch, and the concurrent dispatcher.

mod client;
mod error;

pub mod chapter;
pub mod dispatch;
pub mod extract;
pub mod listing;
pub mod progress;

pub use chapter::fetch_chapter;
pub use client::{HttpClient, HttpClientBuilder};
pub use dispatch::dispatch_all;
pub use error::ScraperError;
pub use listing::resolve_listing;
pub use progress::Progress;

use reqwest::Url;
use scraper::Selector;
use std::cmp::Ordering;

/// Fetch capability: URL in, page markup out.
///
/// Implemented by [HttpClient]; tests substitute in-memory pages.
pub trait Fetch: Sync {
    fn fetch(&self, url: &str) -> Result<String, ScraperError>;
}

/// Parse a CSS selector or return a parse error (avoids panics from Selector::parse).
pub(crate) fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::Selector {
        selector: sel.to_string(),
        message: e.to_string(),
    })
}

/// Root of the site serving `page_url` (`scheme://host[:port]/`). Chapter links are resolved against it.
pub fn site_origin(page_url: &str) -> Result<Url, ScraperError> {
    let invalid = |reason: String| ScraperError::InvalidUrl {
        input: page_url.to_string(),
        reason,
    };
    let url = Url::parse(page_url).map_err(|e| invalid(e.to_string()))?;
    if url.host_str().is_none() {
        return Err(invalid("URL has no host".to_string()));
    }
    url.join("/").map_err(|e| invalid(e.to_string()))
}

/// Resolve a link target against the site origin. Root-relative (`/x`) and bare (`x`)
/// targets both land under the origin; absolute targets are returned as-is.
pub fn absolutize(origin: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    origin.join(href).ok().map(String::from)
}

/// Numeric ordering key of a chapter label: every digit in the label, concatenated.
///
/// Stored as a digit string without leading zeros so arbitrarily long labels compare
/// exactly. A label with no digits has key 0 (the empty string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelKey(String);

impl LabelKey {
    pub fn from_label(label: &str) -> Self {
        let digits: String = label.chars().filter_map(ascii_digit).collect();
        Self(digits.trim_start_matches('0').to_string())
    }
}

impl Ord for LabelKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for LabelKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Map ASCII and full-width digits to their ASCII form.
fn ascii_digit(c: char) -> Option<char> {
    match c {
        '0'..='9' => Some(c),
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_key_concatenates_all_digits() {
        assert_eq!(LabelKey::from_label("第12章 2人").0, "122");
        assert_eq!(LabelKey::from_label("Chapter 7").0, "7");
    }

    #[test]
    fn label_key_without_digits_is_zero() {
        assert_eq!(LabelKey::from_label("序章").0, "");
        assert_eq!(LabelKey::from_label(""), LabelKey::from_label("0"));
    }

    #[test]
    fn label_key_full_width_digits() {
        assert_eq!(LabelKey::from_label("第１０章").0, "10");
    }

    #[test]
    fn label_key_compares_numerically() {
        assert!(LabelKey::from_label("第9章") < LabelKey::from_label("第10章"));
        assert!(LabelKey::from_label("第010章") > LabelKey::from_label("第9章"));
        assert!(LabelKey::from_label("序") < LabelKey::from_label("第1章"));
    }

    #[test]
    fn label_key_long_digit_runs_do_not_overflow() {
        let a = LabelKey::from_label("99999999999999999999999");
        let b = LabelKey::from_label("100000000000000000000000");
        assert!(a < b);
        assert_eq!(a.0.len(), 23);
    }

    #[test]
    fn site_origin_drops_path_and_query() -> Result<(), ScraperError> {
        let origin = site_origin("https://www.qizi.cc/10031437/2/?page=2")?;
        assert_eq!(origin.as_str(), "https://www.qizi.cc/");
        Ok(())
    }

    #[test]
    fn site_origin_rejects_invalid_url() {
        assert!(matches!(
            site_origin("not-a-url"),
            Err(ScraperError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn absolutize_handles_relative_and_absolute_targets() -> Result<(), ScraperError> {
        let origin = site_origin("https://www.qizi.cc/10031437/")?;
        assert_eq!(
            absolutize(&origin, "/10031437/1.html").as_deref(),
            Some("https://www.qizi.cc/10031437/1.html")
        );
        assert_eq!(
            absolutize(&origin, "10031437/2.html").as_deref(),
            Some("https://www.qizi.cc/10031437/2.html")
        );
        assert_eq!(
            absolutize(&origin, "https://m.qizi.cc/3.html").as_deref(),
            Some("https://m.qizi.cc/3.html")
        );
        assert_eq!(absolutize(&origin, "   "), None);
        Ok(())
    }
}
