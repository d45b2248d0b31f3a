//! Shared error type for fetching and extraction.

use thiserror::Error;

/// Errors raised while fetching listing or chapter pages.
///
/// At listing level these abort the run; at chapter level they are turned
/// into a failure marker inside the chapter body.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Network error: could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },

    #[error("No listing pages given. Pass --listing or set listing_urls in the config file.")]
    NoListingUrls,

    #[error("Could not start worker pool: {source}")]
    WorkerPool {
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
}
