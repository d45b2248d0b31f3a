//! novelfetch: downloads a serialized novel's chapters concurrently and writes one text file.

pub mod assemble;
pub mod cli;
pub mod config;
pub mod model;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use assemble::{render_text, write_book, write_text, WriteError};
pub use model::{Book, ChapterLocator, ChapterResult, ChapterStatus};
pub use crate::scraper::{
    dispatch_all, fetch_chapter, resolve_listing, Fetch, HttpClient, HttpClientBuilder, Progress,
    ScraperError,
};
