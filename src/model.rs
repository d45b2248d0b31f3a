//! Data model for a downloaded book.
//!
//! Locators come out of the listing pages, results come out of the chapter
//! fetchers, and the assembler consumes a [Book] built from the results.

use serde::{Deserialize, Serialize};

/// One chapter link found on a listing page, before its content is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterLocator {
    /// Raw anchor text. Only used to recover the numeric ordering key and as a title fallback.
    pub label: String,
    /// Absolute URL of the chapter page.
    pub location: String,
}

impl ChapterLocator {
    pub fn new(label: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            location: location.into(),
        }
    }
}

/// Whether a chapter's body holds extracted text or a failure marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterStatus {
    Fetched,
    Failed,
}

/// One chapter after its fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterResult {
    /// 1-based position in the sorted locator list, assigned at dispatch.
    pub ordinal: u32,
    pub title: String,
    /// Extracted text, or `fetch failed: ...` when `status` is `Failed`.
    pub body: String,
    pub status: ChapterStatus,
}

impl ChapterResult {
    pub fn is_failed(&self) -> bool {
        self.status == ChapterStatus::Failed
    }
}

/// The book as written to disk: a title and its chapters in ordinal order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub chapters: Vec<ChapterResult>,
}

impl Book {
    pub fn failed_count(&self) -> usize {
        self.chapters.iter().filter(|c| c.is_failed()).count()
    }
}
