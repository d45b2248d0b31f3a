//! Fetch one chapter page and turn it into a [ChapterResult]. Failures become data, not errors.

use crate::model::{ChapterLocator, ChapterResult, ChapterStatus};
use crate::scraper::error::ScraperError;
use crate::scraper::extract::{extract_chapter, ChapterPage};
use crate::scraper::{Fetch, Progress};

/// Prefix of the body written in place of chapter text when the fetch fails.
pub const FAILURE_MARKER: &str = "fetch failed";

/// Fetch and extract one chapter, then report it to `progress`.
///
/// Never fails: a fetch or extraction error yields a result titled with the locator
/// label whose body is `fetch failed: <reason>`.
pub fn fetch_chapter<F: Fetch + ?Sized>(
    fetcher: &F,
    ordinal: u32,
    locator: &ChapterLocator,
    progress: &Progress,
) -> ChapterResult {
    let result = match try_fetch_chapter(fetcher, locator) {
        Ok(page) => ChapterResult {
            ordinal,
            title: page.title,
            body: page.body,
            status: ChapterStatus::Fetched,
        },
        Err(e) => failed_chapter(ordinal, locator, &e),
    };
    progress.record(&locator.label, &result);
    result
}

fn try_fetch_chapter<F: Fetch + ?Sized>(
    fetcher: &F,
    locator: &ChapterLocator,
) -> Result<ChapterPage, ScraperError> {
    let markup = fetcher.fetch(&locator.location)?;
    extract_chapter(&markup, &locator.label)
}

fn failed_chapter(ordinal: u32, locator: &ChapterLocator, err: &ScraperError) -> ChapterResult {
    ChapterResult {
        ordinal,
        title: locator.label.clone(),
        body: format!("{}: {}", FAILURE_MARKER, err),
        status: ChapterStatus::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OnePage(&'static str);

    impl Fetch for OnePage {
        fn fetch(&self, _url: &str) -> Result<String, ScraperError> {
            Ok(self.0.to_string())
        }
    }

    struct NotFound;

    impl Fetch for NotFound {
        fn fetch(&self, url: &str) -> Result<String, ScraperError> {
            Err(ScraperError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
        }
    }

    fn locator() -> ChapterLocator {
        ChapterLocator::new("第3章 入宫", "https://www.qizi.cc/10031437/3.html")
    }

    #[test]
    fn fetched_chapter_uses_page_title_and_body() {
        let page = OnePage(
            r#"<div class="reader-main"><h1 class="title">第3章 入宫（上）</h1></div>
<div id="content"><p>正文一</p><p>正文二</p></div>"#,
        );
        let progress = Progress::hidden(1);
        let ch = fetch_chapter(&page, 3, &locator(), &progress);
        assert_eq!(ch.ordinal, 3);
        assert_eq!(ch.title, "第3章 入宫（上）");
        assert_eq!(ch.body, "正文一\n正文二");
        assert_eq!(ch.status, ChapterStatus::Fetched);
        assert_eq!(progress.completed(), 1);
    }

    #[test]
    fn failed_fetch_becomes_marker_with_label_title() {
        let progress = Progress::hidden(1);
        let ch = fetch_chapter(&NotFound, 7, &locator(), &progress);
        assert_eq!(ch.ordinal, 7);
        assert_eq!(ch.title, "第3章 入宫");
        assert!(ch.body.starts_with("fetch failed: "));
        assert!(ch.body.contains("404"));
        assert!(ch.is_failed());
        assert_eq!(progress.completed(), 1);
    }

    #[test]
    fn empty_page_is_not_a_failure() {
        let progress = Progress::hidden(1);
        let ch = fetch_chapter(&OnePage(""), 1, &locator(), &progress);
        assert_eq!(ch.title, "第3章 入宫");
        assert_eq!(ch.body, "");
        assert_eq!(ch.status, ChapterStatus::Fetched);
    }
}
