//! Concurrent chapter fetch over a fixed-size worker pool.

use crate::model::{ChapterLocator, ChapterResult};
use crate::scraper::chapter::fetch_chapter;
use crate::scraper::error::ScraperError;
use crate::scraper::{Fetch, Progress};
use std::sync::mpsc;
use tracing::info;

/// Default number of chapters fetched at once.
pub const DEFAULT_WORKERS: usize = 10;

/// Fetch every locator on a pool of `workers` threads and return the results in ordinal order.
///
/// Ordinals are the 1-based positions in `locators`. Results arrive in completion order
/// and are sorted before returning. Every chapter is waited for; a failed chapter only
/// affects its own slot.
pub fn dispatch_all<F: Fetch + ?Sized>(
    fetcher: &F,
    locators: &[ChapterLocator],
    workers: usize,
    progress: &Progress,
) -> Result<Vec<ChapterResult>, ScraperError> {
    let workers = workers.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("chapter-worker-{}", i))
        .build()
        .map_err(|e| ScraperError::WorkerPool { source: e })?;

    info!("fetching {} chapters with {} workers", locators.len(), workers);

    let (tx, rx) = mpsc::channel::<ChapterResult>();
    pool.scope(move |s| {
        for (ordinal, locator) in (1u32..).zip(locators) {
            let tx = tx.clone();
            s.spawn(move |_| {
                let result = fetch_chapter(fetcher, ordinal, locator, progress);
                // The receiver outlives the scope, so send cannot fail.
                let _ = tx.send(result);
            });
        }
    });

    let mut results: Vec<ChapterResult> = rx.into_iter().collect();
    results.sort_by_key(|r| r.ordinal);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChapterStatus;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves `<h1>` pages whose URLs end in `/<n>`. Later chapters answer faster, and
    /// URLs listed in `fail` return an error.
    struct SlowPages {
        total: u64,
        fail: Vec<String>,
        finished: Mutex<Vec<String>>,
    }

    impl SlowPages {
        fn new(total: u64, fail: &[&str]) -> Self {
            Self {
                total,
                fail: fail.iter().map(|s| s.to_string()).collect(),
                finished: Mutex::new(Vec::new()),
            }
        }
    }

    impl Fetch for SlowPages {
        fn fetch(&self, url: &str) -> Result<String, ScraperError> {
            let n: u64 = url.rsplit('/').next().and_then(|s| s.parse().ok()).unwrap_or(0);
            std::thread::sleep(Duration::from_millis((self.total - n) * 5));
            self.finished.lock().unwrap().push(url.to_string());
            if self.fail.iter().any(|f| f == url) {
                return Err(ScraperError::HttpStatus {
                    status: 500,
                    url: url.to_string(),
                });
            }
            Ok(format!(
                r#"<h1>Chapter {}</h1><div id="content"><p>body {}</p></div>"#,
                n, n
            ))
        }
    }

    fn locators(n: u64) -> Vec<ChapterLocator> {
        (1..=n)
            .map(|i| ChapterLocator::new(format!("第{}章", i), format!("https://x.test/c/{}", i)))
            .collect()
    }

    #[test]
    fn results_are_in_ordinal_order_despite_completion_order() -> Result<(), ScraperError> {
        let fetcher = SlowPages::new(20, &[]);
        let progress = Progress::hidden(20);
        let results = dispatch_all(&fetcher, &locators(20), 10, &progress)?;
        let ordinals: Vec<u32> = results.iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, (1..=20).collect::<Vec<u32>>());
        for r in &results {
            assert_eq!(r.title, format!("Chapter {}", r.ordinal));
            assert_eq!(r.body, format!("body {}", r.ordinal));
        }
        assert_eq!(progress.completed(), 20);
        Ok(())
    }

    #[test]
    fn failed_chapter_keeps_its_slot_and_others_continue() -> Result<(), ScraperError> {
        let fetcher = SlowPages::new(5, &["https://x.test/c/3"]);
        let progress = Progress::hidden(5);
        let results = dispatch_all(&fetcher, &locators(5), 3, &progress)?;
        assert_eq!(results.len(), 5);
        let failed = &results[2];
        assert_eq!(failed.ordinal, 3);
        assert_eq!(failed.title, "第3章");
        assert!(failed.body.starts_with("fetch failed: "));
        assert_eq!(failed.status, ChapterStatus::Failed);
        assert!(results
            .iter()
            .filter(|r| r.ordinal != 3)
            .all(|r| r.status == ChapterStatus::Fetched));
        assert_eq!(fetcher.finished.lock().unwrap().len(), 5);
        Ok(())
    }

    #[test]
    fn zero_workers_runs_with_one() -> Result<(), ScraperError> {
        let fetcher = SlowPages::new(3, &[]);
        let progress = Progress::hidden(3);
        let results = dispatch_all(&fetcher, &locators(3), 0, &progress)?;
        assert_eq!(results.iter().map(|r| r.ordinal).collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(fetcher.finished.lock().unwrap().len(), 3);
        Ok(())
    }

    #[test]
    fn no_locators_yields_no_results() -> Result<(), ScraperError> {
        let fetcher = SlowPages::new(0, &[]);
        let progress = Progress::hidden(0);
        let results = dispatch_all(&fetcher, &[], 4, &progress)?;
        assert!(results.is_empty());
        assert_eq!(progress.completed(), 0);
        Ok(())
    }
}
