//! Progress reporting shared by all chapter workers.

use crate::model::ChapterResult;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

/// Completed-vs-total counter plus the output it reports to.
///
/// Workers hold a shared reference. Every report takes the lock, so the count and
/// the printed line always agree and lines from different workers never interleave.
pub struct Progress {
    total: usize,
    state: Mutex<ProgressState>,
}

struct ProgressState {
    done: usize,
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Count and log only; no progress bar.
    pub fn hidden(total: usize) -> Self {
        Self {
            total,
            state: Mutex::new(ProgressState { done: 0, bar: None }),
        }
    }

    /// Count, log, and draw a progress bar on stderr.
    pub fn with_bar(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
        {
            bar.set_style(
                style
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                    .progress_chars("█▉▊▋▌▍▎▏ "),
            );
        }
        bar.set_message("Fetching chapters");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self {
            total,
            state: Mutex::new(ProgressState {
                done: 0,
                bar: Some(bar),
            }),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of chapters reported so far.
    pub fn completed(&self) -> usize {
        match self.state.lock() {
            Ok(state) => state.done,
            Err(poisoned) => poisoned.into_inner().done,
        }
    }

    /// Record one finished chapter attempt. `label` is the locator label, used for failures.
    pub fn record(&self, label: &str, result: &ChapterResult) {
        let mut state = match self.state.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.done += 1;
        let done = state.done;
        let total = self.total;
        let emit = || {
            if result.is_failed() {
                warn!(
                    ordinal = result.ordinal,
                    "[{}/{}] failed: {}: {}", done, total, label, result.body
                );
            } else {
                info!(ordinal = result.ordinal, "[{}/{}] fetched: {}", done, total, result.title);
            }
        };
        match &state.bar {
            Some(bar) => {
                bar.suspend(emit);
                bar.set_position(done as u64);
            }
            None => emit(),
        }
    }

    /// Clear the bar, if any.
    pub fn finish(&self) {
        let mut state = match self.state.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(bar) = state.bar.take() {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChapterStatus;
    use std::sync::Arc;

    fn result(ordinal: u32, status: ChapterStatus) -> ChapterResult {
        ChapterResult {
            ordinal,
            title: format!("第{}章", ordinal),
            body: "text".to_string(),
            status,
        }
    }

    #[test]
    fn record_counts_successes_and_failures() {
        let progress = Progress::hidden(3);
        progress.record("a", &result(1, ChapterStatus::Fetched));
        progress.record("b", &result(2, ChapterStatus::Failed));
        assert_eq!(progress.completed(), 2);
        assert_eq!(progress.total(), 3);
    }

    #[test]
    fn record_from_many_threads_counts_every_report() {
        let progress = Arc::new(Progress::hidden(64));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let progress = Arc::clone(&progress);
                std::thread::spawn(move || {
                    for i in 0..8 {
                        progress.record("x", &result(t * 8 + i + 1, ChapterStatus::Fetched));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(progress.completed(), 64);
    }

    #[test]
    fn finish_is_idempotent() {
        let progress = Progress::with_bar(1);
        progress.record("x", &result(1, ChapterStatus::Fetched));
        progress.finish();
        progress.finish();
        assert_eq!(progress.completed(), 1);
    }
}
