//! Progress UI (spinner) for mirror runs.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use lms_mirror::{ContainerItem, CrawlFailure, CrawlObserver, ItemKind};

/// Spinner showing the container being checked and running totals.
pub(crate) struct SpinnerObserver {
    spinner: ProgressBar,
    written: AtomicUsize,
    failed: AtomicUsize,
}

impl SpinnerObserver {
    pub(crate) fn start() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message("Listing courses...");
        Self::with_bar(spinner)
    }

    fn with_bar(spinner: ProgressBar) -> Self {
        Self {
            spinner,
            written: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub(crate) fn finish(&self) {
        self.spinner.finish_and_clear();
    }

    fn status_line(&self, current: &str) -> String {
        format!(
            "[{} new, {} failed] Checking {}...",
            self.written.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
            current
        )
    }
}

impl CrawlObserver for SpinnerObserver {
    fn container_entered(&self, item: &ContainerItem, _path: &Path) {
        self.spinner
            .set_message(self.status_line(&item.display_name));
    }

    fn artifact_written(&self, _kind: ItemKind, _path: &Path) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    fn item_failed(&self, _failure: &CrawlFailure) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }
}
