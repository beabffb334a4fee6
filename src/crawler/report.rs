//! Per-run tally of what the crawl materialized and what it had to skip.

use std::fmt;

use super::{ContainerItem, CrawlError, ItemKind, Materialized};

/// One item that could not be mirrored during this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlFailure {
    /// Failure class label (`listing`, `download`, `resolution`, `io`).
    pub category: &'static str,
    /// How the item was classified.
    pub kind: ItemKind,
    /// Display name of the item (empty for the crawl root).
    pub display_name: String,
    /// Remote URL of the item.
    pub url: String,
    /// Rendered error message.
    pub message: String,
}

impl CrawlFailure {
    pub(crate) fn new(kind: ItemKind, item: &ContainerItem, error: &CrawlError) -> Self {
        Self {
            category: error.label(),
            kind,
            display_name: item.display_name.clone(),
            url: item.url.clone(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for CrawlFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.display_name.is_empty() {
            write!(f, "[{}] {}", self.category, self.message)
        } else {
            write!(
                f,
                "[{}] {} '{}': {}",
                self.category, self.kind, self.display_name, self.message
            )
        }
    }
}

/// Summary of a crawl run.
///
/// Failures are collected rather than raised; a failed item leaves no local
/// artifact, so running the crawl again retries exactly those items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Containers whose listing was fetched.
    pub containers_listed: usize,
    /// Directories created by this run.
    pub directories_created: usize,
    /// Files downloaded by this run.
    pub files_downloaded: usize,
    /// Redirect stubs written by this run.
    pub links_created: usize,
    /// Artifacts left untouched because they already existed.
    pub skipped_existing: usize,
    /// Items that failed, in traversal order.
    pub failures: Vec<CrawlFailure>,
}

impl CrawlReport {
    /// Returns true when no item failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of artifacts written by this run.
    #[must_use]
    pub fn artifacts_written(&self) -> usize {
        self.directories_created + self.files_downloaded + self.links_created
    }

    pub(crate) fn record_outcome(&mut self, kind: ItemKind, outcome: Materialized) {
        match (outcome, kind) {
            (Materialized::AlreadyExisted, _) => self.skipped_existing += 1,
            (Materialized::Created, ItemKind::File) => self.files_downloaded += 1,
            (Materialized::Created, ItemKind::ForwardingLink) => self.links_created += 1,
            (Materialized::Created, ItemKind::Container) => self.directories_created += 1,
        }
    }

    pub(crate) fn record_failure(&mut self, failure: CrawlFailure) {
        self.failures.push(failure);
    }
}
