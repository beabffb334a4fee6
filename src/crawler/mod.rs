//! Depth-first mirroring of the portal's container tree.
//!
//! The [`Crawler`] lists a container, classifies each item and dispatches it:
//!
//! - [`ItemKind::File`] - extension probed, bytes written to
//!   `<dir>/<name><ext>`
//! - [`ItemKind::ForwardingLink`] - redirect followed, stub written to
//!   `<dir>/<name>.html`
//! - [`ItemKind::Container`] - `<dir>/<name>/` created and listed in turn
//!
//! Traversal keeps an explicit LIFO worklist. Children are pushed in reverse
//! listing order, so items are processed in exactly the order a recursive
//! walk would visit them: a container's whole subtree is finished before its
//! next sibling starts. There is no cycle detection; the portal is assumed
//! to serve a strict tree.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use lms_mirror::{Crawler, Credentials, PortalConfig, login};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(PortalConfig::default());
//! let session = login(&config, &Credentials::new("user", "secret")).await?;
//! let crawler = Crawler::new(Arc::clone(&config));
//! let report = crawler
//!     .crawl(&session, &config.memberships_url, Path::new("."))
//!     .await;
//! println!("downloaded {} files", report.files_downloaded);
//! # Ok(())
//! # }
//! ```

mod classify;
mod error;
mod filename;
mod listing;
mod materialize;
mod report;
mod resolve;

pub use classify::{CLASSIFICATION_RULES, ClassificationRule, ItemKind, classify};
pub use error::CrawlError;
pub use filename::sanitize_segment;
pub use listing::{ContainerItem, absolutize_url, list_container, parse_listing};
pub use materialize::{
    Materialized, ensure_directory, redirect_stub_html, write_file, write_redirect_stub,
};
pub use report::{CrawlFailure, CrawlReport};
pub use resolve::{extension_for, resolve_forwarding_link};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::PortalConfig;
use crate::transport::{Session, Transport};

/// Receives progress notifications while a crawl runs.
///
/// All methods default to no-ops.
pub trait CrawlObserver: Send + Sync {
    /// A container's directory exists and its listing is about to be fetched.
    fn container_entered(&self, _item: &ContainerItem, _path: &Path) {}

    /// An artifact was created (not called for pre-existing paths).
    fn artifact_written(&self, _kind: ItemKind, _path: &Path) {}

    /// An item could not be mirrored.
    fn item_failed(&self, _failure: &CrawlFailure) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CrawlObserver for NoopObserver {}

/// A listed item waiting to be mirrored into `parent`.
struct Task {
    item: ContainerItem,
    parent: PathBuf,
}

/// Recursive orchestrator for one mirror run.
pub struct Crawler {
    config: Arc<PortalConfig>,
    transport: Transport,
    observer: Arc<dyn CrawlObserver>,
}

impl Crawler {
    /// Creates a crawler using the configured retry bound and no observer.
    #[must_use]
    pub fn new(config: Arc<PortalConfig>) -> Self {
        let transport = Transport::from_config(&config);
        Self {
            config,
            transport,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attaches a progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CrawlObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Mirrors the container at `container_url` into `local_path`.
    ///
    /// Never fails as a whole: every item-level failure is logged, reported
    /// to the observer and collected in the returned [`CrawlReport`].
    #[instrument(skip(self, session, local_path), fields(local_path = %local_path.display()))]
    pub async fn crawl(
        &self,
        session: &Session,
        container_url: &str,
        local_path: &Path,
    ) -> CrawlReport {
        let mut report = CrawlReport::default();
        let root = ContainerItem::new("", container_url);

        if let Err(error) = ensure_directory(local_path).await {
            self.fail(&mut report, ItemKind::Container, &root, &error);
            return report;
        }

        let mut worklist = Vec::new();
        self.expand(session, &root, local_path, &mut worklist, &mut report)
            .await;

        while let Some(task) = worklist.pop() {
            self.process(session, task, &mut worklist, &mut report)
                .await;
        }

        info!(
            containers = report.containers_listed,
            directories = report.directories_created,
            files = report.files_downloaded,
            links = report.links_created,
            skipped = report.skipped_existing,
            failed = report.failures.len(),
            "crawl finished"
        );
        report
    }

    /// Lists `container` and schedules its children under `dir`.
    ///
    /// A failed listing prunes only this branch.
    async fn expand(
        &self,
        session: &Session,
        container: &ContainerItem,
        dir: &Path,
        worklist: &mut Vec<Task>,
        report: &mut CrawlReport,
    ) {
        match list_container(&self.transport, session, &self.config, &container.url).await {
            Ok(items) => {
                report.containers_listed += 1;
                worklist.extend(items.into_iter().rev().map(|item| Task {
                    item,
                    parent: dir.to_path_buf(),
                }));
            }
            Err(error) => self.fail(report, ItemKind::Container, container, &error),
        }
    }

    async fn process(
        &self,
        session: &Session,
        task: Task,
        worklist: &mut Vec<Task>,
        report: &mut CrawlReport,
    ) {
        let Task { item, parent } = task;
        let kind = classify(&item.url);
        let name = sanitize_segment(&item.display_name);

        let result = match kind {
            ItemKind::File => self.mirror_file(session, &item, &parent, &name).await,
            ItemKind::ForwardingLink => self.mirror_link(session, &item, &parent, &name).await,
            ItemKind::Container => {
                let dir = parent.join(&name);
                match ensure_directory(&dir).await {
                    Ok(outcome) => {
                        info!(container = %item.display_name, "checking");
                        self.observer.container_entered(&item, &dir);
                        self.expand(session, &item, &dir, worklist, report).await;
                        Ok((dir, outcome))
                    }
                    Err(error) => Err(error),
                }
            }
        };

        match result {
            Ok((path, outcome)) => {
                if outcome == Materialized::Created {
                    self.observer.artifact_written(kind, &path);
                }
                report.record_outcome(kind, outcome);
            }
            Err(error) => self.fail(report, kind, &item, &error),
        }
    }

    async fn mirror_file(
        &self,
        session: &Session,
        item: &ContainerItem,
        parent: &Path,
        name: &str,
    ) -> Result<(PathBuf, Materialized), CrawlError> {
        let extension = extension_for(
            &self.transport,
            session,
            &self.config.content_types,
            &item.url,
        )
        .await?;
        let path = parent.join(format!("{name}{extension}"));
        let outcome = write_file(&self.transport, session, &path, &item.url).await?;
        Ok((path, outcome))
    }

    async fn mirror_link(
        &self,
        session: &Session,
        item: &ContainerItem,
        parent: &Path,
        name: &str,
    ) -> Result<(PathBuf, Materialized), CrawlError> {
        let target = resolve_forwarding_link(&self.transport, session, &item.url).await?;
        let path = parent.join(format!("{name}.html"));
        let outcome = write_redirect_stub(&path, &target).await?;
        Ok((path, outcome))
    }

    fn fail(
        &self,
        report: &mut CrawlReport,
        kind: ItemKind,
        item: &ContainerItem,
        error: &CrawlError,
    ) {
        warn!(
            kind = %kind,
            item = %item.display_name,
            url = %item.url,
            error = %error,
            "skipping item"
        );
        let failure = CrawlFailure::new(kind, item, error);
        self.observer.item_failed(&failure);
        report.record_failure(failure);
    }
}
