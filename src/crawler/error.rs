//! Item-level failures during a crawl.
//!
//! None of these abort the crawl: a failed listing prunes its own branch, a
//! failed download or resolution leaves no artifact so the next run retries it.

use std::path::PathBuf;

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur while mirroring a single item.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A container listing could not be fetched; its subtree is skipped.
    #[error("listing failed for {url}: {source}")]
    ListingFailed {
        /// Container URL.
        url: String,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// A file (or its metadata probe) could not be fetched.
    #[error("download failed for {url}: {source}")]
    DownloadFailed {
        /// File URL.
        url: String,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// A forwarding link could not be followed to its target.
    #[error("could not resolve forwarding link {url}: {source}")]
    ResolutionFailed {
        /// Forwarding URL.
        url: String,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// Local filesystem error while materializing an item.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path being created or written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl CrawlError {
    /// Creates a listing failure.
    pub fn listing_failed(url: impl Into<String>, source: TransportError) -> Self {
        Self::ListingFailed {
            url: url.into(),
            source,
        }
    }

    /// Creates a download failure.
    pub fn download_failed(url: impl Into<String>, source: TransportError) -> Self {
        Self::DownloadFailed {
            url: url.into(),
            source,
        }
    }

    /// Creates a resolution failure.
    pub fn resolution_failed(url: impl Into<String>, source: TransportError) -> Self {
        Self::ResolutionFailed {
            url: url.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short stable label for the failure class.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ListingFailed { .. } => "listing",
            Self::DownloadFailed { .. } => "download",
            Self::ResolutionFailed { .. } => "resolution",
            Self::Io { .. } => "io",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_failed_display() {
        let error = CrawlError::listing_failed(
            "https://portal.example/ilias.php?ref=1",
            TransportError::http_status("https://portal.example/ilias.php?ref=1", 500),
        );
        let msg = error.to_string();
        assert!(msg.starts_with("listing failed"), "got: {msg}");
        assert!(msg.contains("ref=1"));
        assert_eq!(error.label(), "listing");
    }

    #[test]
    fn test_io_error_display() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = CrawlError::io("/tmp/mirror/Week 1", source);
        assert!(error.to_string().contains("/tmp/mirror/Week 1"));
        assert_eq!(error.label(), "io");
    }

    #[test]
    fn test_labels_are_distinct() {
        let t = || TransportError::timeout("u");
        let labels = [
            CrawlError::download_failed("u", t()).label(),
            CrawlError::resolution_failed("u", t()).label(),
        ];
        assert_eq!(labels, ["download", "resolution"]);
    }
}
