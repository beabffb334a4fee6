//! Error types for the transport module.
//!
//! A single attempt fails with one of the attempt-level variants; the
//! retrying transport wraps the last of them in [`TransportError::Exhausted`]
//! once the retry bound is spent.

use thiserror::Error;

/// Errors that can occur while talking to the portal.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP response.
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// Every permitted attempt failed; carries the last attempt's error.
    #[error("gave up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        /// The URL that could not be fetched.
        url: String,
        /// Number of requests issued.
        attempts: u32,
        /// Error from the final attempt.
        #[source]
        last: Box<TransportError>,
    },
}

impl TransportError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a retry-exhaustion error wrapping the final attempt's error.
    pub fn exhausted(url: impl Into<String>, attempts: u32, last: TransportError) -> Self {
        Self::Exhausted {
            url: url.into(),
            attempts,
            last: Box::new(last),
        }
    }

    /// Returns the HTTP status of the (last) failed attempt, if it was a status error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Exhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}

// No `From<reqwest::Error>`: every request variant needs the URL, which the
// source error does not reliably carry. Use the constructors above.
