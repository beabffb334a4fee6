//! LMS Mirror Core Library
//!
//! This library authenticates against a learning-management portal and
//! mirrors its course-content tree onto local storage: containers become
//! directories, downloadable files become local files, and forwarding links
//! become small HTML redirect stubs.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Immutable portal configuration and the content-type table
//! - [`transport`] - Authenticated HTTP requests with bounded retry
//! - [`auth`] - Credential exchange for an authenticated [`Session`]
//! - [`crawler`] - Classification, resolution, materialization and the
//!   depth-first traversal that ties them together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod crawler;
pub mod transport;
mod user_agent;

// Re-export commonly used types
pub use auth::{AuthError, Credentials, login};
pub use config::{ContentTypeTable, DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS, PortalConfig};
pub use crawler::{
    ContainerItem, CrawlError, CrawlFailure, CrawlObserver, CrawlReport, Crawler, ItemKind,
    NoopObserver, classify,
};
pub use transport::{RetryDecision, RetryPolicy, Session, Transport, TransportError};
