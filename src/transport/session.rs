//! The authenticated connection context shared by every request.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::{Client, ClientBuilder};
use tracing::instrument;

use super::TransportError;
use crate::config::PortalConfig;
use crate::user_agent;

/// Opaque HTTP context holding the portal's cookie state.
///
/// A session is created once (normally by [`crate::auth::login`]) and then
/// only borrowed; there is one session per run.
#[derive(Debug)]
pub struct Session {
    client: Client,
    cookie_jar: Arc<Jar>,
}

impl Session {
    /// Creates a fresh, not yet authenticated session.
    ///
    /// The client keeps cookies across requests, follows redirects and
    /// decompresses gzip bodies. The read timeout bounds each idle gap
    /// between reads, not the whole transfer.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] when the HTTP client cannot be
    /// constructed (e.g. TLS backend initialization failure).
    #[instrument(level = "debug", skip(config))]
    pub fn new(config: &PortalConfig) -> Result<Self, TransportError> {
        let cookie_jar = Arc::new(Jar::default());
        let client = base_client_builder(
            Arc::clone(&cookie_jar),
            config.connect_timeout_secs,
            config.read_timeout_secs,
        )
        .build()
        .map_err(|source| TransportError::ClientBuild { source })?;

        Ok(Self { client, cookie_jar })
    }

    /// Returns a reference to the underlying reqwest client.
    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the cookie jar backing this session.
    #[must_use]
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.cookie_jar
    }
}

fn base_client_builder(
    cookie_jar: Arc<Jar>,
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .read_timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_portal_user_agent())
        .cookie_provider(cookie_jar)
}
