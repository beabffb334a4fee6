//! Authenticated HTTP requests with bounded retry.
//!
//! [`Transport`] is the sole point of contact with the portal. Each logical
//! request is retried immediately, up to the configured bound, whenever an
//! attempt fails for any reason (non-success status, timeout, network error).
//! Every attempt is a real request, so the server may see duplicate GETs.
//!
//! # Example
//!
//! ```no_run
//! use lms_mirror::{PortalConfig, Session, Transport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PortalConfig::default();
//! let session = Session::new(&config)?;
//! let transport = Transport::from_config(&config);
//! let response = transport.get(&session, &config.memberships_url).await?;
//! println!("final URL: {}", response.url());
//! # Ok(())
//! # }
//! ```

mod error;
mod retry;
mod session;

pub use error::TransportError;
pub use retry::{RetryDecision, RetryPolicy};
pub use session::Session;

use reqwest::{Method, Response};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::PortalConfig;

/// Retrying request executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transport {
    policy: RetryPolicy,
}

impl Transport {
    /// Creates a transport with an explicit retry policy.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Creates a transport using the configured retry bound.
    #[must_use]
    pub fn from_config(config: &PortalConfig) -> Self {
        Self::new(RetryPolicy::with_max_attempts(config.max_attempts))
    }

    /// Returns the retry policy in use.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Issues a GET and returns the first successful response.
    ///
    /// Redirects are followed; [`Response::url`] is the final URL.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] for an unparseable URL (no
    /// request is sent), otherwise [`TransportError::Exhausted`] once every
    /// permitted attempt has failed.
    pub async fn get(&self, session: &Session, url: &str) -> Result<Response, TransportError> {
        self.request(session, Method::GET, url).await
    }

    /// Issues a metadata-only HEAD request with the same retry behaviour as [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn head(&self, session: &Session, url: &str) -> Result<Response, TransportError> {
        self.request(session, Method::HEAD, url).await
    }

    #[instrument(level = "debug", skip(self, session), fields(max_attempts = self.policy.max_attempts()))]
    async fn request(
        &self,
        session: &Session,
        method: Method,
        url: &str,
    ) -> Result<Response, TransportError> {
        Url::parse(url).map_err(|_| TransportError::invalid_url(url))?;

        let mut attempt = 1;
        loop {
            match send_once(session, method.clone(), url).await {
                Ok(response) => {
                    debug!(attempt, status = response.status().as_u16(), "request succeeded");
                    return Ok(response);
                }
                Err(error) => match self.policy.should_retry(attempt) {
                    RetryDecision::Retry { attempt: next } => {
                        debug!(attempt, error = %error, "attempt failed, retrying");
                        attempt = next;
                    }
                    RetryDecision::DoNotRetry { reason } => {
                        warn!(attempt, error = %error, reason = %reason, "request failed");
                        return Err(TransportError::exhausted(url, attempt, error));
                    }
                },
            }
        }
    }
}

async fn send_once(
    session: &Session,
    method: Method,
    url: &str,
) -> Result<Response, TransportError> {
    let response = session
        .client()
        .request(method, url)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                TransportError::timeout(url)
            } else {
                TransportError::network(url, e)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::http_status(url, status.as_u16()));
    }

    Ok(response)
}
