//! Credential exchange for an authenticated portal session.
//!
//! Login is a single form POST. There is no retry: a rejected login is
//! terminal and nothing is crawled.

mod error;

pub use error::AuthError;

use std::fmt;

use tracing::{debug, info, instrument, warn};

use crate::config::PortalConfig;
use crate::transport::{Session, TransportError};

/// Username and password for the portal.
///
/// The password is never printed; `Debug` redacts it.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from a username and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Logs in and returns a session carrying the portal's session cookies.
///
/// The login form is posted to [`PortalConfig::login_url`] and redirects are
/// followed. The login counts as rejected when the final status is not a
/// success or when the final URL contains [`PortalConfig::login_marker`]
/// (the portal bounced back to its login page).
///
/// # Errors
///
/// - [`AuthError::AuthenticationFailed`] when the portal rejects the login
/// - [`AuthError::Transport`] when the request cannot be sent
#[instrument(skip(config, credentials), fields(username = %credentials.username, url = %config.login_url))]
pub async fn login(config: &PortalConfig, credentials: &Credentials) -> Result<Session, AuthError> {
    let session = Session::new(config)?;
    let form = &config.login_form;
    let fields = [
        (form.username_field.as_str(), credentials.username.as_str()),
        (form.password_field.as_str(), credentials.password.as_str()),
        (form.submit_field.as_str(), form.submit_value.as_str()),
    ];

    debug!("posting login form");
    let response = session
        .client()
        .post(&config.login_url)
        .form(&fields)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                TransportError::timeout(&config.login_url)
            } else {
                TransportError::network(&config.login_url, e)
            }
        })?;

    let status = response.status();
    let final_url = response.url().to_string();
    if !status.is_success() || final_url.contains(&config.login_marker) {
        warn!(status = status.as_u16(), final_url = %final_url, "login rejected");
        return Err(AuthError::authentication_failed(status.as_u16(), final_url));
    }

    info!("login succeeded");
    Ok(session)
}
