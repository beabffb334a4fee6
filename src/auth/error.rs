//! Error types for the auth module.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur while logging in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The portal rejected the credentials.
    ///
    /// Either the login endpoint answered with a non-success status or it
    /// sent the browser back to a login page.
    #[error("authentication failed (HTTP {status}, landed on {final_url})")]
    AuthenticationFailed {
        /// Status of the final login response.
        status: u16,
        /// URL the login request ended up on after redirects.
        final_url: String,
    },

    /// The login request could not be sent at all.
    #[error("login request failed: {0}")]
    Transport(#[from] TransportError),
}

impl AuthError {
    /// Creates an authentication-failed error.
    pub fn authentication_failed(status: u16, final_url: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            status,
            final_url: final_url.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_failed_display() {
        let error = AuthError::authentication_failed(200, "https://portal.example/login.php");
        let msg = error.to_string();
        assert!(msg.starts_with("authentication failed"), "got: {msg}");
        assert!(msg.contains("HTTP 200"));
        assert!(msg.contains("https://portal.example/login.php"));
    }

    #[test]
    fn test_transport_error_converts() {
        let error: AuthError = TransportError::invalid_url("nope").into();
        assert!(matches!(error, AuthError::Transport(_)));
    }
}
