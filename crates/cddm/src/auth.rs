//! Authentication stub.
//!
//! There is no identity provider behind this: any non-empty username and
//! password pair signs in after a short simulated round trip, and the
//! username becomes the opaque display name shown in the UI chrome.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Simulated network latency of a sign-in.
pub const SIGN_IN_DELAY: Duration = Duration::from_millis(800);

/// Credentials as typed into the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username field
    pub username: String,
    /// Password field; never checked beyond being non-empty
    pub password: String,
}

impl Credentials {
    /// Pair a username with a password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Name shown in the UI chrome
    pub display_name: String,
    /// When the sign-in completed
    pub signed_in_at: DateTime<Utc>,
}

/// User-facing validation failure on the login form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    /// Username or password left empty
    #[error("Please enter credentials")]
    MissingCredentials,
}

/// Check that both fields are filled in.
///
/// # Errors
///
/// Returns [`LoginError::MissingCredentials`] if either field is empty.
pub fn validate(credentials: &Credentials) -> Result<(), LoginError> {
    if credentials.username.is_empty() || credentials.password.is_empty() {
        return Err(LoginError::MissingCredentials);
    }
    Ok(())
}

/// Validate `credentials`, wait `delay`, then open a session.
///
/// Submitting the same credentials again while a sign-in is pending is
/// harmless: each call resolves to a session with the same display name.
///
/// # Errors
///
/// Returns [`LoginError::MissingCredentials`] immediately, without waiting,
/// if either field is empty.
pub async fn sign_in(credentials: &Credentials, delay: Duration) -> Result<Session, LoginError> {
    validate(credentials)?;
    debug!(username = %credentials.username, ?delay, "Signing in");
    tokio::time::sleep(delay).await;
    Ok(Session {
        display_name: credentials.username.clone(),
        signed_in_at: Utc::now(),
    })
}
