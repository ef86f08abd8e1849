//! Error types for the admin auth service

use common::error::DatabaseError;
use thiserror::Error;

/// Configuration could not be loaded or is inconsistent
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failure talking to the identity provider
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Identity provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Failure looking up the creator's channel on the video platform
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Video platform request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Video platform rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("The account has no channel")]
    NoChannel,
}

/// Failure writing a profile row
#[derive(Error, Debug)]
pub enum ProfileStoreError {
    #[error("Profile store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Profile store rejected the upsert ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Session cookie could not be encoded or decoded
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session cookie is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Session cookie is not a valid session: {0}")]
    Json(#[from] serde_json::Error),
}

/// Terminal failure of the sign-in callback; the user is sent back to the
/// login page
#[derive(Error, Debug)]
pub enum CallbackError {
    #[error("No PKCE code verifier cookie for the authorization code")]
    MissingVerifier,

    #[error("Code exchange failed: {0}")]
    Exchange(#[source] IdentityError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("No session after sign-in")]
    MissingSession,

    #[error("User lookup failed: {0}")]
    UserLookup(#[source] IdentityError),
}

/// Non-fatal failure of the profile enrichment step
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Store(#[from] ProfileStoreError),
}

/// Extract a human readable message from a JSON error body
///
/// Understands the shapes used by the identity provider
/// (`error_description`, `msg`), the REST layer (`message`) and the
/// video platform (`error.message`). Falls back to the raw body.
pub(crate) fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|value| {
        ["error_description", "msg", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .or_else(|| value.pointer("/error/message").and_then(|v| v.as_str()))
    });

    match message {
        Some(message) => message.to_string(),
        None => body.trim().to_string(),
    }
}
