//! Session model and related functionality

use serde::{Deserialize, Serialize};

use super::User;

/// Session issued by the identity provider after a successful code exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: User,
    /// Access token of the linked external provider, only present when the
    /// sign-in requested provider scopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_refresh_token: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Provider access token, ignoring empty values
    pub fn provider_token(&self) -> Option<&str> {
        self.provider_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}
