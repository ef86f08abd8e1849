//! User model as returned by the identity provider

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated user
///
/// Only a handful of fields are modelled; the provider sends
/// many more and they are ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub app_metadata: AppMetadata,
}

/// Provider-controlled metadata attached to a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppMetadata {
    /// Provider the account was first created with (e.g. "email", "google")
    ///
    /// Linking another identity later does not change it, so it is not the
    /// provider of the current sign-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}
