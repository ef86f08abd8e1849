//! Sign-in initiation: provider authorize URL with PKCE

use oauth2::PkceCodeChallenge;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::{config::AppConfig, error::ConfigError};

/// Path of the callback route, relative to the site origin
pub const CALLBACK_PATH: &str = "/admin/auth/callback";

/// OAuth2 providers the admin sign-in can use
///
/// Only providers whose token can read the creator's channel belong here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    /// Get the provider name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
        }
    }
}

/// Authorization request: where to send the browser and the PKCE verifier to
/// keep until the callback
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub pkce_verifier: String,
}

/// Builds authorize URLs for the hosted identity backend
#[derive(Debug, Clone)]
pub struct OAuthClient {
    provider: OAuthProvider,
    authorize_url: Url,
    redirect_to: String,
    scopes: String,
}

impl OAuthClient {
    /// Create a client from the application configuration
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        let authorize_url = Url::parse(&format!("{}/auth/v1/authorize", config.supabase_base()))
            .map_err(|e| ConfigError::Invalid(format!("authorize URL: {}", e)))?;

        Ok(Self {
            provider: config.oauth_provider,
            authorize_url,
            redirect_to: config.redirect_target(CALLBACK_PATH),
            scopes: config.scopes().join(" "),
        })
    }

    /// Generate authorization URL with a fresh S256 PKCE challenge
    pub fn generate_auth_url(&self) -> AuthorizationRequest {
        info!("Generating authorization URL for {:?}", self.provider);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut url = self.authorize_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("provider", self.provider.as_str())
                .append_pair("redirect_to", &self.redirect_to)
                .append_pair("code_challenge", pkce_challenge.as_str())
                .append_pair("code_challenge_method", "s256");
            if !self.scopes.is_empty() {
                query.append_pair("scopes", &self.scopes);
            }
        }

        AuthorizationRequest {
            url: url.to_string(),
            pkce_verifier: pkce_verifier.secret().to_string(),
        }
    }

    /// Get the provider
    pub fn provider(&self) -> OAuthProvider {
        self.provider
    }
}
