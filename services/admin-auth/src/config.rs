//! Service configuration
//!
//! Values come from the process environment (see `AppConfig` field names,
//! upper-cased) layered over built-in defaults.

use config::{Config, Environment};
use serde::Deserialize;
use url::Url;

use crate::{error::ConfigError, oauth::OAuthProvider};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_OAUTH_SCOPES: &str = "https://www.googleapis.com/auth/youtube.readonly";

/// Where verified profiles are written
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStoreKind {
    /// Hosted REST layer of the backend
    Rest,
    /// Direct PostgreSQL connection (`DATABASE_URL`)
    Postgres,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the hosted backend (`SUPABASE_URL`)
    pub supabase_url: String,
    /// Public anonymous key of the hosted backend (`SUPABASE_ANON_KEY`)
    pub supabase_anon_key: String,
    /// Public origin of the site, used to build absolute redirects
    #[serde(default)]
    pub site_url: Option<String>,
    pub bind_address: String,
    pub youtube_api_url: String,
    pub oauth_provider: OAuthProvider,
    /// Space separated provider scopes requested at sign-in
    pub oauth_scopes: String,
    /// Overrides the derived session cookie name
    #[serde(default)]
    pub auth_cookie_name: Option<String>,
    pub profile_store: ProfileStoreKind,
}

impl AppConfig {
    /// Load the configuration from environment variables
    ///
    /// # Environment Variables
    /// - `SUPABASE_URL`, `SUPABASE_ANON_KEY`: required
    /// - `SITE_URL`: optional public origin
    /// - `BIND_ADDRESS`: listen address (default: "0.0.0.0:3000")
    /// - `YOUTUBE_API_URL`: video platform API base
    /// - `OAUTH_PROVIDER`: "google" (the only supported provider)
    /// - `OAUTH_SCOPES`: provider scopes (default: YouTube read-only)
    /// - `AUTH_COOKIE_NAME`: session cookie name override
    /// - `PROFILE_STORE`: "rest" (default) or "postgres"
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("youtube_api_url", DEFAULT_YOUTUBE_API_URL)?
            .set_default("oauth_provider", "google")?
            .set_default("oauth_scopes", DEFAULT_OAUTH_SCOPES)?
            .set_default("profile_store", "rest")?
            .add_source(Environment::default())
            .build()?;

        let config: AppConfig = raw.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that deserialization cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.supabase_url)
            .map_err(|e| ConfigError::Invalid(format!("SUPABASE_URL: {}", e)))?;
        if url.host_str().is_none() {
            return Err(ConfigError::Invalid("SUPABASE_URL has no host".to_string()));
        }
        if self.supabase_anon_key.trim().is_empty() {
            return Err(ConfigError::Invalid("SUPABASE_ANON_KEY is empty".to_string()));
        }
        if let Some(site_url) = self.site_url() {
            Url::parse(site_url).map_err(|e| ConfigError::Invalid(format!("SITE_URL: {}", e)))?;
        }
        Ok(())
    }

    /// Backend base URL without a trailing slash
    pub fn supabase_base(&self) -> &str {
        self.supabase_url.trim_end_matches('/')
    }

    /// Public origin without a trailing slash, if configured
    pub fn site_url(&self) -> Option<&str> {
        self.site_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }

    /// Project reference: the first label of the backend host
    pub fn project_ref(&self) -> String {
        Url::parse(&self.supabase_url)
            .ok()
            .and_then(|url| url.host_str().map(|host| host.to_string()))
            .and_then(|host| host.split('.').next().map(str::to_string))
            .unwrap_or_else(|| "local".to_string())
    }

    /// Name of the session cookie
    pub fn storage_key(&self) -> String {
        match self.auth_cookie_name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("sb-{}-auth-token", self.project_ref()),
        }
    }

    /// Redirect target for a site path, absolute when the origin is known
    pub fn redirect_target(&self, path: &str) -> String {
        match self.site_url() {
            Some(origin) => format!("{}{}", origin, path),
            None => path.to_string(),
        }
    }

    /// Split `oauth_scopes` into individual scopes
    pub fn scopes(&self) -> Vec<&str> {
        self.oauth_scopes.split_whitespace().collect()
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        supabase_url: "https://test.supabase.co".to_string(),
        supabase_anon_key: "anon-key".to_string(),
        site_url: None,
        bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        youtube_api_url: DEFAULT_YOUTUBE_API_URL.to_string(),
        oauth_provider: OAuthProvider::Google,
        oauth_scopes: DEFAULT_OAUTH_SCOPES.to_string(),
        auth_cookie_name: None,
        profile_store: ProfileStoreKind::Rest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "SUPABASE_URL",
        "SUPABASE_ANON_KEY",
        "SITE_URL",
        "PROFILE_STORE",
        "OAUTH_SCOPES",
        "OAUTH_PROVIDER",
    ];

    fn clear_env() {
        unsafe {
            for var in VARS {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_from_env_with_defaults() {
        clear_env();
        unsafe {
            std::env::set_var("SUPABASE_URL", "https://abcdefgh.supabase.co/");
            std::env::set_var("SUPABASE_ANON_KEY", "public-anon-key");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.supabase_base(), "https://abcdefgh.supabase.co");
        assert_eq!(config.supabase_anon_key, "public-anon-key");
        assert_eq!(config.youtube_api_url, DEFAULT_YOUTUBE_API_URL);
        assert_eq!(config.oauth_provider, OAuthProvider::Google);
        assert_eq!(config.profile_store, ProfileStoreKind::Rest);
        assert_eq!(config.storage_key(), "sb-abcdefgh-auth-token");
        assert_eq!(config.site_url(), None);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_with_custom_values() {
        clear_env();
        unsafe {
            std::env::set_var("SUPABASE_URL", "http://localhost:54321");
            std::env::set_var("SUPABASE_ANON_KEY", "key");
            std::env::set_var("SITE_URL", "https://creator.example.com/");
            std::env::set_var("PROFILE_STORE", "postgres");
            std::env::set_var("OAUTH_SCOPES", "openid  email");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.profile_store, ProfileStoreKind::Postgres);
        assert_eq!(config.storage_key(), "sb-localhost-auth-token");
        assert_eq!(config.scopes(), vec!["openid", "email"]);
        assert_eq!(
            config.redirect_target("/admin"),
            "https://creator.example.com/admin"
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_requires_backend_url() {
        clear_env();
        unsafe {
            std::env::set_var("SUPABASE_ANON_KEY", "key");
        }

        assert!(matches!(AppConfig::from_env(), Err(ConfigError::Load(_))));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_provider_without_channel_access() {
        clear_env();
        unsafe {
            std::env::set_var("SUPABASE_URL", "https://abcdefgh.supabase.co");
            std::env::set_var("SUPABASE_ANON_KEY", "key");
            std::env::set_var("OAUTH_PROVIDER", "apple");
        }

        assert!(matches!(AppConfig::from_env(), Err(ConfigError::Load(_))));

        clear_env();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = test_config();
        config.supabase_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = test_config();
        config.supabase_anon_key = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_redirect_target_without_site_url() {
        let config = test_config();
        assert_eq!(config.redirect_target("/admin"), "/admin");
    }

    #[test]
    fn test_cookie_name_override() {
        let mut config = test_config();
        assert_eq!(config.storage_key(), "sb-test-auth-token");

        config.auth_cookie_name = Some("admin-session".to_string());
        assert_eq!(config.storage_key(), "admin-session");
    }
}
