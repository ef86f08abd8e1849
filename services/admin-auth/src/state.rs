//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    config::AppConfig, error::ConfigError, identity::IdentityProvider, oauth::OAuthClient,
    repositories::ProfileStore, session::SessionManager, youtube::ChannelDirectory,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionManager,
    pub oauth: OAuthClient,
    pub identity: Arc<dyn IdentityProvider>,
    pub channels: Arc<dyn ChannelDirectory>,
    pub profiles: Arc<dyn ProfileStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        identity: Arc<dyn IdentityProvider>,
        channels: Arc<dyn ChannelDirectory>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Result<Self, ConfigError> {
        let sessions = SessionManager::new(config.storage_key());
        let oauth = OAuthClient::new(&config)?;

        Ok(Self {
            config: Arc::new(config),
            sessions,
            oauth,
            identity,
            channels,
            profiles,
        })
    }
}
