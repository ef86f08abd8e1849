use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod callback;
mod config;
mod cookies;
mod error;
mod identity;
mod models;
mod oauth;
mod repositories;
mod routes;
mod session;
mod state;
#[cfg(test)]
mod testing;
mod youtube;

use common::database::{self, DatabaseConfig};
use tokio::net::TcpListener;

use crate::{
    config::{AppConfig, ProfileStoreKind},
    identity::SupabaseIdentity,
    repositories::{PgProfileStore, ProfileStore, RestProfileStore},
    state::AppState,
    youtube::YouTubeClient,
};

/// Timeout applied to every outbound request
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting admin auth service");

    let config = AppConfig::from_env()?;

    let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

    let profiles: Arc<dyn ProfileStore> = match config.profile_store {
        ProfileStoreKind::Rest => Arc::new(RestProfileStore::new(http.clone(), &config)),
        ProfileStoreKind::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = database::init_pool(&db_config)?;

            if database::health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            Arc::new(PgProfileStore::new(pool))
        }
    };
    info!("Profile store: {:?}", config.profile_store);

    let identity = Arc::new(SupabaseIdentity::new(http.clone(), &config));
    let channels = Arc::new(YouTubeClient::new(http, &config));

    let bind_address = config.bind_address.clone();
    let app_state = AppState::new(config, identity, channels, profiles)?;

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&bind_address).await?;
    info!("Admin auth service listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
