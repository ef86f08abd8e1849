//! Profile repository
//!
//! Verified profiles are written either through the hosted REST layer, as
//! the signed-in user so row-level security applies, or straight into
//! PostgreSQL for self-hosted deployments.

use async_trait::async_trait;
use common::error::DatabaseError;
use reqwest::Client;
use sqlx::PgPool;
use tracing::info;

use crate::{
    config::AppConfig,
    error::{ProfileStoreError, error_message},
    models::Profile,
};

/// Table holding one profile per user
pub const PROFILES_TABLE: &str = "profiles";

/// Insert-or-replace of profile rows keyed by user id
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Upsert a profile; `access_token` is the signed-in user's token
    async fn upsert(&self, profile: &Profile, access_token: &str) -> Result<(), ProfileStoreError>;
}

/// Profile store backed by the hosted REST layer
#[derive(Clone)]
pub struct RestProfileStore {
    http: Client,
    endpoint: String,
    anon_key: String,
}

impl RestProfileStore {
    pub fn new(http: Client, config: &AppConfig) -> Self {
        Self {
            http,
            endpoint: format!("{}/rest/v1/{}", config.supabase_base(), PROFILES_TABLE),
            anon_key: config.supabase_anon_key.clone(),
        }
    }
}

#[async_trait]
impl ProfileStore for RestProfileStore {
    async fn upsert(&self, profile: &Profile, access_token: &str) -> Result<(), ProfileStoreError> {
        info!("Upserting profile {} via REST", profile.id);

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("on_conflict", "id")])
            .header("apikey", &self.anon_key)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .bearer_auth(access_token)
            .json(profile)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProfileStoreError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(())
    }
}

/// Profile store writing directly to PostgreSQL
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    /// Create a new profile repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn upsert(&self, profile: &Profile, _access_token: &str) -> Result<(), ProfileStoreError> {
        info!("Upserting profile {} via PostgreSQL", profile.id);

        sqlx::query(
            r#"
            INSERT INTO profiles (
                id, is_verified, youtube_channel_id, youtube_handle,
                youtube_channel_url, auth_provider, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                is_verified = EXCLUDED.is_verified,
                youtube_channel_id = EXCLUDED.youtube_channel_id,
                youtube_handle = EXCLUDED.youtube_handle,
                youtube_channel_url = EXCLUDED.youtube_channel_url,
                auth_provider = EXCLUDED.auth_provider,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(profile.id)
        .bind(profile.is_verified)
        .bind(&profile.youtube_channel_id)
        .bind(&profile.youtube_handle)
        .bind(&profile.youtube_channel_url)
        .bind(&profile.auth_provider)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(())
    }
}
