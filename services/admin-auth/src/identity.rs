//! Identity provider client
//!
//! Talks to the hosted auth API: PKCE code exchange, user lookup and
//! sign-out.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::info;

use crate::{
    config::AppConfig,
    error::{IdentityError, error_message},
    models::{Session, User},
};

/// Operations the sign-in flow needs from the identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange a one-time authorization code for a session
    async fn exchange_code(&self, code: &str, code_verifier: &str)
    -> Result<Session, IdentityError>;

    /// Resolve the user behind an access token
    async fn get_user(&self, access_token: &str) -> Result<User, IdentityError>;

    /// Revoke the session behind an access token
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}

#[derive(Serialize)]
struct PkceGrant<'a> {
    auth_code: &'a str,
    code_verifier: &'a str,
}

/// Hosted auth API client
#[derive(Clone)]
pub struct SupabaseIdentity {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseIdentity {
    pub fn new(http: Client, config: &AppConfig) -> Self {
        Self {
            http,
            base_url: format!("{}/auth/v1", config.supabase_base()),
            anon_key: config.supabase_anon_key.clone(),
        }
    }
}

async fn check_status(response: Response) -> Result<Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(IdentityError::Rejected {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<Session, IdentityError> {
        info!("Exchanging authorization code for a session");

        let response = self
            .http
            .post(format!("{}/token", self.base_url))
            .query(&[("grant_type", "pkce")])
            .header("apikey", &self.anon_key)
            .json(&PkceGrant {
                auth_code: code,
                code_verifier,
            })
            .send()
            .await?;

        let session = check_status(response).await?.json::<Session>().await?;
        Ok(session)
    }

    async fn get_user(&self, access_token: &str) -> Result<User, IdentityError> {
        let response = self
            .http
            .get(format!("{}/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let user = check_status(response).await?.json::<User>().await?;
        Ok(user)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        info!("Signing out session");

        let response = self
            .http
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}
