//! OAuth callback: finishes the admin sign-in
//!
//! The browser lands here from the identity provider with a one-time `code`.
//! The code is exchanged for a session (stored in cookies), the user is
//! resolved, and when the session carries a provider token the creator's
//! channel is looked up and their profile marked verified. Only the first two
//! steps can fail the sign-in; enrichment problems are logged and dropped.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::{
    cookies::{CookieStore, JarCookies},
    error::{CallbackError, EnrichmentError},
    models::{Profile, User},
    state::AppState,
};

/// Landing page after a successful sign-in
pub const ADMIN_HOME: &str = "/admin";

/// Login page flagged with the generic auth failure
pub const LOGIN_FAILED: &str = "/admin/login?error=auth_failed";

/// Query parameters of the callback
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

/// GET /admin/auth/callback
pub async fn auth_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> impl IntoResponse {
    let mut cookies = JarCookies::new(jar);

    let target = match complete_sign_in(&state, &mut cookies, params.code.as_deref()).await {
        Ok(()) => ADMIN_HOME,
        Err(e) => {
            error!("Auth callback failed: {}", e);
            LOGIN_FAILED
        }
    };

    (
        cookies.into_jar(),
        Redirect::temporary(&state.config.redirect_target(target)),
    )
}

/// Run the sign-in sequence against the given cookies
pub async fn complete_sign_in(
    state: &AppState,
    cookies: &mut dyn CookieStore,
    code: Option<&str>,
) -> Result<(), CallbackError> {
    if let Some(code) = code.filter(|code| !code.is_empty()) {
        let verifier = state
            .sessions
            .take_code_verifier(cookies)
            .ok_or(CallbackError::MissingVerifier)?;

        let session = state
            .identity
            .exchange_code(code, &verifier)
            .await
            .map_err(CallbackError::Exchange)?;

        state.sessions.store_session(cookies, &session)?;
    }

    let session = state
        .sessions
        .load_session(&*cookies)?
        .ok_or(CallbackError::MissingSession)?;

    let user = state
        .identity
        .get_user(&session.access_token)
        .await
        .map_err(CallbackError::UserLookup)?;

    match session.provider_token() {
        Some(provider_token) => {
            if let Err(e) = enrich_profile(state, &user, &session.access_token, provider_token).await
            {
                warn!(user_id = %user.id, "Profile enrichment failed: {}", e);
            }
        }
        None => debug!(user_id = %user.id, "No provider token, skipping profile enrichment"),
    }

    info!(user_id = %user.id, "Admin sign-in completed");
    Ok(())
}

/// Look up the creator's channel and upsert their verified profile
async fn enrich_profile(
    state: &AppState,
    user: &User,
    access_token: &str,
    provider_token: &str,
) -> Result<(), EnrichmentError> {
    let channel = state.channels.fetch_own_channel(provider_token).await?;

    // The provider that issued the token, not the one the account signed up with
    let auth_provider = state.oauth.provider().as_str();
    let profile = Profile::verified(user.id, &channel, auth_provider, Utc::now());

    state.profiles.upsert(&profile, access_token).await?;

    info!(
        user_id = %user.id,
        channel_id = %channel.channel_id,
        "Profile verified"
    );
    Ok(())
}
