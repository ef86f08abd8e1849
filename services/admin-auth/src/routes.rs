//! Admin auth service routes

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use crate::{callback, cookies::JarCookies, oauth::CALLBACK_PATH, state::AppState};

/// Login page, target of logout
pub const LOGIN_PAGE: &str = "/admin/login";

/// Create the router for the admin auth service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/admin/auth/login", get(login))
        .route(CALLBACK_PATH, get(callback::auth_callback))
        .route("/admin/auth/logout", post(logout))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "admin-auth"
    }))
}

/// Start the provider sign-in
///
/// Stores a fresh PKCE verifier and sends the browser to the identity
/// provider, which redirects back to the callback with a code.
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let mut cookies = JarCookies::new(jar);

    let request = state.oauth.generate_auth_url();
    state
        .sessions
        .store_code_verifier(&mut cookies, &request.pkce_verifier);

    info!("Redirecting to identity provider for sign-in");
    (cookies.into_jar(), Redirect::temporary(&request.url))
}

/// Sign out and drop the session cookies
///
/// Revoking the session remotely is best effort; the cookies are cleared
/// regardless.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let mut cookies = JarCookies::new(jar);

    match state.sessions.load_session(&cookies) {
        Ok(Some(session)) => {
            if let Err(e) = state.identity.sign_out(&session.access_token).await {
                warn!("Failed to revoke session: {}", e);
            }
        }
        Ok(None) => {}
        Err(e) => warn!("Discarding unreadable session cookie: {}", e),
    }

    state.sessions.clear_session(&mut cookies);
    info!("Logout completed");

    (
        cookies.into_jar(),
        Redirect::to(&state.config.redirect_target(LOGIN_PAGE)),
    )
}
