//! Google sign-in route handlers.
//!
//! - Login: redirects to Google's account chooser
//! - Callback: exchanges the code, finds or creates the player, signs them in
//! - Logout: destroys the session
//!
//! Failures never surface as error pages: they are logged and the browser is
//! sent back to the landing page.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::auth::{HOME_PATH, LANDING_PATH};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{SessionUser, User, session_keys};
use crate::services::AuthError;
use crate::state::AppState;

/// Length of the CSRF state parameter.
const OAUTH_STATE_LEN: usize = 32;

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for a token.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if the player declined or Google failed.
    pub error: Option<String>,
}

fn generate_oauth_state() -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(OAUTH_STATE_LEN)
        .map(char::from)
        .collect()
}

/// Initiate Google sign-in.
///
/// # Route
///
/// `GET /auth/google`
pub async fn google_login(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = generate_oauth_state();

    if let Err(e) = session
        .insert(session_keys::GOOGLE_OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!(error = %e, "Failed to store OAuth state in session");
        return Redirect::to(LANDING_PATH).into_response();
    }

    let auth_url = state
        .google()
        .authorization_url(&state.config().google_callback_url(), &oauth_state);

    Redirect::to(&auth_url).into_response()
}

/// Handle the Google OAuth callback.
///
/// # Route
///
/// `GET /auth/google/callback`
pub async fn google_callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = &query.error {
        tracing::warn!(error = %error, "Google sign-in declined");
        return Redirect::to(LANDING_PATH).into_response();
    }

    match complete_sign_in(&state, &session, query).await {
        Ok(user) => {
            set_sentry_user(&user.id, Some(user.email.as_str()));
            tracing::info!(user_id = %user.id, "Player signed in");
            Redirect::to(HOME_PATH).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Google sign-in failed");
            Redirect::to(LANDING_PATH).into_response()
        }
    }
}

async fn complete_sign_in(
    state: &AppState,
    session: &Session,
    query: CallbackQuery,
) -> Result<User, AuthError> {
    // One-time use
    let stored_state: Option<String> = session.remove(session_keys::GOOGLE_OAUTH_STATE).await?;

    match (stored_state, query.state) {
        (Some(stored), Some(returned)) if stored == returned => {}
        _ => return Err(AuthError::InvalidState),
    }

    let code = query.code.ok_or(AuthError::MissingCode)?;

    let google = state.google();
    let token = google
        .exchange_code(&code, &state.config().google_callback_url())
        .await?;
    let profile = google.fetch_profile(&token).await?;

    let user = state
        .identity()
        .find_or_create(&profile, chrono::Utc::now())
        .await?;

    set_current_user(session, &SessionUser::from(&user)).await?;

    Ok(user)
}

/// Sign the player out.
///
/// # Route
///
/// `GET /logout`
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!(error = %e, "Failed to destroy session");
    }

    clear_sentry_user();

    Redirect::to(LANDING_PATH).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_state_shape() {
        let state = generate_oauth_state();
        assert_eq!(state.len(), OAUTH_STATE_LEN);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_oauth_state_is_random() {
        assert_ne!(generate_oauth_state(), generate_oauth_state());
    }
}
