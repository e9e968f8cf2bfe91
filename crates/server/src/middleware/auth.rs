//! Authentication extractors and the route authorization gate.
//!
//! The session holds a [`SessionUser`] when a player is signed in. Page
//! routes consult [`route_access`] to decide between serving and redirecting;
//! API routes use [`RequireAuth`] and answer 401.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{SessionUser, session_keys};

/// Landing page for anonymous players.
pub const LANDING_PATH: &str = "/";

/// Game page for signed-in players.
pub const HOME_PATH: &str = "/home";

/// What the gate decided for a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Render the page.
    Serve,
    /// Send the browser elsewhere.
    Redirect(&'static str),
}

/// Decide whether a page route is served or redirected.
///
/// | Route | Signed in | Anonymous |
/// |-------|-----------|-----------|
/// | `/` | redirect `/home` | serve landing |
/// | `/home` | serve game | redirect `/` |
/// | anything else | serve game | redirect `/` |
#[must_use]
pub fn route_access(path: &str, authenticated: bool) -> Access {
    match (path, authenticated) {
        (LANDING_PATH, true) => Access::Redirect(HOME_PATH),
        (LANDING_PATH, false) => Access::Serve,
        (_, true) => Access::Serve,
        (_, false) => Access::Redirect(LANDING_PATH),
    }
}

/// Extractor that requires a signed-in player.
///
/// API requests are rejected with 401; page requests are redirected to the
/// landing page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, player {}!", user.id)
/// }
/// ```
pub struct RequireAuth(pub SessionUser);

/// Error returned when a signed-in player is required.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the landing page (for HTML requests).
    RedirectToLanding,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLanding => Redirect::to(LANDING_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user: SessionUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                if is_api_request(parts) {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLanding
                }
            })?;

        Ok(Self(user))
    }
}

/// Whether the request targets the JSON API.
///
/// Nested routers see a path with their prefix stripped, so the path the
/// client actually requested is read from [`OriginalUri`] when present.
fn is_api_request(parts: &Parts) -> bool {
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path(), |original| original.0.path());
    path == "/api" || path.starts_with("/api/")
}

/// Extractor that optionally gets the signed-in player.
///
/// Unlike `RequireAuth`, this never rejects the request.
pub struct OptionalAuth(pub Option<SessionUser>);

impl OptionalAuth {
    /// Whether a player is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<SessionUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Sign a player into the session.
///
/// The session id is cycled first so a pre-login id cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &SessionUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Destroy the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be deleted from the store.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
