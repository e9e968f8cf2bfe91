//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page (signed in: redirect /home)
//! GET  /home                   - Game (anonymous: redirect /)
//! GET  /*                      - Same as /home
//!
//! # Google sign-in
//! GET  /auth/google            - Redirect to Google OAuth
//! GET  /auth/google/callback   - Handle OAuth callback
//! GET  /logout                 - Destroy session, redirect /
//!
//! # Score API (requires auth, 401 otherwise)
//! GET  /api/scores             - Recent scores
//! POST /api/scores             - Record a finished game
//! GET  /api/me                 - Signed-in player's profile
//! ```

pub mod api;
pub mod auth;
pub mod pages;

use axum::{Router, routing::get};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the Google sign-in routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/google", get(auth::google_login))
        .route("/google/callback", get(auth::google_callback))
        .layer(auth_rate_limiter())
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/scores", get(api::scores::list).post(api::scores::record))
        .route("/me", get(api::scores::me))
        .layer(api_rate_limiter())
}

/// Create all page and API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::landing))
        .route("/home", get(pages::home))
        .route("/logout", get(auth::logout))
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
        .fallback(pages::fallback)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{HeaderValue, Method, Request, StatusCode, header},
        response::Response,
        routing::post,
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session};

    use tetribass_core::UserId;

    use super::*;
    use crate::config::ServerConfig;
    use crate::middleware::{session, set_current_user};
    use crate::models::SessionUser;

    const CLIENT_IP: &str = "203.0.113.9";

    async fn test_login(session: Session) -> StatusCode {
        set_current_user(&session, &SessionUser { id: UserId::new(1) })
            .await
            .unwrap();
        StatusCode::NO_CONTENT
    }

    /// Router with in-memory sessions and a pool that never connects.
    fn app() -> Router {
        let config = ServerConfig::for_tests();
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/tetribass")
            .unwrap();
        let state = AppState::new(config, pool);

        Router::new()
            .route("/test/login", post(test_login))
            .merge(routes())
            .layer(session::configure(MemoryStore::default(), false))
            .with_state(state)
    }

    fn request(method: Method, uri: &str, cookie: Option<&HeaderValue>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", CLIENT_IP);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        cookie: Option<&HeaderValue>,
    ) -> Response {
        app.clone()
            .oneshot(request(method, uri, cookie))
            .await
            .unwrap()
    }

    /// Sign in through the test route and return the session cookie.
    async fn signed_in(app: &Router) -> HeaderValue {
        let response = send(app, Method::POST, "/test/login", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        let pair = set_cookie.split(';').next().unwrap();
        HeaderValue::from_str(pair).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_landing_is_served() {
        let app = app();
        let response = send(&app, Method::GET, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_anonymous_home_redirects_to_landing() {
        let app = app();
        let response = send(&app, Method::GET, "/home", None).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_anonymous_unknown_path_redirects_to_landing() {
        let app = app();
        let response = send(&app, Method::GET, "/leaderboard/weekly", None).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_unknown_path_with_other_method_is_not_found() {
        let app = app();
        let response = send(&app, Method::DELETE, "/leaderboard", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_signed_in_landing_redirects_home() {
        let app = app();
        let cookie = signed_in(&app).await;

        let response = send(&app, Method::GET, "/", Some(&cookie)).await;

        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/home");
    }

    #[tokio::test]
    async fn test_api_requires_sign_in() {
        let app = app();
        for uri in ["/api/scores", "/api/me"] {
            let response = send(&app, Method::GET, uri, None).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_record_score_requires_sign_in() {
        let app = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/scores")
            .header("x-forwarded-for", CLIENT_IP)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"score": 100}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_google_login_redirects_to_google() {
        let app = app();
        let response = send(&app, Method::GET, "/auth/google", None).await;

        assert!(response.status().is_redirection());
        let target = location(&response);
        assert!(target.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(target.contains("prompt=select_account"));
        let callback = urlencoding::encode("http://localhost:3000/auth/google/callback");
        assert!(target.contains(callback.as_ref()));
    }

    #[tokio::test]
    async fn test_callback_without_state_returns_to_landing() {
        let app = app();
        let response = send(
            &app,
            Method::GET,
            "/auth/google/callback?code=abc&state=forged",
            None,
        )
        .await;

        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_callback_with_provider_error_returns_to_landing() {
        let app = app();
        let response = send(
            &app,
            Method::GET,
            "/auth/google/callback?error=access_denied",
            None,
        )
        .await;

        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_logout_signs_out() {
        let app = app();
        let cookie = signed_in(&app).await;

        let response = send(&app, Method::GET, "/logout", Some(&cookie)).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/");

        // Landing is served again instead of redirecting home
        let response = send(&app, Method::GET, "/", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
