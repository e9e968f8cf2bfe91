//! Page route handlers.
//!
//! Every page request goes through [`route_access`]: signed-in players get
//! the game, anonymous players get the landing page, and anything else is a
//! redirect rather than an error page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use tetribass_core::prompt::{AuthAffordance, PromptState, PromptView};

use crate::error::Result;
use crate::middleware::{Access, OptionalAuth, clear_current_user, route_access};
use crate::models::{SessionUser, User};
use crate::state::AppState;

/// Signed-in player summary shown next to the board.
pub struct PlayerPanel {
    pub display_name: String,
    pub profile_pic: String,
    pub best_score: u32,
    /// Most recent first.
    pub recent_scores: Vec<u32>,
}

impl From<&User> for PlayerPanel {
    fn from(user: &User) -> Self {
        Self {
            display_name: user.display_name.clone(),
            profile_pic: user.profile_pic.clone(),
            best_score: user.scores.best().unwrap_or(0),
            recent_scores: user.scores.iter().rev().map(|e| e.score).collect(),
        }
    }
}

/// Game shell: board, held piece, queue, counters and the prompt overlay.
#[derive(Template, WebTemplate)]
#[template(path = "app.html")]
pub struct AppTemplate {
    pub player: Option<PlayerPanel>,
    pub prompt: PromptView,
}

impl AppTemplate {
    fn new(player: Option<PlayerPanel>) -> Self {
        let auth = if player.is_some() {
            AuthAffordance::LogOut
        } else {
            AuthAffordance::LogIn
        };

        Self {
            player,
            prompt: PromptView::new(&PromptState::default(), auth),
        }
    }
}

/// Display the landing page.
///
/// # Route
///
/// `GET /`
#[instrument(skip_all)]
pub async fn landing(auth: OptionalAuth) -> Response {
    match route_access("/", auth.is_authenticated()) {
        Access::Redirect(target) => Redirect::to(target).into_response(),
        Access::Serve => AppTemplate::new(None).into_response(),
    }
}

/// Display the game for a signed-in player.
///
/// # Route
///
/// `GET /home`
///
/// # Errors
///
/// Returns 500 if the player cannot be loaded.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
) -> Result<Response> {
    game_page(&state, &session, "/home", auth).await
}

/// Catch-all for unknown paths.
///
/// `GET` and `HEAD` follow the same rules as `/home`; other methods are 404.
///
/// # Errors
///
/// Returns 500 if the player cannot be loaded.
#[instrument(skip_all, fields(path = %uri.path()))]
pub async fn fallback(
    State(state): State<AppState>,
    session: Session,
    method: Method,
    uri: Uri,
    auth: OptionalAuth,
) -> Result<Response> {
    if method != Method::GET && method != Method::HEAD {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    game_page(&state, &session, uri.path(), auth).await
}

async fn game_page(
    state: &AppState,
    session: &Session,
    path: &str,
    auth: OptionalAuth,
) -> Result<Response> {
    match (route_access(path, auth.is_authenticated()), auth.0) {
        (Access::Serve, Some(session_user)) => {
            let Some(user) = load_player(state, session, session_user).await? else {
                return Ok(Redirect::to("/").into_response());
            };
            Ok(AppTemplate::new(Some(PlayerPanel::from(&user))).into_response())
        }
        (Access::Redirect(target), _) => Ok(Redirect::to(target).into_response()),
        // The gate only serves these paths to signed-in players
        (Access::Serve, None) => Ok(Redirect::to("/").into_response()),
    }
}

/// Resolve the session's player, dropping the session if they vanished.
async fn load_player(
    state: &AppState,
    session: &Session,
    session_user: SessionUser,
) -> Result<Option<User>> {
    let user = state.identity().resolve(session_user).await?;

    if user.is_none() {
        tracing::warn!(user_id = %session_user.id, "Session points at a missing player");
        clear_current_user(session).await?;
    }

    Ok(user)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use tetribass_core::{Email, ScoreEntry, ScoreHistory, UserId};
    use tetribass_core::prompt::PromptButton;

    use super::*;

    fn user_with_scores(scores: &[u32]) -> User {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut history = ScoreHistory::seeded(at);
        for score in scores {
            history.push(ScoreEntry::new(*score, at));
        }
        User {
            id: UserId::new(1),
            email: Email::parse("ada@example.com").unwrap(),
            display_name: "Ada".to_owned(),
            profile_pic: String::new(),
            created_at: at,
            scores: history,
        }
    }

    #[test]
    fn test_player_panel_orders_newest_first() {
        let panel = PlayerPanel::from(&user_with_scores(&[300, 1200, 40]));

        assert_eq!(panel.best_score, 1200);
        assert_eq!(panel.recent_scores, vec![40, 1200, 300, 0, 0]);
    }

    #[test]
    fn test_anonymous_shell_offers_log_in() {
        let template = AppTemplate::new(None);
        assert_eq!(
            template.prompt.buttons,
            vec![PromptButton::Play, PromptButton::LogIn]
        );
    }

    #[test]
    fn test_signed_in_shell_offers_log_out() {
        let template = AppTemplate::new(Some(PlayerPanel::from(&user_with_scores(&[]))));
        assert!(template.prompt.buttons.contains(&PromptButton::LogOut));

        let html = template.render().unwrap();
        assert!(html.contains("TetriBASS"));
        assert!(html.contains("Ada"));
        assert!(html.contains("href=\"/logout\""));
        assert!(html.contains("game-control-visible"));
        assert!(html.contains(r#"data-signed-in="true""#));
        assert!(html.contains(r#"id="best-score""#));
    }

    #[test]
    fn test_landing_markup() {
        let html = AppTemplate::new(None).render().unwrap();
        assert!(html.contains("href=\"/auth/google\""));
        assert!(html.contains("data-action=\"play\""));
        assert!(!html.contains("href=\"/logout\""));
        assert!(html.contains(r#"data-signed-in="false""#));
        assert!(html.contains(r#"<script type="module" src="/static/js/boot.js"></script>"#));
        assert!(html.contains(r#"id="prompt""#));
    }
}
