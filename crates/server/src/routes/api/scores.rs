//! Score history and profile API.
//!
//! JSON endpoints used by the game page. All require a signed-in player and
//! answer 401 otherwise.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use tetribass_core::{ScoreEntry, ScoreHistory};

use crate::db::RepositoryError;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAuth, clear_current_user};
use crate::models::{SessionUser, User};
use crate::services::AuthError;
use crate::state::AppState;

/// Body of `POST /api/scores`.
#[derive(Debug, Deserialize)]
pub struct RecordScoreRequest {
    pub score: u32,
}

/// Score history, oldest first.
#[derive(Debug, Serialize)]
pub struct ScoresResponse {
    pub scores: Vec<ScoreEntry>,
}

impl From<ScoreHistory> for ScoresResponse {
    fn from(history: ScoreHistory) -> Self {
        Self {
            scores: history.into(),
        }
    }
}

/// Public profile of the signed-in player.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub email: String,
    pub display_name: String,
    pub profile_pic: String,
    pub best_score: Option<u32>,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.to_string(),
            display_name: user.display_name.clone(),
            profile_pic: user.profile_pic.clone(),
            best_score: user.scores.best(),
        }
    }
}

/// Get the player's recent scores.
///
/// # Route
///
/// `GET /api/scores`
///
/// # Errors
///
/// Returns 401 if the session's player no longer exists.
pub async fn list(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(session_user): RequireAuth,
) -> Result<Json<ScoresResponse>> {
    let user = current_player(&state, &session, session_user).await?;
    Ok(Json(user.scores.into()))
}

/// Record a finished game.
///
/// # Route
///
/// `POST /api/scores`
///
/// # Errors
///
/// Returns 401 if the session's player no longer exists.
pub async fn record(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(session_user): RequireAuth,
    Json(request): Json<RecordScoreRequest>,
) -> Result<(StatusCode, Json<ScoresResponse>)> {
    let score = request.score.to_string();
    add_breadcrumb("game", "Finished game", Some(&[("score", score.as_str())]));

    let history = match state
        .identity()
        .record_score(session_user, request.score, Utc::now())
        .await
    {
        Ok(history) => history,
        Err(AuthError::Repository(RepositoryError::NotFound)) => {
            return Err(vanished(&session, session_user).await);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %session_user.id, score = request.score, "Recorded score");

    Ok((StatusCode::CREATED, Json(history.into())))
}

/// Get the signed-in player's profile.
///
/// # Route
///
/// `GET /api/me`
///
/// # Errors
///
/// Returns 401 if the session's player no longer exists.
pub async fn me(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(session_user): RequireAuth,
) -> Result<Json<ProfileResponse>> {
    let user = current_player(&state, &session, session_user).await?;
    Ok(Json(ProfileResponse::from(&user)))
}

async fn current_player(
    state: &AppState,
    session: &Session,
    session_user: SessionUser,
) -> Result<User> {
    match state.identity().resolve(session_user).await? {
        Some(user) => Ok(user),
        None => Err(vanished(session, session_user).await),
    }
}

/// A session whose player is gone counts as signed out.
async fn vanished(session: &Session, session_user: SessionUser) -> AppError {
    tracing::warn!(user_id = %session_user.id, "Session points at a missing player");
    if let Err(e) = clear_current_user(session).await {
        return e.into();
    }
    AppError::Unauthorized("session expired".to_owned())
}
