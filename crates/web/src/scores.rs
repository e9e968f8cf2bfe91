//! Reporting finished games to `POST /api/scores`.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Request, RequestCredentials, RequestInit, Response};

use tetribass_core::ScoreEntry;
use tetribass_core::prompt::Phase;

/// Score endpoint.
pub const SCORES_PATH: &str = "/api/scores";

/// Id of the recent-scores list in the player panel.
pub const RECENT_SCORES_ID: &str = "recent-scores";

/// Id of the best-score counter in the player panel.
pub const BEST_SCORE_ID: &str = "best-score";

#[derive(Debug, Error)]
pub enum ScoreError {
    /// A browser API threw.
    #[error("browser error: {0:?}")]
    Browser(JsValue),

    /// The server answered with a non-success status.
    #[error("server answered {0}")]
    Status(u16),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<JsValue> for ScoreError {
    fn from(value: JsValue) -> Self {
        Self::Browser(value)
    }
}

#[derive(Serialize)]
struct RecordScore {
    score: u32,
}

#[derive(Debug, Deserialize)]
struct ScoresBody {
    scores: Vec<ScoreEntry>,
}

/// Whether an engine report just ended a game.
///
/// Later reports of the same game over, and the stale report swallowed
/// after a restart, do not count.
#[must_use]
pub const fn finished_game(before: Phase, after: Phase) -> bool {
    !matches!(before, Phase::GameOver) && matches!(after, Phase::GameOver)
}

/// JSON body for recording `score`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn request_body(score: u32) -> Result<String, serde_json::Error> {
    serde_json::to_string(&RecordScore { score })
}

/// Parse the server's history, oldest first.
///
/// # Errors
///
/// Returns an error if the body is not a score history.
pub fn parse_history(body: &str) -> Result<Vec<ScoreEntry>, serde_json::Error> {
    serde_json::from_str::<ScoresBody>(body).map(|body| body.scores)
}

/// List items for the player panel, newest first.
#[must_use]
pub fn recent_markup(scores: &[ScoreEntry]) -> String {
    scores.iter().rev().fold(String::new(), |mut html, entry| {
        let _ = write!(html, "<li>{}</li>", entry.score);
        html
    })
}

/// Record `score` for the signed-in player and return the updated history.
///
/// # Errors
///
/// Returns an error if the request fails or the server rejects it.
pub async fn record(score: u32) -> Result<Vec<ScoreEntry>, ScoreError> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_credentials(RequestCredentials::SameOrigin);
    init.set_body(&JsValue::from_str(&request_body(score)?));

    let request = Request::new_with_str_and_init(SCORES_PATH, &init)?;
    request.headers().set("content-type", "application/json")?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(ScoreError::Status(response.status()));
    }

    let body = JsFuture::from(response.text()?)
        .await?
        .as_string()
        .unwrap_or_default();

    Ok(parse_history(&body)?)
}

/// Refresh the player panel from a fresh history.
pub fn show_history(document: &Document, scores: &[ScoreEntry]) {
    if let Some(list) = document.get_element_by_id(RECENT_SCORES_ID) {
        list.set_inner_html(&recent_markup(scores));
    }

    if let Some(best) = document.get_element_by_id(BEST_SCORE_ID) {
        let value = scores.iter().map(|entry| entry.score).max().unwrap_or(0);
        best.set_text_content(Some(&value.to_string()));
    }
}
