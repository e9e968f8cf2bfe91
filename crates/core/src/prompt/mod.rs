//! Pause/prompt overlay state machine.
//!
//! The overlay sits on top of the game board and mediates between "game is
//! running" and "game is paused with a menu shown". The game engine itself is
//! external; this module only decides what the overlay shows and which engine
//! control to call.
//!
//! # Phases
//!
//! ```text
//! Initial --Play--> Playing <--Escape / Resume--> Prompt
//!                      |                            |
//!                      +-----engine game over-------+--> GameOver --Restart--> Playing
//! ```
//!
//! # Design
//!
//! Everything runs through [`reduce`], a pure `(state, event) -> transition`
//! function. Signals coming from the engine (`is_over`) and from the player
//! (keys, buttons, tab visibility) are both just [`PromptEvent`]s, so there is
//! no separate "state derived from props" path.
//!
//! Player-driven transitions that flip visibility emit the matching
//! [`EngineSignal`]. Engine reports only move the overlay; the engine already
//! knows its own state, so they never signal back. A game-over overlay is
//! left only through Restart.

mod controller;
mod subscription;
mod view;

pub use controller::{ActiveController, EngineControls, PromptController};
pub use subscription::{DocumentEvent, DocumentEventKind, DocumentEvents, Subscription};
pub use view::{AuthAffordance, PromptButton, PromptView};

use serde::{Deserialize, Serialize};

/// A keyboard key as far as the overlay cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            _ => Self::Other,
        }
    }
}

/// Document visibility (`document.visibilityState`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    /// Map a DOM `visibilityState` value. Anything other than `"visible"`
    /// counts as hidden.
    #[must_use]
    pub fn from_dom_state(state: &str) -> Self {
        if state == "visible" {
            Self::Visible
        } else {
            Self::Hidden
        }
    }
}

/// Everything the overlay reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptEvent {
    /// "Play" on the first-ever prompt.
    PlayPressed,
    /// A key went down anywhere in the document.
    KeyPressed(Key),
    /// The tab was hidden or shown.
    VisibilityChanged(Visibility),
    /// "Resume" on the pause menu.
    ResumePressed,
    /// "Restart" on the pause or game-over menu.
    RestartPressed,
    /// "Grid: ON/OFF".
    GridTogglePressed,
    /// The engine reported its current game-over flag.
    EngineReported { is_over: bool },
}

/// Engine control the overlay asks for. The engine implements these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineSignal {
    StartFirstGame,
    TogglePause,
    Restart,
    ToggleGrid,
}

/// Coarse phase of the overlay, derived from [`PromptState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// First mount, never played.
    Initial,
    /// Paused with the menu shown.
    Prompt,
    /// Menu hidden, engine accepts input.
    Playing,
    /// Menu shown with the "Game Over" heading.
    GameOver,
}

/// Overlay state for one mounted game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptState {
    pub is_initial: bool,
    pub is_prompt_visible: bool,
    pub is_grid_visible: bool,
    /// Set by Restart; consumed by the next engine report.
    pub pending_restart: bool,
    /// Last game-over flag reported by the engine.
    pub is_over: bool,
}

impl Default for PromptState {
    fn default() -> Self {
        Self {
            is_initial: true,
            is_prompt_visible: true,
            is_grid_visible: false,
            pending_restart: false,
            is_over: false,
        }
    }
}

impl PromptState {
    #[must_use]
    pub const fn phase(&self) -> Phase {
        if self.is_initial {
            Phase::Initial
        } else if !self.is_prompt_visible {
            Phase::Playing
        } else if self.is_over {
            Phase::GameOver
        } else {
            Phase::Prompt
        }
    }
}

/// Result of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: PromptState,
    /// At most one engine control per event.
    pub signal: Option<EngineSignal>,
}

impl Transition {
    const fn unchanged(state: PromptState) -> Self {
        Self {
            state,
            signal: None,
        }
    }

    const fn with(state: PromptState, signal: EngineSignal) -> Self {
        Self {
            state,
            signal: Some(signal),
        }
    }
}

/// Apply `event` to `state`.
///
/// Total over all inputs: events that make no sense in the current phase
/// return the state unchanged with no signal.
#[must_use]
pub const fn reduce(state: PromptState, event: PromptEvent) -> Transition {
    let mut next = state;

    match event {
        PromptEvent::PlayPressed => {
            if !state.is_initial {
                return Transition::unchanged(state);
            }
            next.is_initial = false;
            next.is_prompt_visible = false;
            Transition::with(next, EngineSignal::StartFirstGame)
        }

        // Escape toggles even while the menu is already up, so a second
        // Escape resumes the game. Game over stays on screen until Restart.
        PromptEvent::KeyPressed(Key::Escape) => {
            next.is_prompt_visible =
                !state.is_prompt_visible || (state.is_over && !state.pending_restart);
            Transition::with(next, EngineSignal::TogglePause)
        }
        PromptEvent::KeyPressed(Key::Other) => Transition::unchanged(state),

        // Only hiding pauses; coming back does not auto-resume.
        PromptEvent::VisibilityChanged(Visibility::Hidden) if !state.is_prompt_visible => {
            next.is_prompt_visible = true;
            Transition::with(next, EngineSignal::TogglePause)
        }
        PromptEvent::VisibilityChanged(_) => Transition::unchanged(state),

        PromptEvent::ResumePressed => {
            if !matches!(state.phase(), Phase::Prompt) {
                return Transition::unchanged(state);
            }
            next.is_prompt_visible = false;
            Transition::with(next, EngineSignal::TogglePause)
        }

        PromptEvent::RestartPressed => {
            if !matches!(state.phase(), Phase::Prompt | Phase::GameOver) {
                return Transition::unchanged(state);
            }
            next.is_prompt_visible = false;
            next.pending_restart = true;
            Transition::with(next, EngineSignal::Restart)
        }

        PromptEvent::GridTogglePressed => {
            if state.is_initial {
                return Transition::unchanged(state);
            }
            next.is_grid_visible = !state.is_grid_visible;
            Transition::with(next, EngineSignal::ToggleGrid)
        }

        PromptEvent::EngineReported { is_over } => {
            next.is_over = is_over;
            if state.pending_restart {
                // The first report after a restart is consumed here: a stale
                // game-over does not pop the menu back up.
                next.pending_restart = false;
                if !is_over {
                    next.is_prompt_visible = false;
                }
            } else if is_over && !state.is_prompt_visible {
                next.is_prompt_visible = true;
            }
            Transition::unchanged(next)
        }
    }
}
