//! What the overlay shows for a given state.

use serde::Serialize;

use super::{Phase, PromptEvent, PromptState};

/// Login affordance offered in the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthAffordance {
    /// Anonymous player: open the login flow.
    LogIn,
    /// Signed-in player: plain link to `/logout`.
    LogOut,
}

/// A single menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PromptButton {
    Play,
    Resume,
    Restart,
    LogIn,
    LogOut,
    Grid { on: bool },
}

impl PromptButton {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Resume => "Resume",
            Self::Restart => "Restart",
            Self::LogIn => "Log In",
            Self::LogOut => "Log Out",
            Self::Grid { on: true } => "Grid: ON",
            Self::Grid { on: false } => "Grid: OFF",
        }
    }

    /// Link target for entries that navigate instead of dispatching.
    #[must_use]
    pub const fn href(&self) -> Option<&'static str> {
        match self {
            Self::LogIn => Some("/auth/google"),
            Self::LogOut => Some("/logout"),
            _ => None,
        }
    }

    /// Event dispatched when the entry is pressed. Login/logout leave the
    /// state machine entirely and have none.
    #[must_use]
    pub const fn event(&self) -> Option<PromptEvent> {
        match self {
            Self::Play => Some(PromptEvent::PlayPressed),
            Self::Resume => Some(PromptEvent::ResumePressed),
            Self::Restart => Some(PromptEvent::RestartPressed),
            Self::Grid { .. } => Some(PromptEvent::GridTogglePressed),
            Self::LogIn | Self::LogOut => None,
        }
    }

    /// Stable identifier rendered as `data-action`; [`PromptEvent::from_action`]
    /// maps it back.
    #[must_use]
    pub const fn action(&self) -> Option<&'static str> {
        match self {
            Self::Play => Some("play"),
            Self::Resume => Some("resume"),
            Self::Restart => Some("restart"),
            Self::Grid { .. } => Some("grid"),
            Self::LogIn | Self::LogOut => None,
        }
    }

    /// Light buttons are the primary action of the menu.
    #[must_use]
    pub const fn is_primary(&self) -> bool {
        matches!(self, Self::Play | Self::Resume)
    }
}

impl PromptEvent {
    /// Event for a rendered `data-action` value.
    #[must_use]
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "play" => Some(Self::PlayPressed),
            "resume" => Some(Self::ResumePressed),
            "restart" => Some(Self::RestartPressed),
            "grid" => Some(Self::GridTogglePressed),
            _ => None,
        }
    }
}

/// Rendered overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptView {
    pub visible: bool,
    pub heading: Option<&'static str>,
    pub buttons: Vec<PromptButton>,
}

impl PromptView {
    #[must_use]
    pub fn new(state: &PromptState, auth: AuthAffordance) -> Self {
        let auth_button = match auth {
            AuthAffordance::LogIn => PromptButton::LogIn,
            AuthAffordance::LogOut => PromptButton::LogOut,
        };

        let (heading, buttons) = if state.phase() == Phase::Initial {
            (None, vec![PromptButton::Play, auth_button])
        } else {
            let mut buttons = Vec::with_capacity(4);
            let heading = if state.is_over {
                Some("Game Over")
            } else {
                buttons.push(PromptButton::Resume);
                None
            };
            buttons.push(PromptButton::Restart);
            buttons.push(auth_button);
            buttons.push(PromptButton::Grid {
                on: state.is_grid_visible,
            });
            (heading, buttons)
        };

        Self {
            visible: state.is_prompt_visible,
            heading,
            buttons,
        }
    }

    /// CSS modifier class for the overlay container.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        if self.visible {
            "game-control-visible"
        } else {
            "game-control-hidden"
        }
    }
}
