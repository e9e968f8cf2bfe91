//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use tetribass_core::{Email, ScoreHistory, UserId};

/// A player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address from the identity provider (unique).
    pub email: Email,
    /// Display name from the identity provider.
    pub display_name: String,
    /// Profile picture URL, empty when the provider had none.
    pub profile_pic: String,
    /// When the user first signed in.
    pub created_at: DateTime<Utc>,
    /// Most recent scores, oldest first.
    pub scores: ScoreHistory,
}

/// Data needed to create a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: Email,
    pub display_name: String,
    pub profile_pic: String,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    /// The score history a new user starts with.
    #[must_use]
    pub fn initial_scores(&self) -> ScoreHistory {
        ScoreHistory::seeded(self.created_at)
    }
}
