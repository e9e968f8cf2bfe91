//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use tetribass_core::UserId;

use super::User;

/// Session-stored user identity.
///
/// Only the id is kept in the session; everything else is loaded from the
/// user store when a request needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// User's database ID.
    pub id: UserId,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self { id: user.id }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the Google OAuth state parameter (CSRF protection).
    pub const GOOGLE_OAUTH_STATE: &str = "google_oauth_state";
}
