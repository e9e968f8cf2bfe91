//! Identity error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::google::GoogleError;

/// Errors that can occur while signing a player in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity provider returned no usable email.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] tetribass_core::EmailError),

    /// Google has not verified the account's email, so it cannot be
    /// trusted to identify an existing player.
    #[error("email not verified by the identity provider")]
    UnverifiedEmail,

    /// OAuth state missing from the session or not matching the callback.
    #[error("invalid oauth state")]
    InvalidState,

    /// The callback arrived without an authorization code.
    #[error("missing authorization code")]
    MissingCode,

    /// Talking to Google failed.
    #[error("google error: {0}")]
    Google(#[from] GoogleError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Reading or writing the session failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}
