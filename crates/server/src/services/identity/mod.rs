//! Identity service.
//!
//! Maps a Google profile onto a local player and a session back onto that
//! player. The session only ever holds a [`SessionUser`]; the full [`User`]
//! is always reloaded from the [`UserStore`].

mod error;

pub use error::AuthError;

use std::future::Future;

use chrono::{DateTime, Utc};

use tetribass_core::{Email, ScoreEntry, ScoreHistory, UserId};

use crate::db::RepositoryError;
use crate::google::GoogleProfile;
use crate::models::{NewUser, SessionUser, User};

/// Persistence the identity service needs.
///
/// Implemented by [`crate::db::UserRepository`] for `PostgreSQL`.
pub trait UserStore {
    /// Find a player by email.
    fn find_by_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Find a player by id.
    fn find_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Create a player with their seeded score history.
    ///
    /// Fails with `RepositoryError::Conflict` if the email is taken.
    fn create(
        &self,
        new_user: &NewUser,
    ) -> impl Future<Output = Result<User, RepositoryError>> + Send;

    /// Append a finished game to a player's history.
    fn record_score(
        &self,
        user_id: UserId,
        entry: ScoreEntry,
    ) -> impl Future<Output = Result<ScoreHistory, RepositoryError>> + Send;
}

/// Identity service.
pub struct IdentityService<S> {
    store: S,
}

impl<S: UserStore> IdentityService<S> {
    /// Create a new identity service over a user store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Find the player for a Google profile, creating them on first sign-in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the profile has no valid email.
    /// Returns `AuthError::UnverifiedEmail` if Google has not verified it.
    /// Returns `AuthError::Repository` if the store fails.
    pub async fn find_or_create(
        &self,
        profile: &GoogleProfile,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(profile.email.as_deref().unwrap_or_default())?;
        if !profile.email_verified {
            return Err(AuthError::UnverifiedEmail);
        }

        if let Some(user) = self.store.find_by_email(&email).await? {
            return Ok(user);
        }

        let new_user = NewUser {
            display_name: display_name(profile, &email),
            profile_pic: profile.picture.clone().unwrap_or_default(),
            email,
            created_at: now,
        };

        match self.store.create(&new_user).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Created player on first sign-in");
                Ok(user)
            }
            // Lost a race with a concurrent first sign-in
            Err(RepositoryError::Conflict(_)) => self
                .store
                .find_by_email(&new_user.email)
                .await?
                .ok_or(AuthError::Repository(RepositoryError::NotFound)),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the player a session points at.
    ///
    /// Returns `None` when the player no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store fails.
    pub async fn resolve(&self, session_user: SessionUser) -> Result<Option<User>, AuthError> {
        Ok(self.store.find_by_id(session_user.id).await?)
    }

    /// Record a finished game for the session's player.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` with `RepositoryError::NotFound` if the
    /// player no longer exists.
    pub async fn record_score(
        &self,
        session_user: SessionUser,
        score: u32,
        now: DateTime<Utc>,
    ) -> Result<ScoreHistory, AuthError> {
        Ok(self
            .store
            .record_score(session_user.id, ScoreEntry::new(score, now))
            .await?)
    }
}

fn display_name(profile: &GoogleProfile, email: &Email) -> String {
    match profile.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => email
            .as_str()
            .split_once('@')
            .map_or_else(String::new, |(local, _)| local.to_owned()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod memory {
    //! In-memory [`UserStore`] for tests.

    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryUserStore {
        users: Mutex<Vec<User>>,
    }

    impl MemoryUserStore {
        pub fn remove(&self, id: UserId) {
            self.users.lock().unwrap().retain(|u| u.id != id);
        }

        pub fn len(&self) -> usize {
            self.users.lock().unwrap().len()
        }
    }

    impl UserStore for MemoryUserStore {
        async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| &u.email == email).cloned())
        }

        async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.id == id).cloned())
        }

        async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == new_user.email) {
                return Err(RepositoryError::Conflict("email already exists".to_owned()));
            }
            let next_id = users.iter().map(|u| u.id.as_i32()).max().unwrap_or(0) + 1;
            let user = User {
                id: UserId::new(next_id),
                email: new_user.email.clone(),
                display_name: new_user.display_name.clone(),
                profile_pic: new_user.profile_pic.clone(),
                created_at: new_user.created_at,
                scores: new_user.initial_scores(),
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn record_score(
            &self,
            user_id: UserId,
            entry: ScoreEntry,
        ) -> Result<ScoreHistory, RepositoryError> {
            let mut users = self.users.lock().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or(RepositoryError::NotFound)?;
            user.scores.push(entry);
            Ok(user.scores.clone())
        }
    }
}
