//! Player lookup commands.
//!
//! # Usage
//!
//! ```bash
//! tetribass-cli player show -e player@example.com
//! ```

use thiserror::Error;

use tetribass_core::{Email, EmailError};
use tetribass_server::db::{RepositoryError, UserRepository};

use super::migrate::{self, MigrationError};

/// Errors that can occur during player operations.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Could not connect.
    #[error(transparent)]
    Connect(#[from] MigrationError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Query failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// No player with that email.
    #[error("No player with email: {0}")]
    NotFound(String),
}

/// Print a player's profile and recent scores.
///
/// # Errors
///
/// Returns an error if the email is invalid, the player doesn't exist, or
/// the database query fails.
pub async fn show(email: &str) -> Result<(), PlayerError> {
    let email = Email::parse(email)?;
    let pool = migrate::connect().await?;

    let user = UserRepository::new(&pool)
        .get_by_email(&email)
        .await?
        .ok_or_else(|| PlayerError::NotFound(email.to_string()))?;

    #[allow(clippy::print_stdout)]
    {
        println!("{} <{}>", user.display_name, user.email);
        println!("  id:      {}", user.id);
        println!("  joined:  {}", user.created_at.format("%Y-%m-%d %H:%M UTC"));
        println!("  best:    {}", user.scores.best().unwrap_or(0));
        println!("  recent (oldest first):");
        for entry in user.scores.iter() {
            println!(
                "    {:>8}  {}",
                entry.score,
                entry.timestamp.format("%Y-%m-%d %H:%M")
            );
        }
    }

    Ok(())
}
