//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! tetribass-cli migrate
//! ```
//!
//! Applies `crates/server/migrations/` (players and scores) and creates the
//! `tower_sessions.session` table used by the server's session store.
//!
//! # Environment Variables
//!
//! - `TETRIBASS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use tetribass_server::db;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Read the database URL the same way the server does.
///
/// # Errors
///
/// Returns `MigrationError::MissingEnvVar` if neither variable is set.
pub fn database_url() -> Result<SecretString, MigrationError> {
    dotenvy::dotenv().ok();

    std::env::var("TETRIBASS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("TETRIBASS_DATABASE_URL"))
}

/// Connect using `TETRIBASS_DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if the URL is missing or the database is unreachable.
pub async fn connect() -> Result<PgPool, MigrationError> {
    let url = database_url()?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&url).await?)
}

/// Run all database migrations.
///
/// # Errors
///
/// Returns an error if connecting fails or any migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running schema migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
