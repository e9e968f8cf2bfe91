//! User repository for database operations.
//!
//! Users and their recent scores. Scores live in their own table; each write
//! trims the player's rows back to the newest [`SCORE_HISTORY_CAP`] inside
//! the same transaction, so the cap holds in storage and not only in memory.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use tetribass_core::{Email, SCORE_HISTORY_CAP, ScoreEntry, ScoreHistory, UserId};

use super::RepositoryError;
use crate::models::{NewUser, User};
use crate::services::identity::UserStore;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    display_name: String,
    profile_pic: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ScoreRow {
    score: i64,
    recorded_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, scores: ScoreHistory) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(User {
            id: self.id,
            email,
            display_name: self.display_name,
            profile_pic: self.profile_pic,
            created_at: self.created_at,
            scores,
        })
    }
}

impl TryFrom<ScoreRow> for ScoreEntry {
    type Error = RepositoryError;

    fn try_from(row: ScoreRow) -> Result<Self, Self::Error> {
        let score = u32::try_from(row.score).map_err(|_| {
            RepositoryError::DataCorruption(format!("score out of range: {}", row.score))
        })?;
        Ok(Self::new(score, row.recorded_at))
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, display_name, profile_pic, created_at
            FROM tetribass.user
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        self.with_scores(row).await
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, display_name, profile_pic, created_at
            FROM tetribass.user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        self.with_scores(row).await
    }

    /// Create a user together with their seeded score history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO tetribass.user (email, display_name, profile_pic, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, display_name, profile_pic, created_at
            ",
        )
        .bind(&new_user.email)
        .bind(&new_user.display_name)
        .bind(&new_user.profile_pic)
        .bind(new_user.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let scores = new_user.initial_scores();
        for entry in scores.iter() {
            insert_score(&mut tx, row.id, entry).await?;
        }

        tx.commit().await?;

        row.into_user(scores)
    }

    /// Append a score and drop everything older than the newest
    /// [`SCORE_HISTORY_CAP`] entries.
    ///
    /// The player row is locked for the whole transaction so concurrent
    /// writes for one player trim against each other's inserts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn record_score(
        &self,
        user_id: UserId,
        entry: ScoreEntry,
    ) -> Result<ScoreHistory, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(LOCK_USER_SQL)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        insert_score(&mut tx, user_id, &entry).await?;

        sqlx::query(
            r"
            DELETE FROM tetribass.score
            WHERE user_id = $1
              AND id NOT IN (
                  SELECT id FROM tetribass.score
                  WHERE user_id = $1
                  ORDER BY recorded_at DESC, id DESC
                  LIMIT $2
              )
            ",
        )
        .bind(user_id)
        .bind(history_cap())
        .execute(&mut *tx)
        .await?;

        let history = load_scores(&mut *tx, user_id).await?;

        tx.commit().await?;

        Ok(history)
    }

    /// Get the score history for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_scores(&self, user_id: UserId) -> Result<ScoreHistory, RepositoryError> {
        load_scores(self.pool, user_id).await
    }

    async fn with_scores(&self, row: Option<UserRow>) -> Result<Option<User>, RepositoryError> {
        match row {
            Some(r) => {
                let scores = load_scores(self.pool, r.id).await?;
                Ok(Some(r.into_user(scores)?))
            }
            None => Ok(None),
        }
    }
}

const LOCK_USER_SQL: &str = r"
    SELECT id FROM tetribass.user
    WHERE id = $1
    FOR UPDATE
    ";

#[allow(clippy::cast_possible_wrap)] // The cap is a small constant
const fn history_cap() -> i64 {
    SCORE_HISTORY_CAP as i64
}

async fn insert_score(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    entry: &ScoreEntry,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO tetribass.score (user_id, score, recorded_at)
        VALUES ($1, $2, $3)
        ",
    )
    .bind(user_id)
    .bind(i64::from(entry.score))
    .bind(entry.timestamp)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn load_scores<'e, E>(executor: E, user_id: UserId) -> Result<ScoreHistory, RepositoryError>
where
    E: sqlx::PgExecutor<'e>,
{
    let mut rows = sqlx::query_as::<_, ScoreRow>(
        r"
        SELECT score, recorded_at
        FROM tetribass.score
        WHERE user_id = $1
        ORDER BY recorded_at DESC, id DESC
        LIMIT $2
        ",
    )
    .bind(user_id)
    .bind(history_cap())
    .fetch_all(executor)
    .await?;

    // Newest first from the query; the history is oldest first
    rows.reverse();

    let entries = rows
        .into_iter()
        .map(ScoreEntry::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScoreHistory::from(entries))
}

impl UserStore for UserRepository<'_> {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        self.get_by_email(email).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.get_by_id(id).await
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        Self::create(self, new_user).await
    }

    async fn record_score(
        &self,
        user_id: UserId,
        entry: ScoreEntry,
    ) -> Result<ScoreHistory, RepositoryError> {
        Self::record_score(self, user_id, entry).await
    }
}
