//! Repository for the `sessions` table.

use sqlx::PgPool;
use tokenpair_core::auth::{NewSession, SessionUpdate};
use tokenpair_core::types::DbId;

use crate::models::session::SessionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, access_token_id, refresh_token_hash, ip, created_at, version";

/// Provides the session queries used by the rotator.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert the first session of a user, returning the created row.
    ///
    /// Fails with a unique violation on `uq_sessions_user_id` if the user
    /// already has a session.
    pub async fn create(pool: &PgPool, input: &NewSession) -> Result<SessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, access_token_id, refresh_token_hash, ip, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(input.user_id)
            .bind(&input.access_token_id)
            .bind(&input.refresh_token_hash)
            .bind(&input.ip)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// Replace the generation of session `id` if it is still at
    /// `expected_version`, bumping the version.
    ///
    /// Returns `None` when the row is gone or another writer got there first.
    pub async fn compare_and_update(
        pool: &PgPool,
        id: DbId,
        expected_version: i64,
        input: &SessionUpdate,
    ) -> Result<Option<SessionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE sessions SET
                access_token_id = $3,
                refresh_token_hash = $4,
                ip = $5,
                created_at = $6,
                version = version + 1
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(&input.access_token_id)
            .bind(&input.refresh_token_hash)
            .bind(&input.ip)
            .bind(input.created_at)
            .fetch_optional(pool)
            .await
    }

    /// Find the session of a user.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<SessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE user_id = $1");
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List all sessions ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<SessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions ORDER BY id");
        sqlx::query_as::<_, SessionRow>(&query).fetch_all(pool).await
    }
}
