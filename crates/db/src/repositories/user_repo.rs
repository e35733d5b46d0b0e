//! Repository for the `users` table.

use sqlx::PgPool;
use tokenpair_core::types::DbId;

use crate::models::user::UserRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, created_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, email: &str) -> Result<UserRow, sqlx::Error> {
        let query = format!("INSERT INTO users (email) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all users ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY id");
        sqlx::query_as::<_, UserRow>(&query).fetch_all(pool).await
    }
}
