//! PostgreSQL-backed implementations of the core storage traits.

use async_trait::async_trait;
use tokenpair_core::auth::{
    NewSession, Session, SessionStore, SessionUpdate, StoreError, User, UserStore,
};
use tokenpair_core::types::DbId;

use crate::repositories::{SessionRepo, UserRepo};
use crate::DbPool;

/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Classify a sqlx error into the storage-neutral [`StoreError`].
///
/// - `RowNotFound` maps to `NotFound`.
/// - Unique constraint violations map to `Duplicate` with the constraint name.
/// - Everything else is a backend failure.
pub fn classify_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Duplicate(db_err.constraint().unwrap_or("unknown").to_string())
        }
        other => StoreError::backend(other),
    }
}

#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, input: &NewSession) -> Result<Session, StoreError> {
        let row = SessionRepo::create(&self.pool, input)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.into())
    }

    async fn compare_and_update(
        &self,
        id: DbId,
        expected_version: i64,
        update: &SessionUpdate,
    ) -> Result<Session, StoreError> {
        SessionRepo::compare_and_update(&self.pool, id, expected_version, update)
            .await
            .map_err(classify_sqlx_error)?
            .map(Session::from)
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_user_id(&self, user_id: DbId) -> Result<Session, StoreError> {
        SessionRepo::find_by_user_id(&self.pool, user_id)
            .await
            .map_err(classify_sqlx_error)?
            .map(Session::from)
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Session>, StoreError> {
        let rows = SessionRepo::list(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(rows.into_iter().map(Session::from).collect())
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, email: &str) -> Result<User, StoreError> {
        let row = UserRepo::create(&self.pool, email)
            .await
            .map_err(classify_sqlx_error)?;
        tracing::info!(user_id = row.id, "User created");
        Ok(row.into())
    }

    async fn get_by_id(&self, id: DbId) -> Result<User, StoreError> {
        UserRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?
            .map(User::from)
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = UserRepo::list(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}
