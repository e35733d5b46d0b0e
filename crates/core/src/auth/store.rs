//! Collaborator seams of the rotator: session persistence, user lookup and
//! the new-IP notifier.
//!
//! Implementations must keep at most one session per user. The PostgreSQL
//! store does so with a `UNIQUE (user_id)` constraint; [`super::memory`]
//! enforces the same rule in process.

use async_trait::async_trait;
use serde::Serialize;

use super::error::BoxError;
use crate::types::{DbId, UnixSeconds};

/// The single persisted session of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    /// `jti` of the access token of the current generation.
    pub access_token_id: String,
    /// Argon2id PHC hash of the current refresh secret.
    pub refresh_token_hash: String,
    pub ip: String,
    /// Issue time of the current generation.
    pub created_at: UnixSeconds,
    /// Starts at 1, bumped by every successful compare-and-update.
    pub version: i64,
}

/// Input for the first session of a user.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: DbId,
    pub access_token_id: String,
    pub refresh_token_hash: String,
    pub ip: String,
    pub created_at: UnixSeconds,
}

/// Replacement generation applied by a compare-and-update.
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub access_token_id: String,
    pub refresh_token_hash: String,
    pub ip: String,
    pub created_at: UnixSeconds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No matching row, including a compare-and-update whose version is stale.
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("duplicate value violates unique constraint: {0}")]
    Duplicate(String),

    #[error("storage backend error: {0}")]
    Backend(#[source] BoxError),
}

impl StoreError {
    pub fn backend(err: impl Into<BoxError>) -> Self {
        Self::Backend(err.into())
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert the first session of a user, returning the stored row.
    async fn create(&self, input: &NewSession) -> Result<Session, StoreError>;

    /// Replace the generation of session `id` if its version still equals
    /// `expected_version`, incrementing the version.
    ///
    /// Returns [`StoreError::NotFound`] when no row matches both.
    async fn compare_and_update(
        &self,
        id: DbId,
        expected_version: i64,
        update: &SessionUpdate,
    ) -> Result<Session, StoreError>;

    async fn get_by_user_id(&self, user_id: DbId) -> Result<Session, StoreError>;

    async fn list(&self) -> Result<Vec<Session>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, email: &str) -> Result<User, StoreError>;

    async fn get_by_id(&self, id: DbId) -> Result<User, StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid notification address: {0}")]
    Address(String),

    #[error("notification delivery failed: {0}")]
    Delivery(#[source] BoxError),
}

/// Outbound channel for security notices.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell `email` that their session was refreshed from an address other
    /// than `old_ip`, the one the access token was issued to.
    async fn send_login_from_new_ip(&self, old_ip: &str, email: &str) -> Result<(), NotifyError>;
}
