//! Session row model.

use sqlx::FromRow;
use tokenpair_core::auth::Session;
use tokenpair_core::types::{DbId, UnixSeconds};

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: DbId,
    pub user_id: DbId,
    pub access_token_id: String,
    pub refresh_token_hash: String,
    pub ip: String,
    pub created_at: UnixSeconds,
    pub version: i64,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            access_token_id: row.access_token_id,
            refresh_token_hash: row.refresh_token_hash,
            ip: row.ip,
            created_at: row.created_at,
            version: row.version,
        }
    }
}
