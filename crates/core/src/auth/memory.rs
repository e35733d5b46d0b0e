//! In-process implementations of the collaborator traits.
//!
//! They follow the same rules as the PostgreSQL store (one session per user,
//! unique emails, versioned compare-and-update) and back the rotator and HTTP
//! tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::store::{
    NewSession, Notifier, NotifyError, Session, SessionStore, SessionUpdate, StoreError, User,
    UserStore,
};
use crate::types::DbId;

#[derive(Debug, Default)]
struct SessionTable {
    next_id: DbId,
    /// Keyed by user id.
    rows: HashMap<DbId, Session>,
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    table: Mutex<SessionTable>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, input: &NewSession) -> Result<Session, StoreError> {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        if table.rows.contains_key(&input.user_id) {
            return Err(StoreError::Duplicate("uq_sessions_user_id".into()));
        }
        table.next_id += 1;
        let session = Session {
            id: table.next_id,
            user_id: input.user_id,
            access_token_id: input.access_token_id.clone(),
            refresh_token_hash: input.refresh_token_hash.clone(),
            ip: input.ip.clone(),
            created_at: input.created_at,
            version: 1,
        };
        table.rows.insert(input.user_id, session.clone());
        Ok(session)
    }

    async fn compare_and_update(
        &self,
        id: DbId,
        expected_version: i64,
        update: &SessionUpdate,
    ) -> Result<Session, StoreError> {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        let row = table
            .rows
            .values_mut()
            .find(|s| s.id == id && s.version == expected_version)
            .ok_or(StoreError::NotFound)?;

        row.access_token_id = update.access_token_id.clone();
        row.refresh_token_hash = update.refresh_token_hash.clone();
        row.ip = update.ip.clone();
        row.created_at = update.created_at;
        row.version += 1;
        Ok(row.clone())
    }

    async fn get_by_user_id(&self, user_id: DbId) -> Result<Session, StoreError> {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.rows.get(&user_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Session>, StoreError> {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        let mut sessions: Vec<Session> = table.rows.values().cloned().collect();
        sessions.sort_by_key(|s| s.id);
        Ok(sessions)
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, email: &str) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        if users.iter().any(|u| u.email == email) {
            return Err(StoreError::Duplicate("uq_users_email".into()));
        }
        let user = User {
            id: users.len() as DbId + 1,
            email: email.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: DbId) -> Result<User, StoreError> {
        let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }
}

/// A notice captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotice {
    pub old_ip: String,
    pub email: String,
}

/// Records every notice; optionally fails every delivery.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotice>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose deliveries always fail (nothing is recorded).
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<SentNotice> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_login_from_new_ip(&self, old_ip: &str, email: &str) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Delivery("mail relay unavailable".into()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentNotice {
                old_ip: old_ip.to_string(),
                email: email.to_string(),
            });
        Ok(())
    }
}
