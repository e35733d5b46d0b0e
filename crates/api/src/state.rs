use std::sync::Arc;
use std::time::Duration;

use tokenpair_core::auth::{SessionRotator, SessionStore, UserStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Issues and rotates token pairs.
    pub rotator: Arc<SessionRotator>,
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    /// Deadline applied around each rotator call.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.config.operation_timeout_secs)
    }
}
