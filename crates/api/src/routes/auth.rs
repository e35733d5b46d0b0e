//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// GET  /login/{user_id}  -> login
/// POST /refresh          -> refresh (Bearer access token)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login/{user_id}", get(auth::login))
        .route("/refresh", post(auth::refresh))
}
