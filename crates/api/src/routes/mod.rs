pub mod auth;
pub mod health;
pub mod session;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api/v1`.
///
/// ```text
/// /auth/*     -> auth::router
/// /user/*     -> user::router
/// /session/*  -> session::router
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/user", user::router())
        .nest("/session", session::router())
}
