//! Handlers for the `/session` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/v1/session/list
///
/// Returns 204 when no session has been issued yet.
pub async fn list(State(state): State<AppState>) -> AppResult<Response> {
    let sessions = state.sessions.list().await?;
    if sessions.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(sessions).into_response())
}
