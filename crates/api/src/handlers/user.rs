//! Handlers for the `/user` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tokenpair_core::error::CoreError;
use validator::Validate;

use crate::error::AppResult;
use crate::state::AppState;

/// Request body for `POST /user/create`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

/// POST /api/v1/user/create
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<Response> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    let user = state.users.create(&input.email).await?;

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// GET /api/v1/user/list
///
/// Returns 204 when there are no users.
pub async fn list(State(state): State<AppState>) -> AppResult<Response> {
    let users = state.users.list().await?;
    if users.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(users).into_response())
}
