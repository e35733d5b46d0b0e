//! Handlers for the `/auth` resource (login, refresh).

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tokenpair_core::auth::{run_with_deadline, StoreError, TokenPair};
use tokenpair_core::error::CoreError;
use tokenpair_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::BearerToken;
use crate::middleware::client_ip::ClientIp;
use crate::state::AppState;

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// GET /api/v1/auth/login/{user_id}
///
/// Issue a token pair for an existing user, bound to the caller's address.
pub async fn login(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    ClientIp(ip): ClientIp,
) -> AppResult<Json<TokenPair>> {
    let pair = run_with_deadline(state.operation_timeout(), async {
        let user = state.users.get_by_id(user_id).await.map_err(|e| match e {
            StoreError::NotFound => AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user_id,
            }),
            other => AppError::Store(other),
        })?;
        let pair = state.rotator.create_session(user.id, &ip).await?;
        Ok::<_, AppError>(pair)
    })
    .await?;

    tracing::info!(user_id, %ip, "User logged in");
    Ok(Json(pair))
}

/// POST /api/v1/auth/refresh
///
/// Exchange the current pair (access token in the `Authorization` header,
/// refresh token in the body) for a new one.
pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(access_token): BearerToken,
    ClientIp(ip): ClientIp,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = run_with_deadline(
        state.operation_timeout(),
        state
            .rotator
            .refresh_session(&access_token, &input.refresh_token, &ip),
    )
    .await?;

    Ok(Json(pair))
}
