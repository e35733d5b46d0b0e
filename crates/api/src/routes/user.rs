use axum::routing::{get, post};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/user`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(user::create))
        .route("/list", get(user::list))
}
