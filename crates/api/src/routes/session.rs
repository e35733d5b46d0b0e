use axum::routing::get;
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// Routes mounted at `/session`.
pub fn router() -> Router<AppState> {
    Router::new().route("/list", get(session::list))
}
