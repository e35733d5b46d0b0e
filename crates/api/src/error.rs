use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tokenpair_core::auth::{SessionError, SessionErrorKind, StoreError};
use tokenpair_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps domain, session and storage errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tokenpair_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure from the session rotator.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A failure from a session or user store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            AppError::Session(err) => classify_session_error(err),

            AppError::Store(err) => classify_store_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a rotator failure into an HTTP status, error code, and message.
///
/// - Any rejection of the presented credentials maps to 401.
/// - A lost rotation race maps to 409.
/// - An exceeded operation deadline maps to 408.
/// - Everything else maps to 500 with a sanitized message.
fn classify_session_error(err: &SessionError) -> (StatusCode, &'static str, String) {
    let kind = err.kind();
    if kind.is_credential_failure() {
        return (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string());
    }
    match kind {
        SessionErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
        SessionErrorKind::Timeout => (
            StatusCode::REQUEST_TIMEOUT,
            "TIMEOUT",
            err.message().to_string(),
        ),
        _ => {
            tracing::error!(error = %err, kind = %kind, "Session operation failed");
            internal()
        }
    }
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// - `NotFound` maps to 404.
/// - Unique constraint violations map to 409.
/// - Backend failures map to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::NotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        StoreError::Duplicate(constraint) => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        StoreError::Backend(source) => {
            tracing::error!(error = %source, "Store error");
            internal()
        }
    }
}
