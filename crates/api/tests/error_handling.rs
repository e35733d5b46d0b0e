//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use tokenpair_api::error::AppError;
use tokenpair_core::auth::{SessionError, SessionErrorKind, StoreError, TokenError};
use tokenpair_core::error::CoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "User",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "User with id 42 not found");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

#[tokio::test]
async fn credential_failures_return_401() {
    for kind in [
        SessionErrorKind::Expired,
        SessionErrorKind::ValidationFailed,
        SessionErrorKind::SessionNotExists,
        SessionErrorKind::AlgorithmMismatch,
    ] {
        let (status, json) =
            error_to_response(AppError::Session(SessionError::new(kind, "rejected"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{kind}");
        assert_eq!(json["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn token_error_message_is_reported() {
    let err = AppError::Session(SessionError::from(TokenError::BadSignature));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        json["error"],
        "failed to verify access token: token signature is invalid"
    );
}

#[tokio::test]
async fn conflict_returns_409() {
    let err = AppError::Session(SessionError::new(
        SessionErrorKind::Conflict,
        "session was rotated concurrently",
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn timeout_returns_408() {
    let err = AppError::Session(SessionError::new(
        SessionErrorKind::Timeout,
        "session operation deadline exceeded",
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(json["code"], "TIMEOUT");
    assert_eq!(json["error"], "session operation deadline exceeded");
}

#[tokio::test]
async fn server_side_session_failures_are_sanitized() {
    let err = AppError::Session(SessionError::internal(
        "failed to load user",
        "connection refused by db-primary:5432",
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn store_errors_map_by_cause() {
    let (status, _) = error_to_response(AppError::Store(StoreError::NotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = error_to_response(AppError::Store(StoreError::Duplicate(
        "uq_users_email".into(),
    )))
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        json["error"],
        "Duplicate value violates unique constraint: uq_users_email"
    );

    let (status, json) =
        error_to_response(AppError::Store(StoreError::backend("disk full"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
