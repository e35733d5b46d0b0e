//! HTTP-level integration tests for the user and session listings.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, create_user, get, login, post_json, CLIENT_IP};
use serde_json::json;

#[tokio::test]
async fn create_user_returns_201_with_row() {
    let test = build_test_app();
    let response = post_json(
        test.app(),
        "/api/v1/user/create",
        json!({ "email": "user@gmail.com" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["id"], 1);
    assert_eq!(json["email"], "user@gmail.com");
}

#[tokio::test]
async fn duplicate_email_returns_409() {
    let test = build_test_app();
    create_user(test.app(), "user@gmail.com").await;

    let response = post_json(
        test.app(),
        "/api/v1/user/create",
        json!({ "email": "user@gmail.com" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn invalid_email_returns_400() {
    let test = build_test_app();
    let response = post_json(
        test.app(),
        "/api/v1/user/create",
        json!({ "email": "not-an-email" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn missing_email_field_is_rejected() {
    let test = build_test_app();
    let response = post_json(test.app(), "/api/v1/user/create", json!({})).await;

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn empty_lists_return_204() {
    let test = build_test_app();

    assert_eq!(
        get(test.app(), "/api/v1/user/list").await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        get(test.app(), "/api/v1/session/list").await.status(),
        StatusCode::NO_CONTENT
    );
}

#[tokio::test]
async fn lists_return_rows() {
    let test = build_test_app();
    let first = create_user(test.app(), "first@gmail.com").await;
    create_user(test.app(), "second@gmail.com").await;
    login(test.app(), first).await;

    let users = get(test.app(), "/api/v1/user/list").await;
    assert_eq!(users.status(), StatusCode::OK);
    let users = body_json(users).await;
    assert_eq!(users.as_array().unwrap().len(), 2);

    let sessions = get(test.app(), "/api/v1/session/list").await;
    assert_eq!(sessions.status(), StatusCode::OK);
    let sessions = body_json(sessions).await;
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["user_id"], first);
    assert_eq!(sessions[0]["ip"], CLIENT_IP);
    assert_eq!(sessions[0]["version"], 1);
}
