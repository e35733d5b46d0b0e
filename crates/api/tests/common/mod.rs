#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use tokenpair_api::config::{ServerConfig, TokenConfig};
use tokenpair_api::router::build_app_router;
use tokenpair_api::state::AppState;
use tokenpair_core::auth::memory::{MemorySessionStore, MemoryUserStore, RecordingNotifier};
use tokenpair_core::auth::{SessionRotator, TokenCodec, UserStore};

/// Signing secret shared by the test app and assertions that decode tokens.
pub const TEST_SECRET: &str = "integration-test-secret-with-enough-entropy";

/// Address sent in `x-forwarded-for` unless a test overrides it.
pub const CLIENT_IP: &str = "203.0.113.7";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        operation_timeout_secs: 5,
        token: TokenConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 30,
            refresh_token_expiry_days: 30,
        },
    }
}

/// The application plus handles on its in-memory collaborators.
pub struct TestApp {
    pub router: Router,
    pub sessions: Arc<MemorySessionStore>,
    pub users: Arc<MemoryUserStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub fn codec(&self) -> TokenCodec {
        TokenCodec::new(TEST_SECRET.as_bytes())
    }
}

/// Build the full application router over in-memory stores.
///
/// Uses the production middleware stack from [`build_app_router`].
pub fn build_test_app() -> TestApp {
    build_test_app_with(RecordingNotifier::new())
}

pub fn build_test_app_with(notifier: RecordingNotifier) -> TestApp {
    let config = test_config();
    let sessions = Arc::new(MemorySessionStore::new());
    let users = Arc::new(MemoryUserStore::new());
    let notifier = Arc::new(notifier);

    let rotator = SessionRotator::new(
        TokenCodec::new(config.token.secret.as_bytes()),
        sessions.clone(),
        users.clone(),
        notifier.clone(),
        config.token.policy(),
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        rotator: Arc::new(rotator),
        users: users.clone(),
        sessions: sessions.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        sessions,
        users,
        notifier,
    }
}

/// Build the application over the given user store and configuration, with
/// an empty in-memory session store.
pub fn build_app_over(users: Arc<dyn UserStore>, config: ServerConfig) -> Router {
    let sessions = Arc::new(MemorySessionStore::new());
    let rotator = SessionRotator::new(
        TokenCodec::new(config.token.secret.as_bytes()),
        sessions.clone(),
        users.clone(),
        Arc::new(RecordingNotifier::new()),
        config.token.policy(),
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        rotator: Arc::new(rotator),
        users,
        sessions,
    };
    build_app_router(state, &config)
}

/// Send a GET request from [`CLIENT_IP`].
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    get_from(app, uri, CLIENT_IP).await
}

/// Send a GET request with the given forwarded client address.
pub async fn get_from(app: Router, uri: &str, ip: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body from [`CLIENT_IP`].
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-forwarded-for", CLIENT_IP)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send `POST /api/v1/auth/refresh` with the pair, from `ip`.
pub async fn post_refresh(
    app: Router,
    access_token: &str,
    refresh_token: &str,
    ip: &str,
) -> Response<Body> {
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/refresh")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {access_token}"))
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a user through the API and return its id.
pub async fn create_user(app: Router, email: &str) -> i64 {
    let response = post_json(
        app,
        "/api/v1/user/create",
        serde_json::json!({ "email": email }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Log `user_id` in from [`CLIENT_IP`] and return `(access, refresh)`.
pub async fn login(app: Router, user_id: i64) -> (String, String) {
    let response = get(app, &format!("/api/v1/auth/login/{user_id}")).await;
    assert_eq!(response.status(), 200);
    let json = body_json(response).await;
    (
        json["access_token"].as_str().unwrap().to_string(),
        json["refresh_token"].as_str().unwrap().to_string(),
    )
}
