use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tokenpair_api::config::ServerConfig;
use tokenpair_api::router::build_app_router;
use tokenpair_api::state::AppState;
use tokenpair_core::auth::{Notifier, SessionRotator, SessionStore, TokenCodec, UserStore};
use tokenpair_db::{PgSessionStore, PgUserStore};
use tokenpair_events::{EmailConfig, EmailDelivery, EmailNotifier, LogNotifier};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tokenpair_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = tokenpair_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    tokenpair_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    tokenpair_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Notifier ---
    let notifier: Arc<dyn Notifier> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(smtp_host = %email_config.smtp_host, "Email notifications enabled");
            let delivery = EmailDelivery::new(email_config).expect("Failed to build SMTP transport");
            Arc::new(EmailNotifier::new(delivery))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, new-IP notices will only be logged");
            Arc::new(LogNotifier)
        }
    };

    // --- Session rotator ---
    let sessions: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool.clone()));
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
    let rotator = SessionRotator::new(
        TokenCodec::new(config.token.secret.as_bytes()),
        Arc::clone(&sessions),
        Arc::clone(&users),
        notifier,
        config.token.policy(),
    );

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        rotator: Arc::new(rotator),
        users,
        sessions,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
