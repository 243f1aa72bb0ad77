use axum::{
    routing::{get, patch, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use ledger_rs::{
    config::Config,
    db,
    health::health,
    routes::accounts::{create_account, deactivate_account, get_account_tree, update_account},
    routes::journal::{create_draft, get_entry, post_entry, reverse_entry, update_draft},
    routes::ledger::get_account_ledger,
    routes::trial_balance::get_trial_balance,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("Starting ledger service...");

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration from environment");

    tracing::info!(
        "Configuration loaded: host={}, port={}",
        config.host,
        config.port
    );

    // Database connection
    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    sqlx::migrate!("./db/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Build the application router
    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/ledger/accounts", post(create_account))
        .route("/api/ledger/accounts/tree", get(get_account_tree))
        .route("/api/ledger/accounts/{id}", patch(update_account))
        .route("/api/ledger/accounts/{id}/deactivate", post(deactivate_account))
        .route("/api/ledger/accounts/{id}/ledger", get(get_account_ledger))
        .route("/api/ledger/journal-entries", post(create_draft))
        .route("/api/ledger/journal-entries/{id}", get(get_entry).put(update_draft))
        .route("/api/ledger/journal-entries/{id}/post", post(post_entry))
        .route("/api/ledger/journal-entries/{id}/reverse", post(reverse_entry))
        .route("/api/ledger/trial-balance", get(get_trial_balance))
        .with_state(Arc::new(pool.clone()))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        );

    // Bind to the configured address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("HOST/PORT do not form a valid socket address");
    tracing::info!("Ledger service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    // Start the server
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
