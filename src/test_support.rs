//! Helpers shared by tests that talk to fake downstream services.

use axum::Router;
use axum_test::TestServer;

use crate::api::{build_router, AppState};
use crate::config::ServicesConfig;
use crate::db::{create_test_pool, migrations::run_migrations};

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}

/// A base URL nothing listens on
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);
    format!("http://{}", addr)
}

/// Downstream service settings pointing every service at the given URLs
pub fn services_config(backend: &str, analyzer: &str, searchcars: &str) -> ServicesConfig {
    ServicesConfig {
        backend_url: backend.to_string(),
        sentiment_analyzer_url: analyzer.to_string(),
        searchcars_url: searchcars.to_string(),
        request_timeout_secs: 2,
        review_concurrency: 4,
    }
}

/// Application state on a fresh, migrated in-memory database
pub async fn test_state(services: &ServicesConfig) -> AppState {
    let pool = create_test_pool()
        .await
        .expect("Failed to create test pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    AppState::new(pool, services).expect("Failed to build app state")
}

/// A test server running the full router, keeping cookies between requests
pub fn test_server(state: AppState) -> TestServer {
    let router = build_router(state, "http://localhost:3000").expect("Failed to build router");
    TestServer::builder()
        .save_cookies()
        .build(router)
        .expect("Failed to start test server")
}
