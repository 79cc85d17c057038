//! API layer - HTTP handlers and routing
//!
//! - Auth endpoints (login, logout, registration)
//! - Car catalog endpoint
//! - Dealer, review and inventory endpoints backed by external services
//! - The sentiment analyzer router, served by its own binary

pub mod analyzer;
pub mod auth;
pub mod cars;
pub mod dealers;
pub mod middleware;

use anyhow::Context;
use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use analyzer::build_analyzer_router;
pub use middleware::{ApiError, AppState, Identity};

/// Build the `/api/v1` router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(cars::router())
        .merge(dealers::router())
        .fallback(|| async { ApiError::not_found("No such endpoint") })
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;

    // Credentials are allowed so the session cookie travels cross-origin
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Ok(Router::new()
        .nest("/api/v1", build_api_router())
        .route("/health", get(health))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::resolve_identity,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// GET /health
async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.pool.ping().await.map_err(|e| {
        tracing::error!("Health check failed: {:#}", e);
        ApiError::internal_error("Database unavailable")
    })?;
    Ok(Json(json!({ "status": "ok" })))
}
