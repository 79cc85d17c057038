//! Sentiment analyzer HTTP surface, served by the `sentiment-analyzer` binary
//!
//! - GET / - Welcome text
//! - GET /analyze/{text} - `{"sentiment": "positive" | "negative" | "neutral"}`
//! - GET /analyze/ - Classifies the empty string
//! - GET /analyze?text=... - Same as the path form, for texts that cannot be
//!   a path segment (`.` and `..`)

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::models::SentimentResponse;
use crate::services::{analyze, DynPolarityScorer};

pub const WELCOME: &str = "Welcome to the Sentiment Analyzer. Use /analyze/text to get the sentiment";

/// Build the analyzer router around a scorer
pub fn build_analyzer_router(scorer: DynPolarityScorer) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/analyze", get(analyze_query))
        .route("/analyze/", get(analyze_empty))
        .route("/analyze/{text}", get(analyze_text))
        .layer(TraceLayer::new_for_http())
        .with_state(scorer)
}

async fn welcome() -> &'static str {
    WELCOME
}

async fn analyze_text(
    State(scorer): State<DynPolarityScorer>,
    Path(text): Path<String>,
) -> Json<SentimentResponse> {
    Json(SentimentResponse {
        sentiment: analyze(scorer.as_ref(), &text),
    })
}

#[derive(Debug, Deserialize)]
struct AnalyzeQuery {
    #[serde(default)]
    text: String,
}

async fn analyze_query(
    State(scorer): State<DynPolarityScorer>,
    Query(query): Query<AnalyzeQuery>,
) -> Json<SentimentResponse> {
    Json(SentimentResponse {
        sentiment: analyze(scorer.as_ref(), &query.text),
    })
}

async fn analyze_empty(State(scorer): State<DynPolarityScorer>) -> Json<SentimentResponse> {
    Json(SentimentResponse {
        sentiment: analyze(scorer.as_ref(), ""),
    })
}
