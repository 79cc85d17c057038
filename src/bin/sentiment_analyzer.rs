//! Sentiment analyzer service
//!
//! Serves `GET /analyze/{text}` using the VADER lexicon.

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dealership::{api::build_analyzer_router, config::Config, services::VaderScorer};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dealership=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load_with_env(Path::new("config.yml"))?;

    let app = build_analyzer_router(VaderScorer::boxed());

    let addr = format!("{}:{}", config.analyzer.host, config.analyzer.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Sentiment analyzer listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
