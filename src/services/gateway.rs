//! Remote dealer gateway
//!
//! Outbound HTTP client for the dealership/review service, the inventory
//! search service and the sentiment analyzer. Every call returns a
//! `Result<Value, GatewayError>`; handlers collapse failures to `null` with
//! `.ok()` after the gateway has logged them.
//!
//! URLs are built as `base + endpoint + "?" + "key=value&"...`, so a request
//! without filters still ends in `?` and a single filter leaves a trailing `&`.
//! Downstream services rely on this exact shape.

use crate::config::ServicesConfig;
use crate::models::{SentimentLabel, SentimentResponse};
use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Failure of a single downstream call
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Connection refused, timeout, broken body stream
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response whose body is not JSON
    #[error("Downstream returned status {0}")]
    Status(u16),

    /// 2xx response whose body is not the expected JSON
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// JSON decoded but not in the shape the caller needs
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

/// Classifies review text remotely
#[async_trait]
pub trait ReviewClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<SentimentLabel, GatewayError>;
}

/// Client for the external dealer, inventory and sentiment services
#[derive(Debug, Clone)]
pub struct DealerGateway {
    client: reqwest::Client,
    backend_url: String,
    sentiment_analyzer_url: String,
    searchcars_url: String,
}

impl DealerGateway {
    /// Build a gateway with one shared client and the configured timeout
    pub fn new(config: &ServicesConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("dealership/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            backend_url: config.backend_url.clone(),
            sentiment_analyzer_url: config.sentiment_analyzer_url.clone(),
            searchcars_url: config.searchcars_url.clone(),
        })
    }

    /// GET an endpoint of the dealership/review service
    pub async fn get_request(
        &self,
        endpoint: &str,
        filters: &[(&str, &str)],
    ) -> Result<Value, GatewayError> {
        let url = request_url(&self.backend_url, endpoint, filters);
        self.send(self.client.get(&url), &url).await
    }

    /// GET an endpoint of the inventory search service
    pub async fn searchcars_request(
        &self,
        endpoint: &str,
        filters: &[(&str, &str)],
    ) -> Result<Value, GatewayError> {
        let url = request_url(&self.searchcars_url, endpoint, filters);
        self.send(self.client.get(&url), &url).await
    }

    /// POST a review to the dealership/review service
    pub async fn post_review(&self, review: &Value) -> Result<Value, GatewayError> {
        let url = join_url(&self.backend_url, "/insert_review");
        self.send(self.client.post(&url).json(review), &url).await
    }

    /// Ask the sentiment analyzer for the label of `text`
    pub async fn analyze_review_sentiments(
        &self,
        text: &str,
    ) -> Result<SentimentLabel, GatewayError> {
        let url = sentiment_url(&self.sentiment_analyzer_url, text);
        let body = self.send(self.client.get(&url), &url).await?;

        serde_json::from_value::<SentimentResponse>(body)
            .map(|r| r.sentiment)
            .map_err(|e| {
                tracing::warn!("Unexpected sentiment response from {}: {}", url, e);
                GatewayError::UnexpectedShape(e.to_string())
            })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<Value, GatewayError> {
        tracing::debug!("Calling {}", url);

        match execute(request).await {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!("Network exception calling {}: {}", url, e);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl ReviewClassifier for DealerGateway {
    async fn classify(&self, text: &str) -> Result<SentimentLabel, GatewayError> {
        self.analyze_review_sentiments(text).await
    }
}

async fn execute(request: reqwest::RequestBuilder) -> Result<Value, GatewayError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.bytes().await?;

    match serde_json::from_slice::<Value>(&body) {
        Ok(value) => {
            if !status.is_success() {
                tracing::debug!("Passing through JSON body of {} response", status);
            }
            Ok(value)
        }
        Err(_) if !status.is_success() => Err(GatewayError::Status(status.as_u16())),
        Err(e) => Err(GatewayError::Decode(e.to_string())),
    }
}

/// Join a base URL and an endpoint with exactly one `/` between them
pub fn join_url(base: &str, endpoint: &str) -> String {
    if endpoint.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Full request URL with the `?key=value&` query string
pub fn request_url(base: &str, endpoint: &str, filters: &[(&str, &str)]) -> String {
    let mut url = join_url(base, endpoint);
    url.push('?');
    for (key, value) in filters {
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
        url.push('&');
    }
    url
}

/// `{base}/analyze/{text}` with the text escaped into a single path segment.
///
/// `.` and `..` are dot segments to URL parsers even when percent-encoded, so
/// those two texts travel as `{base}/analyze?text=...` instead.
pub fn sentiment_url(base: &str, text: &str) -> String {
    if matches!(text, "." | "..") {
        return format!("{}?text={}", join_url(base, "analyze"), text);
    }
    format!("{}{}", join_url(base, "analyze/"), urlencoding::encode(text))
}
