//! Review enrichment pipeline
//!
//! Fetches a dealer's reviews and attaches a `sentiment` label to each one.
//! Classification calls run concurrently, bounded by `review_concurrency`,
//! and results are joined back in fetch order.
//!
//! A review whose classification fails, or which has no textual `review`
//! field, is labelled `"unknown"` and kept in place. A failed or malformed
//! review listing fails the whole pipeline.

use crate::models::DealerId;
use crate::services::gateway::{DealerGateway, GatewayError, ReviewClassifier};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::sync::Arc;

/// Label attached when a review cannot be classified
pub const UNKNOWN_SENTIMENT: &str = "unknown";

/// Reviews of a dealer, enriched with sentiment
pub struct ReviewService {
    gateway: Arc<DealerGateway>,
    classifier: Arc<dyn ReviewClassifier>,
    concurrency: usize,
}

impl ReviewService {
    pub fn new(
        gateway: Arc<DealerGateway>,
        classifier: Arc<dyn ReviewClassifier>,
        concurrency: usize,
    ) -> Self {
        Self {
            gateway,
            classifier,
            concurrency,
        }
    }

    /// Fetch and classify the reviews of `dealer_id`
    pub async fn dealer_reviews(&self, dealer_id: DealerId) -> Result<Vec<Value>, GatewayError> {
        let endpoint = format!("/fetchReviews/dealer/{}", dealer_id);
        let reviews = self.gateway.get_request(&endpoint, &[]).await?;

        enrich_reviews(reviews, self.classifier.as_ref(), self.concurrency).await
    }
}

/// Attach a sentiment label to every review of a fetched listing.
///
/// Output has the same length and order as the input array.
pub async fn enrich_reviews(
    reviews: Value,
    classifier: &dyn ReviewClassifier,
    concurrency: usize,
) -> Result<Vec<Value>, GatewayError> {
    let reviews = match reviews {
        Value::Array(reviews) => reviews,
        other => {
            tracing::warn!("Review listing is not an array: {}", type_name(&other));
            return Err(GatewayError::UnexpectedShape(format!(
                "expected an array of reviews, got {}",
                type_name(&other)
            )));
        }
    };

    let enriched = stream::iter(reviews)
        .map(|review| label_review(review, classifier))
        .buffered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    Ok(enriched)
}

async fn label_review(mut review: Value, classifier: &dyn ReviewClassifier) -> Value {
    if !review.is_object() {
        tracing::warn!("Skipping review that is not an object");
        return review;
    }

    let label = match review.get("review").and_then(Value::as_str) {
        Some(text) => match classifier.classify(text).await {
            Ok(label) => label.to_string(),
            Err(e) => {
                tracing::warn!("Could not classify review: {}", e);
                UNKNOWN_SENTIMENT.to_string()
            }
        },
        None => UNKNOWN_SENTIMENT.to_string(),
    };
    if let Some(fields) = review.as_object_mut() {
        fields.insert("sentiment".to_string(), Value::String(label));
    }

    review
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
