//! Sentiment value types shared by the classifier service and its clients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical sentiment of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

/// Raw polarity weights produced by a lexicon scorer.
///
/// `pos`, `neg` and `neu` are non-negative and comparable with each other.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentScores {
    pub pos: f64,
    pub neg: f64,
    pub neu: f64,
    pub compound: f64,
}

/// Body returned by `GET /analyze/{text}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentResponse {
    pub sentiment: SentimentLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_wire_format() {
        let body = SentimentResponse {
            sentiment: SentimentLabel::Neutral,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"sentiment":"neutral"}"#
        );

        let parsed: SentimentResponse =
            serde_json::from_str(r#"{"sentiment":"negative"}"#).unwrap();
        assert_eq!(parsed.sentiment, SentimentLabel::Negative);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        assert!(serde_json::from_str::<SentimentResponse>(r#"{"sentiment":"mixed"}"#).is_err());
    }
}
