//! Sentiment classification
//!
//! A `PolarityScorer` turns text into raw pos/neg/neu weights and `classify`
//! reduces those weights to a single label.
//!
//! Negative and neutral only win with a strict majority over both other
//! weights. Every tie, including all-zero scores for empty text, is positive.

use crate::models::{SentimentLabel, SentimentScores};
use once_cell::sync::Lazy;
use std::sync::Arc;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Something that can score text polarity
pub trait PolarityScorer: Send + Sync {
    fn scores(&self, text: &str) -> SentimentScores;
}

/// Shared handle to a scorer
pub type DynPolarityScorer = Arc<dyn PolarityScorer>;

static VADER: Lazy<SentimentIntensityAnalyzer<'static>> =
    Lazy::new(SentimentIntensityAnalyzer::new);

/// Lexicon-based scorer backed by VADER
#[derive(Debug, Clone, Copy, Default)]
pub struct VaderScorer;

impl VaderScorer {
    pub fn new() -> Self {
        Self
    }

    /// Create a shared scorer for use with dependency injection
    pub fn boxed() -> DynPolarityScorer {
        Arc::new(Self)
    }
}

impl PolarityScorer for VaderScorer {
    fn scores(&self, text: &str) -> SentimentScores {
        if text.trim().is_empty() {
            return SentimentScores::default();
        }

        let raw = VADER.polarity_scores(text);
        let get = |key: &str| {
            raw.get(key)
                .copied()
                .filter(|v| v.is_finite())
                .unwrap_or(0.0)
        };

        SentimentScores {
            pos: get("pos"),
            neg: get("neg"),
            neu: get("neu"),
            compound: get("compound"),
        }
    }
}

/// Reduce raw weights to a label.
pub fn classify(scores: &SentimentScores) -> SentimentLabel {
    let SentimentScores { pos, neg, neu, .. } = *scores;

    if neg > pos && neg > neu {
        SentimentLabel::Negative
    } else if neu > neg && neu > pos {
        SentimentLabel::Neutral
    } else {
        SentimentLabel::Positive
    }
}

/// Score and classify `text`, logging the raw weights
pub fn analyze(scorer: &dyn PolarityScorer, text: &str) -> SentimentLabel {
    let scores = scorer.scores(text);
    let label = classify(&scores);
    tracing::debug!(
        pos = scores.pos,
        neg = scores.neg,
        neu = scores.neu,
        compound = scores.compound,
        %label,
        "Scored text"
    );
    label
}
