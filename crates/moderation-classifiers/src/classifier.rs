//! Classifier trait and common types

use async_trait::async_trait;
use moderation_core::{Prediction, Result};

/// Trait for all moderation classifiers
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the given raw text
    async fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Result of classification
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Flag decision and probability, produced together
    pub prediction: Prediction,

    /// Additional metadata
    pub metadata: ClassificationMetadata,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(prediction: Prediction) -> Self {
        Self {
            prediction,
            metadata: ClassificationMetadata::default(),
            latency_us: 0,
        }
    }

    /// Whether the text should be flagged for review
    pub fn flagged(&self) -> bool {
        self.prediction.flagged
    }

    /// Probability of the flagged class
    pub fn probability(&self) -> f64 {
        self.prediction.probability
    }
}

/// Metadata about classification
#[derive(Debug, Clone, Default)]
pub struct ClassificationMetadata {
    /// Model name or version
    pub model: Option<String>,

    /// Normalized text the features were computed from
    pub normalized: Option<String>,

    /// Whether a lexicon term was present
    pub lexicon_hit: bool,

    /// Dimension of the assembled feature vector
    pub feature_dimension: usize,
}
