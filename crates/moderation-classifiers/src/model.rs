//! End-to-end moderation model: normalizer, features and classifier

use crate::artifacts::{ArtifactStore, ModelArtifacts};
use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier};
use crate::features::{assemble, FeatureVector};
use crate::lexicon::Lexicon;
use crate::logistic::LogisticRegression;
use crate::normalizer::TextNormalizer;
use crate::vectorizer::TfidfVectorizer;
use async_trait::async_trait;
use moderation_core::{Prediction, Result};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Frozen inference pipeline shared by every request of a serving process
#[derive(Debug, Clone)]
pub struct ModerationModel {
    name: String,
    normalizer: TextNormalizer,
    artifacts: ModelArtifacts,
}

impl ModerationModel {
    /// Assemble a model from a normalizer and a matching artifact set
    pub fn new(normalizer: TextNormalizer, artifacts: ModelArtifacts) -> Self {
        Self {
            name: "moderation".to_string(),
            normalizer,
            artifacts,
        }
    }

    /// Load the lemmatizer and the persisted artifacts
    pub fn load(model_dir: impl AsRef<Path>, lemmatizer: impl AsRef<Path>) -> Result<Self> {
        let normalizer = TextNormalizer::from_file(lemmatizer)?;
        let artifacts = ArtifactStore::new(model_dir.as_ref()).load()?;
        Ok(Self::new(normalizer, artifacts))
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.artifacts.vectorizer
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.artifacts.lexicon
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.artifacts.classifier
    }

    /// Vocabulary size + 1
    pub fn feature_dimension(&self) -> usize {
        self.artifacts.feature_dimension()
    }

    /// Feature vector of already-normalized text
    pub fn features(&self, normalized: &str) -> FeatureVector {
        assemble(normalized, self.vectorizer(), self.lexicon())
    }

    /// Normalize, assemble and classify.
    ///
    /// Blank text never reaches the vectorizer and yields a non-flagged,
    /// zero-probability answer.
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        Ok(self.analyze(text)?.prediction)
    }

    fn analyze(&self, text: &str) -> Result<ClassificationResult> {
        if text.trim().is_empty() {
            return Ok(ClassificationResult::new(Prediction::blank()));
        }

        let normalized = self.normalizer.normalize(text);
        let features = self.features(&normalized);
        let prediction = self.classifier().predict(&features)?;
        debug!(
            "Classified '{}' -> flagged={} p={:.4}",
            normalized, prediction.flagged, prediction.probability
        );

        Ok(ClassificationResult {
            prediction,
            metadata: ClassificationMetadata {
                model: Some(self.name.clone()),
                lexicon_hit: self.lexicon().contains_flagged(&normalized),
                feature_dimension: features.dimension(),
                normalized: Some(normalized),
            },
            latency_us: 0,
        })
    }
}

#[async_trait]
impl Classifier for ModerationModel {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();
        let mut result = self.analyze(text)?;
        result.latency_us = start.elapsed().as_micros() as u64;
        Ok(result)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
