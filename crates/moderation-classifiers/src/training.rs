//! Offline training pipeline
//!
//! Dataset assembly → normalization → vectorizer fit on the full corpus →
//! seeded stratified split → classifier fit → holdout evaluation. Accuracy is
//! a diagnostic only: training always yields a model.

use crate::artifacts::ModelArtifacts;
use crate::dataset::{DatasetSpec, LabeledCorpus, LABEL_BENIGN, LABEL_FLAG};
use crate::features::{assemble, FeatureVector};
use crate::logistic::{LogisticRegression, LogisticRegressionConfig};
use crate::normalizer::TextNormalizer;
use crate::vectorizer::{TfidfVectorizer, VectorizerConfig};
use moderation_core::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Seed of the train/test split
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Fraction of each class held out for evaluation
    #[serde(default = "default_test_size")]
    pub test_size: f64,

    #[serde(default)]
    pub vectorizer: VectorizerConfig,

    #[serde(default)]
    pub classifier: LogisticRegressionConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            test_size: default_test_size(),
            vectorizer: VectorizerConfig::default(),
            classifier: LogisticRegressionConfig::default(),
        }
    }
}

fn default_seed() -> u64 {
    42
}

fn default_test_size() -> f64 {
    0.25
}

/// Holdout evaluation of a fitted classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    /// Compare predicted flags against labels
    pub fn from_predictions(predicted: &[bool], labels: &[u8]) -> Self {
        let mut metrics = Self::default();
        for (&flagged, &label) in predicted.iter().zip(labels) {
            match (flagged, label == LABEL_FLAG) {
                (true, true) => metrics.true_positives += 1,
                (true, false) => metrics.false_positives += 1,
                (false, false) => metrics.true_negatives += 1,
                (false, true) => metrics.false_negatives += 1,
            }
        }

        let total = predicted.len().min(labels.len());
        metrics.accuracy = ratio(metrics.true_positives + metrics.true_negatives, total);
        metrics.precision = ratio(
            metrics.true_positives,
            metrics.true_positives + metrics.false_positives,
        );
        metrics.recall = ratio(
            metrics.true_positives,
            metrics.true_positives + metrics.false_negatives,
        );
        metrics.f1 = if metrics.precision + metrics.recall > 0.0 {
            2.0 * metrics.precision * metrics.recall / (metrics.precision + metrics.recall)
        } else {
            0.0
        };

        metrics
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Summary of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub positives: usize,
    pub negatives: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub vocabulary_size: usize,
    pub lexicon_size: usize,
    pub iterations: usize,
    pub metrics: EvaluationMetrics,
}

/// Artifacts plus the diagnostics of the run that produced them
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifacts: ModelArtifacts,
    pub report: TrainingReport,
}

/// Row indices of a train/test partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Seeded stratified split.
///
/// Each class is shuffled independently and `ceil(n_class * test_size)` of
/// its rows are held out, so both partitions keep the class proportions.
pub fn stratified_split(labels: &[u8], test_size: f64, seed: u64) -> Result<Split> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::config(format!(
            "test_size must lie in (0, 1), got {}",
            test_size
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut split = Split {
        train: Vec::new(),
        test: Vec::new(),
    };

    for class in [LABEL_BENIGN, LABEL_FLAG] {
        let mut rows: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == class)
            .map(|(row, _)| row)
            .collect();

        if rows.len() < 2 {
            return Err(Error::dataset(format!(
                "class {} needs at least 2 samples to be split, found {}",
                class,
                rows.len()
            )));
        }

        rows.shuffle(&mut rng);
        let n_test = ((rows.len() as f64 * test_size).ceil() as usize).min(rows.len() - 1);
        split.test.extend_from_slice(&rows[..n_test]);
        split.train.extend_from_slice(&rows[n_test..]);
    }

    split.train.sort_unstable();
    split.test.sort_unstable();
    Ok(split)
}

/// Train on a dataset definition
pub fn train(
    spec: &DatasetSpec,
    normalizer: &TextNormalizer,
    config: &TrainingConfig,
) -> Result<TrainingOutcome> {
    let corpus = spec.corpus();
    info!(
        "Assembled corpus: {} samples ({} flagged, {} benign)",
        corpus.len(),
        corpus.count(LABEL_FLAG),
        corpus.count(LABEL_BENIGN)
    );

    train_on_corpus(&corpus, spec, normalizer, config)
}

fn train_on_corpus(
    corpus: &LabeledCorpus,
    spec: &DatasetSpec,
    normalizer: &TextNormalizer,
    config: &TrainingConfig,
) -> Result<TrainingOutcome> {
    let lexicon = spec.lexicon();
    info!("Lexicon holds {} terms", lexicon.len());

    let normalized: Vec<String> = corpus
        .texts
        .iter()
        .map(|text| normalizer.normalize(text))
        .collect();

    let vectorizer = TfidfVectorizer::fit(&normalized, &config.vectorizer)?;
    info!("Vectorizer vocabulary: {} terms", vectorizer.vocabulary_len());

    let features: Vec<FeatureVector> = normalized
        .iter()
        .map(|text| assemble(text, &vectorizer, &lexicon))
        .collect();

    let split = stratified_split(&corpus.labels, config.test_size, config.seed)?;
    let (train_x, train_y) = select(&features, &corpus.labels, &split.train);
    let (test_x, test_y) = select(&features, &corpus.labels, &split.test);

    let classifier = LogisticRegression::fit(&train_x, &train_y, &config.classifier)?;

    let predicted = test_x
        .iter()
        .map(|x| classifier.predict(x).map(|p| p.flagged))
        .collect::<Result<Vec<bool>>>()?;
    let metrics = EvaluationMetrics::from_predictions(&predicted, &test_y);
    info!(
        "Holdout accuracy {:.2}% (precision {:.3}, recall {:.3}, f1 {:.3})",
        metrics.accuracy * 100.0,
        metrics.precision,
        metrics.recall,
        metrics.f1
    );

    let report = TrainingReport {
        positives: corpus.count(LABEL_FLAG),
        negatives: corpus.count(LABEL_BENIGN),
        train_size: split.train.len(),
        test_size: split.test.len(),
        vocabulary_size: vectorizer.vocabulary_len(),
        lexicon_size: lexicon.len(),
        iterations: classifier.iterations(),
        metrics,
    };

    Ok(TrainingOutcome {
        artifacts: ModelArtifacts::new(vectorizer, classifier, lexicon)?,
        report,
    })
}

fn select(features: &[FeatureVector], labels: &[u8], rows: &[usize]) -> (Vec<FeatureVector>, Vec<u8>) {
    rows.iter()
        .map(|&row| (features[row].clone(), labels[row]))
        .unzip()
}
