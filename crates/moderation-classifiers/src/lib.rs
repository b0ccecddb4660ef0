//! Moderation Classifiers
//!
//! The text classification pipeline behind the moderation service:
//!
//! - Text normalization through a lookup-table lemmatizer
//! - Flagged-term lexicon membership
//! - TF-IDF unigram/bigram vectorization
//! - Balanced logistic regression with a single atomic inference call
//! - Dataset assembly, seeded training and holdout evaluation
//! - Persistence of the three trained artifacts
//!
//! Everything here is synchronous and pure once loaded; a fitted
//! [`ModerationModel`] can be shared across threads behind an `Arc`.

pub mod artifacts;
pub mod classifier;
pub mod dataset;
pub mod features;
pub mod lexicon;
pub mod logistic;
pub mod model;
pub mod normalizer;
pub mod training;
pub mod vectorizer;

pub use artifacts::{ArtifactStore, ModelArtifacts, DEFAULT_MODEL_DIR};
pub use classifier::{ClassificationMetadata, ClassificationResult, Classifier};
pub use dataset::{DatasetSpec, LabeledCorpus};
pub use features::{assemble, FeatureVector};
pub use lexicon::{Lexicon, MAX_LEXICON_TERMS};
pub use logistic::{ClassWeight, LogisticRegression, LogisticRegressionConfig};
pub use model::ModerationModel;
pub use normalizer::{LemmatizerModel, TextNormalizer, Token};
pub use training::{train, EvaluationMetrics, TrainingConfig, TrainingOutcome, TrainingReport};
pub use vectorizer::{TfidfVectorizer, VectorizerConfig};

/// Default lemmatizer model path, relative to the repository root
pub const DEFAULT_LEMMATIZER_PATH: &str = "resources/lemmatizer/fr.yaml";

/// Default dataset definition path, relative to the repository root
pub const DEFAULT_DATASET_PATH: &str = "resources/moderation/dataset.yaml";

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::model::ModerationModel;
    pub use crate::normalizer::TextNormalizer;
    pub use crate::training::{train, TrainingConfig};
}
