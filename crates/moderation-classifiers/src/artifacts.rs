//! Persistence of trained artifacts
//!
//! Training writes three independent bincode blobs into one directory:
//! the fitted classifier, the fitted vectorizer and the lexicon. Serving
//! reads them back exactly once at startup.

use crate::lexicon::Lexicon;
use crate::logistic::LogisticRegression;
use crate::vectorizer::TfidfVectorizer;
use moderation_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default artifact directory, relative to the working directory
pub const DEFAULT_MODEL_DIR: &str = "model_moderation";

/// Classifier blob file name
pub const CLASSIFIER_FILE: &str = "classifier.bin";

/// Vectorizer blob file name
pub const VECTORIZER_FILE: &str = "vectorizer.bin";

/// Lexicon blob file name
pub const LEXICON_FILE: &str = "lexicon.bin";

/// Matching set of trained artifacts
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifacts {
    pub vectorizer: TfidfVectorizer,
    pub classifier: LogisticRegression,
    pub lexicon: Lexicon,
}

impl ModelArtifacts {
    /// Bundle artifacts, rejecting a classifier fitted for another vocabulary
    pub fn new(
        vectorizer: TfidfVectorizer,
        classifier: LogisticRegression,
        lexicon: Lexicon,
    ) -> Result<Self> {
        let artifacts = Self {
            vectorizer,
            classifier,
            lexicon,
        };
        artifacts.validate()?;
        Ok(artifacts)
    }

    /// Feature dimension shared by the vectorizer and the classifier
    pub fn feature_dimension(&self) -> usize {
        self.vectorizer.vocabulary_len() + 1
    }

    fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.classifier
            .validate()
            .map_err(|e| Error::artifact(format!("invalid classifier: {}", e)))?;

        if self.classifier.dimension() != self.feature_dimension() {
            return Err(Error::artifact(format!(
                "classifier expects {} features but the vectorizer produces {} (+1 lexicon slot)",
                self.classifier.dimension(),
                self.vectorizer.vocabulary_len()
            )));
        }
        Ok(())
    }
}

/// Directory holding the persisted artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the artifact directory exists
    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    /// Write all three artifacts, creating the directory and replacing any
    /// previous contents of the blob files
    pub fn save(&self, artifacts: &ModelArtifacts) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        write_blob(&self.dir.join(CLASSIFIER_FILE), &artifacts.classifier)?;
        write_blob(&self.dir.join(VECTORIZER_FILE), &artifacts.vectorizer)?;
        write_blob(&self.dir.join(LEXICON_FILE), &artifacts.lexicon)?;

        info!("Saved model artifacts to {}", self.dir.display());
        Ok(())
    }

    /// Read all three artifacts and check that they belong together
    pub fn load(&self) -> Result<ModelArtifacts> {
        if !self.exists() {
            return Err(Error::artifact(format!(
                "model directory {} not found; run moderation-train first",
                self.dir.display()
            )));
        }

        let classifier: LogisticRegression = read_blob(&self.dir.join(CLASSIFIER_FILE))?;
        let vectorizer: TfidfVectorizer = read_blob(&self.dir.join(VECTORIZER_FILE))?;
        let lexicon: Lexicon = read_blob(&self.dir.join(LEXICON_FILE))?;

        let artifacts = ModelArtifacts::new(vectorizer, classifier, lexicon)?;
        info!(
            "Loaded model artifacts from {} (vocabulary {}, lexicon {})",
            self.dir.display(),
            artifacts.vectorizer.vocabulary_len(),
            artifacts.lexicon.len()
        );

        Ok(artifacts)
    }
}

fn write_blob<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_blob<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .map_err(|e| Error::artifact(format!("cannot open {}: {}", path.display(), e)))?;
    bincode::deserialize_from(BufReader::new(file))
        .map_err(|e| Error::artifact(format!("corrupt artifact {}: {}", path.display(), e)))
}
