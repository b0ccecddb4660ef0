//! Curated training data: lexicon terms and labeled phrases
//!
//! The dataset is an external YAML resource so the rule set can be revised
//! and versioned without touching the classifier code.

use crate::lexicon::Lexicon;
use moderation_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use unicode_normalization::UnicodeNormalization;

/// Label of texts that should go to human review
pub const LABEL_FLAG: u8 = 1;

/// Label of benign texts
pub const LABEL_BENIGN: u8 = 0;

/// Full dataset definition: lexicon terms and labeled phrases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Dataset version, reported in training logs
    #[serde(default)]
    pub version: Option<String>,

    /// Flagged terms per language, in priority order
    pub lexicon: Vec<LanguageTerms>,

    pub positives: PositiveSpec,

    pub negatives: NegativeSpec,
}

/// Flagged terms of one language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageTerms {
    pub language: String,
    pub terms: Vec<String>,
}

/// Phrases to flag and how they are oversampled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositiveSpec {
    /// Below this count the corpus is backfilled
    #[serde(default = "default_min_count")]
    pub min_count: usize,

    /// Size reached by backfilling
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Languages whose repeated phrases are used for backfilling
    #[serde(default)]
    pub backfill: Vec<String>,

    pub languages: Vec<LanguagePhrases>,
}

/// Phrases of one language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguagePhrases {
    pub language: String,

    /// How many times the phrase list is repeated
    #[serde(default = "default_repeat")]
    pub repeat: usize,

    /// How many entries of the repeated list are kept
    #[serde(default = "default_take")]
    pub take: usize,

    pub phrases: Vec<String>,
}

impl LanguagePhrases {
    fn repeated(&self) -> impl Iterator<Item = &String> {
        std::iter::repeat(self.phrases.iter())
            .take(self.repeat)
            .flatten()
    }
}

/// Benign civic and governance phrases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegativeSpec {
    /// Extra negatives allowed above the positive count after replication
    #[serde(default = "default_headroom")]
    pub headroom: usize,

    pub phrases: Vec<String>,
}

fn default_min_count() -> usize {
    300
}

fn default_target_count() -> usize {
    350
}

fn default_repeat() -> usize {
    1
}

fn default_take() -> usize {
    70
}

fn default_headroom() -> usize {
    50
}

/// Labeled texts ready for normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledCorpus {
    pub texts: Vec<String>,
    pub labels: Vec<u8>,
}

impl LabeledCorpus {
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Number of samples carrying `label`
    pub fn count(&self, label: u8) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }
}

impl DatasetSpec {
    /// Load a dataset definition from YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::dataset(format!("failed to read dataset {}: {}", path.display(), e))
        })?;
        let spec = Self::from_yaml_str(&content)?;

        info!(
            "Loaded dataset {} (version {})",
            path.display(),
            spec.version.as_deref().unwrap_or("unversioned")
        );
        Ok(spec)
    }

    /// Parse and validate a dataset definition
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let spec: Self = serde_yaml::from_str(content)?;
        spec.validate()?;
        Ok(spec)
    }

    fn validate(&self) -> Result<()> {
        if self.positives.languages.iter().all(|l| l.phrases.is_empty()) {
            return Err(Error::dataset("no positive phrases"));
        }
        if self.negatives.phrases.is_empty() {
            return Err(Error::dataset("no negative phrases"));
        }
        for language in &self.positives.backfill {
            if !self.positives.languages.iter().any(|l| &l.language == language) {
                return Err(Error::dataset(format!(
                    "backfill language '{}' has no phrases",
                    language
                )));
            }
        }
        Ok(())
    }

    /// Lexicon built from all language term lists, in declaration order.
    ///
    /// Terms are lowercased and NFC-composed to match normalized text.
    pub fn lexicon(&self) -> Lexicon {
        Lexicon::build(
            self.lexicon
                .iter()
                .flat_map(|language| language.terms.iter())
                .map(|term| term.nfc().collect::<String>().to_lowercase()),
        )
    }

    /// Phrases to flag.
    ///
    /// Each language contributes the first `take` entries of its list
    /// repeated `repeat` times; the union is de-duplicated in order. A
    /// corpus below `min_count` is then topped up to `target_count` from the
    /// repeated lists of the backfill languages.
    pub fn positive_phrases(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut phrases: Vec<String> = self
            .positives
            .languages
            .iter()
            .flat_map(|language| language.repeated().take(language.take))
            .filter(|phrase| seen.insert(phrase.as_str()))
            .cloned()
            .collect();

        if phrases.len() < self.positives.min_count {
            let missing = self.positives.target_count.saturating_sub(phrases.len());
            let backfill: Vec<String> = self
                .positives
                .backfill
                .iter()
                .filter_map(|code| {
                    self.positives
                        .languages
                        .iter()
                        .find(|language| &language.language == code)
                })
                .flat_map(|language| language.repeated())
                .take(missing)
                .cloned()
                .collect();
            phrases.extend(backfill);
        }

        phrases
    }

    /// Benign phrases, de-duplicated and replicated so they are never
    /// outnumbered by `positive_count`
    pub fn negative_phrases(&self, positive_count: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = self
            .negatives
            .phrases
            .iter()
            .filter(|phrase| seen.insert(phrase.as_str()))
            .cloned()
            .collect();

        if unique.is_empty() || unique.len() >= positive_count {
            return unique;
        }

        let copies = positive_count / unique.len() + 1;
        std::iter::repeat(unique.iter())
            .take(copies)
            .flatten()
            .take(positive_count + self.negatives.headroom)
            .cloned()
            .collect()
    }

    /// Positives labeled [`LABEL_FLAG`] followed by negatives labeled
    /// [`LABEL_BENIGN`]
    pub fn corpus(&self) -> LabeledCorpus {
        let positives = self.positive_phrases();
        let negatives = self.negative_phrases(positives.len());

        let labels = std::iter::repeat(LABEL_FLAG)
            .take(positives.len())
            .chain(std::iter::repeat(LABEL_BENIGN).take(negatives.len()))
            .collect();
        let texts = positives.into_iter().chain(negatives).collect();

        LabeledCorpus { texts, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"
version: "test"
lexicon:
  - language: fr
    terms: [fou, tuer, fou]
  - language: ln
    terms: [mbwa, tuer]
positives:
  min_count: 10
  target_count: 12
  backfill: [fr, ln]
  languages:
    - language: fr
      repeat: 2
      take: 3
      phrases: ["il faut tuer", "tu es fou"]
    - language: ln
      repeat: 3
      take: 70
      phrases: ["mbwa", "il faut tuer"]
negatives:
  headroom: 2
  phrases: ["construction d une école", "élections libres", "élections libres"]
"#;

    fn spec() -> DatasetSpec {
        DatasetSpec::from_yaml_str(SPEC).unwrap()
    }

    #[test]
    fn test_lexicon_concatenates_languages() {
        assert_eq!(spec().lexicon().terms(), &["fou", "tuer", "mbwa"]);
    }

    #[test]
    fn test_positive_phrases_dedupe_then_backfill() {
        let phrases = spec().positive_phrases();

        // 3 unique phrases, topped up with 9 from the repeated French then Lingala lists
        assert_eq!(phrases.len(), 12);
        assert_eq!(&phrases[..3], &["il faut tuer", "tu es fou", "mbwa"]);
        assert_eq!(&phrases[3..5], &["il faut tuer", "tu es fou"]);
    }

    #[test]
    fn test_negatives_never_outnumbered() {
        let spec = spec();
        let negatives = spec.negative_phrases(12);

        // 2 unique phrases x 7 copies, capped at 12 + 2
        assert_eq!(negatives.len(), 14);
        assert!(negatives.len() >= 12);
        assert_eq!(spec.negative_phrases(1).len(), 2);
    }

    #[test]
    fn test_corpus_labels() {
        let corpus = spec().corpus();
        assert_eq!(corpus.len(), corpus.labels.len());
        assert_eq!(corpus.count(LABEL_FLAG), 12);
        assert_eq!(corpus.count(LABEL_BENIGN), 14);
        assert_eq!(corpus.labels[0], LABEL_FLAG);
        assert_eq!(corpus.labels[corpus.len() - 1], LABEL_BENIGN);
    }

    #[test]
    fn test_invalid_specs_are_rejected() {
        let no_negatives = SPEC.replace(
            r#"phrases: ["construction d une école", "élections libres", "élections libres"]"#,
            "phrases: []",
        );
        assert!(DatasetSpec::from_yaml_str(&no_negatives).is_err());

        let bad_backfill = SPEC.replace("backfill: [fr, ln]", "backfill: [sw]");
        assert!(DatasetSpec::from_yaml_str(&bad_backfill).is_err());
    }
}
