//! TF-IDF vectorizer over unigrams and bigrams
//!
//! Terms are extracted from accent-stripped, lowercased text as runs of two
//! or more word characters, then combined into n-grams. Fitting keeps the
//! most frequent terms of the corpus, assigns columns in alphabetical order
//! and computes smoothed inverse document frequencies. Transformed rows are
//! L2-normalized.

use crate::features::FeatureVector;
use moderation_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Vectorizer hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Maximum vocabulary size
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Smallest n-gram length
    #[serde(default = "default_min_n")]
    pub min_n: usize,

    /// Largest n-gram length
    #[serde(default = "default_max_n")]
    pub max_n: usize,

    /// Strip accents through Unicode compatibility decomposition
    #[serde(default = "default_true")]
    pub strip_accents: bool,

    /// Lowercase before tokenizing
    #[serde(default = "default_true")]
    pub lowercase: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            min_n: default_min_n(),
            max_n: default_max_n(),
            strip_accents: true,
            lowercase: true,
        }
    }
}

fn default_max_features() -> usize {
    500
}

fn default_min_n() -> usize {
    1
}

fn default_max_n() -> usize {
    2
}

fn default_true() -> bool {
    true
}

/// Fitted TF-IDF vectorizer with a frozen vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,

    /// Term to column index
    vocabulary: BTreeMap<String, usize>,

    /// Inverse document frequency per column
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit the vocabulary and idf weights on a corpus of normalized documents
    pub fn fit(documents: &[String], config: &VectorizerConfig) -> Result<Self> {
        if documents.is_empty() {
            return Err(Error::classifier("cannot fit vectorizer on an empty corpus"));
        }
        if config.min_n == 0 || config.min_n > config.max_n {
            return Err(Error::config(format!(
                "invalid n-gram range ({}, {})",
                config.min_n, config.max_n
            )));
        }

        let mut term_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();

        for document in documents {
            let terms = analyze(document, config);
            let distinct: BTreeSet<&String> = terms.iter().collect();
            for term in distinct {
                *document_frequency.entry(term.clone()).or_default() += 1;
            }
            for term in terms {
                *term_counts.entry(term).or_default() += 1;
            }
        }

        if term_counts.is_empty() {
            return Err(Error::classifier(
                "empty vocabulary; the corpus contains no terms",
            ));
        }

        // Most frequent first, ties alphabetical
        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(config.max_features);

        let selected: BTreeSet<String> = ranked.into_iter().map(|(term, _)| term).collect();
        let n_documents = documents.len() as f64;

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(selected.len());
        for (column, term) in selected.into_iter().enumerate() {
            let df = document_frequency.get(&term).copied().unwrap_or(0) as f64;
            idf.push(((1.0 + n_documents) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, column);
        }

        Ok(Self {
            config: config.clone(),
            vocabulary,
            idf,
        })
    }

    /// Number of vocabulary terms (the TF-IDF part of the feature dimension)
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vocabulary terms with their column indices
    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    /// Fitting configuration
    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Check that every vocabulary column has exactly one idf weight.
    ///
    /// Fitted vectorizers always pass; a deserialized one may not.
    pub fn validate(&self) -> Result<()> {
        if self.idf.len() != self.vocabulary.len() {
            return Err(Error::artifact(format!(
                "vectorizer has {} vocabulary terms but {} idf weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        if let Some((term, column)) = self
            .vocabulary
            .iter()
            .find(|&(_, &column)| column >= self.idf.len())
        {
            return Err(Error::artifact(format!(
                "vocabulary term '{}' maps to column {} outside {} idf weights",
                term,
                column,
                self.idf.len()
            )));
        }
        if self.idf.iter().any(|w| !w.is_finite()) {
            return Err(Error::artifact("vectorizer holds non-finite idf weights"));
        }
        Ok(())
    }

    /// Idf weight of `term`, if it is in the vocabulary
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&column| self.idf[column])
    }

    /// L2-normalized TF-IDF row for a single document.
    ///
    /// Terms outside the vocabulary are ignored.
    pub fn transform(&self, document: &str) -> FeatureVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(document, &self.config) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_default() += 1.0;
            }
        }

        let weighted: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(column, tf)| (column, tf * self.idf[column]))
            .collect();

        let norm = weighted.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        let entries = weighted.into_iter().map(|(column, value)| {
            if norm > 0.0 {
                (column, value / norm)
            } else {
                (column, value)
            }
        });

        FeatureVector::from_entries(self.vocabulary.len(), entries)
    }
}

/// Remove diacritics: compatibility decomposition, combining marks dropped
pub fn strip_accents(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tokens of two or more word characters
fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !is_word_char(c))
        .filter(|token| token.chars().count() >= 2)
        .collect()
}

/// Preprocess, tokenize and expand into the configured n-grams
fn analyze(document: &str, config: &VectorizerConfig) -> Vec<String> {
    let mut text = if config.lowercase {
        document.to_lowercase()
    } else {
        document.to_string()
    };
    if config.strip_accents {
        text = strip_accents(&text);
    }

    let tokens = tokenize(&text);
    let mut terms = Vec::new();
    for n in config.min_n..=config.max_n {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }

    terms
}
