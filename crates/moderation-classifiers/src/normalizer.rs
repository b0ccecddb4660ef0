//! Text normalization backed by a lookup-table lemmatizer
//!
//! Raw text is whitespace-collapsed and lowercased, segmented into tokens,
//! and reduced to the lemmas of its alphabetic, non-stopword tokens. The
//! lemmatizer model is data: a YAML file holding the stopword list, a
//! form-to-lemma lookup table and ordered suffix rules used when the lookup
//! misses.

use moderation_core::{Error, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;
use unicode_normalization::UnicodeNormalization;

/// On-disk layout of a lemmatizer model
#[derive(Debug, Clone, Deserialize)]
struct LemmatizerFile {
    language: String,

    #[serde(default)]
    stop_words: Vec<String>,

    #[serde(default)]
    lemmas: HashMap<String, String>,

    #[serde(default)]
    suffix_rules: Vec<SuffixRule>,
}

/// Rewrites a word ending when the lookup table has no entry for it
#[derive(Debug, Clone, Deserialize)]
pub struct SuffixRule {
    /// Ending to match
    pub suffix: String,

    /// Replacement for the matched ending
    #[serde(default)]
    pub replacement: String,

    /// Minimum word length in characters for the rule to apply
    #[serde(default)]
    pub min_length: usize,
}

impl SuffixRule {
    fn apply(&self, word: &str) -> Option<String> {
        if word.chars().count() < self.min_length {
            return None;
        }
        word.strip_suffix(self.suffix.as_str())
            .filter(|stem| !stem.is_empty())
            .map(|stem| format!("{}{}", stem, self.replacement))
    }
}

/// A segmented token with its linguistic annotations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface form
    pub text: String,

    /// Dictionary form
    pub lemma: String,

    /// Whether the surface form is a stopword
    pub is_stop: bool,

    /// Whether every character is alphabetic
    pub is_alpha: bool,
}

/// Pretrained lemmatizer for the primary corpus language
#[derive(Debug, Clone)]
pub struct LemmatizerModel {
    language: String,
    stop_words: HashSet<String>,
    lemmas: HashMap<String, String>,
    suffix_rules: Vec<SuffixRule>,
}

impl LemmatizerModel {
    /// Load a lemmatizer model from a YAML file.
    ///
    /// A missing or unreadable file is fatal for both training and serving.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::lemmatizer(format!(
                "failed to read lemmatizer model {}: {}",
                path.display(),
                e
            ))
        })?;

        let model = Self::from_yaml_str(&content)?;
        info!(
            "Loaded '{}' lemmatizer from {} ({} stop words, {} lemmas, {} suffix rules)",
            model.language,
            path.display(),
            model.stop_words.len(),
            model.lemmas.len(),
            model.suffix_rules.len()
        );

        Ok(model)
    }

    /// Parse a lemmatizer model from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: LemmatizerFile = serde_yaml::from_str(content)
            .map_err(|e| Error::lemmatizer(format!("corrupt lemmatizer model: {}", e)))?;

        if file.stop_words.is_empty() && file.lemmas.is_empty() {
            return Err(Error::lemmatizer(format!(
                "lemmatizer model '{}' has neither stop words nor lemmas",
                file.language
            )));
        }

        Ok(Self {
            language: file.language,
            stop_words: file.stop_words.iter().map(|w| w.to_lowercase()).collect(),
            lemmas: file
                .lemmas
                .into_iter()
                .map(|(form, lemma)| (form.to_lowercase(), lemma.to_lowercase()))
                .collect(),
            suffix_rules: file.suffix_rules,
        })
    }

    /// Language code of the model
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether `word` is a stopword
    pub fn is_stop(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Dictionary form of `word`: lookup table first, then the first matching
    /// suffix rule, otherwise the word itself
    pub fn lemma(&self, word: &str) -> String {
        if let Some(lemma) = self.lemmas.get(word) {
            return lemma.clone();
        }

        self.suffix_rules
            .iter()
            .find_map(|rule| rule.apply(word))
            .unwrap_or_else(|| word.to_string())
    }

    /// Segment `text` into annotated tokens
    pub fn analyze(&self, text: &str) -> Vec<Token> {
        segment(text)
            .into_iter()
            .map(|surface| {
                let is_alpha = surface.chars().all(char::is_alphabetic);
                let lemma = if is_alpha {
                    self.lemma(surface)
                } else {
                    surface.to_string()
                };

                Token {
                    text: surface.to_string(),
                    lemma,
                    is_stop: self.is_stop(surface),
                    is_alpha,
                }
            })
            .collect()
    }
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// Split text into word, elided-word and punctuation tokens.
///
/// A run of alphanumeric characters is a word. An apostrophe directly after a
/// word stays attached to it (`l'`, `qu'`). Any other non-space character is
/// a token on its own.
fn segment(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        if c.is_alphanumeric() {
            start.get_or_insert(i);
            continue;
        }

        if let Some(s) = start.take() {
            if is_apostrophe(c) {
                tokens.push(&text[s..i + c.len_utf8()]);
                continue;
            }
            tokens.push(&text[s..i]);
        }

        if !c.is_whitespace() {
            tokens.push(&text[i..i + c.len_utf8()]);
        }
    }

    if let Some(s) = start {
        tokens.push(&text[s..]);
    }

    tokens
}

/// Trim, collapse whitespace runs into single spaces and lowercase
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Turns raw text into the lemma sequence fed to the vectorizer
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    model: LemmatizerModel,
}

impl TextNormalizer {
    /// Create a normalizer around a loaded lemmatizer model
    pub fn new(model: LemmatizerModel) -> Self {
        Self { model }
    }

    /// Load the lemmatizer model and build a normalizer
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(LemmatizerModel::from_file(path)?))
    }

    /// The underlying lemmatizer model
    pub fn model(&self) -> &LemmatizerModel {
        &self.model
    }

    /// Normalize text into space-joined lemmas.
    ///
    /// Tokens are segmented from the NFC composition of the collapsed text, so
    /// decomposed accents still hit the lookup table. Falls back to the
    /// collapsed lowercase text, as is, when no alphabetic non-stopword token
    /// survives, so flagged terms the lemmatizer does not know still reach the
    /// lexicon matcher.
    pub fn normalize(&self, text: &str) -> String {
        let collapsed = collapse_whitespace(text);
        if collapsed.is_empty() {
            return collapsed;
        }

        let composed: String = collapsed.nfc().collect();
        let lemmas: Vec<String> = self
            .model
            .analyze(&composed)
            .into_iter()
            .filter(|token| token.is_alpha && !token.is_stop)
            .map(|token| token.lemma)
            .collect();

        if lemmas.is_empty() {
            collapsed
        } else {
            lemmas.join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"
language: fr
stop_words: [il, le, la, l', des, d, une, aux, autres, est, on, qu, à]
lemmas:
  faut: falloir
  tue: tuer
  écoles: école
suffix_rules:
  - suffix: aux
    replacement: al
    min_length: 5
  - suffix: s
    min_length: 4
"#;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(LemmatizerModel::from_yaml_str(MODEL).unwrap())
    }

    #[test]
    fn test_segment_handles_elision_and_punctuation() {
        assert_eq!(segment("l'eau, potable!"), vec!["l'", "eau", ",", "potable", "!"]);
        assert_eq!(segment("qu\u{2019}on"), vec!["qu\u{2019}", "on"]);
        assert_eq!(segment("  a   b "), vec!["a", "b"]);
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_tokens_are_annotated() {
        let model = LemmatizerModel::from_yaml_str(MODEL).unwrap();
        let tokens = model.analyze("il faut 2 hôpitaux");

        assert_eq!(tokens.len(), 4);
        assert!(tokens[0].is_stop);
        assert_eq!(tokens[1].lemma, "falloir");
        assert!(!tokens[2].is_alpha);
        assert_eq!(tokens[3].lemma, "hôpital");
    }

    #[test]
    fn test_normalize_keeps_alpha_non_stop_lemmas() {
        let normalizer = normalizer();
        assert_eq!(normalizer.normalize("  Il   FAUT tuer "), "falloir tuer");
        assert_eq!(normalizer.normalize("qu on les tue"), "les tuer");
        assert_eq!(normalizer.normalize("construire des écoles"), "construire école");
    }

    #[test]
    fn test_normalize_falls_back_to_collapsed_text() {
        let normalizer = normalizer();
        assert_eq!(normalizer.normalize("Il  est  2024"), "il est 2024");
        assert_eq!(normalizer.normalize("   "), "");
        assert_eq!(normalizer.normalize(""), "");
    }

    #[test]
    fn test_normalize_drops_stopwords_around_unknown_words() {
        let normalizer = normalizer();
        assert_eq!(normalizer.normalize("mort aux autres"), "mort");
    }

    #[test]
    fn test_composition_only_applies_to_lemmas() {
        let normalizer = normalizer();

        // Decomposed accents still reach the lookup table
        assert_eq!(normalizer.normalize("E\u{301}coles"), "école");

        // The fallback keeps the collapsed text byte for byte
        assert_eq!(normalizer.normalize("A\u{300}  LA"), "a\u{300} la");
    }

    #[test]
    fn test_corrupt_model_is_rejected() {
        assert!(LemmatizerModel::from_yaml_str("language: [").is_err());
        assert!(LemmatizerModel::from_yaml_str("language: fr").is_err());
        assert!(matches!(
            LemmatizerModel::from_file("/nonexistent/fr.yaml"),
            Err(Error::Lemmatizer(_))
        ));
    }
}
