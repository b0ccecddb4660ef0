//! Sparse feature vectors and assembly of the classifier input

use crate::lexicon::Lexicon;
use crate::vectorizer::TfidfVectorizer;

/// Sparse numeric vector with a fixed dimension.
///
/// Entries are `(column, value)` pairs sorted by column; zero values are not
/// stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dimension: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Build a vector from `(column, value)` pairs.
    ///
    /// Pairs are sorted by column, zeros are dropped and columns outside
    /// `dimension` are ignored.
    pub fn from_entries(dimension: usize, entries: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut entries: Vec<(usize, f64)> = entries
            .into_iter()
            .filter(|&(column, value)| column < dimension && value != 0.0)
            .collect();
        entries.sort_by_key(|&(column, _)| column);

        Self { dimension, entries }
    }

    /// All-zero vector
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Non-zero entries sorted by column
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Value at `column` (0.0 when absent)
    pub fn get(&self, column: usize) -> f64 {
        self.entries
            .binary_search_by_key(&column, |&(c, _)| c)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    /// Dot product with a dense weight vector
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|&(column, value)| weights.get(column).map(|w| w * value))
            .sum()
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }

    /// Extend the vector by one trailing dimension holding `value`
    pub fn append(mut self, value: f64) -> Self {
        if value != 0.0 {
            self.entries.push((self.dimension, value));
        }
        self.dimension += 1;
        self
    }
}

/// Assemble the classifier input for already-normalized text: the TF-IDF row
/// followed by the lexicon-membership indicator in the last slot.
///
/// The dimension is always `vectorizer.vocabulary_len() + 1`.
pub fn assemble(normalized: &str, vectorizer: &TfidfVectorizer, lexicon: &Lexicon) -> FeatureVector {
    vectorizer
        .transform(normalized)
        .append(lexicon.membership(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::VectorizerConfig;

    #[test]
    fn test_from_entries_sorts_and_drops_zeros() {
        let v = FeatureVector::from_entries(4, vec![(2, 0.5), (0, 0.0), (1, 0.25), (7, 1.0)]);
        assert_eq!(v.entries(), &[(1, 0.25), (2, 0.5)]);
        assert_eq!(v.get(2), 0.5);
        assert_eq!(v.get(3), 0.0);
        assert_eq!(v.dot(&[1.0, 2.0, 4.0, 8.0]), 2.5);
    }

    #[test]
    fn test_append_grows_dimension() {
        let v = FeatureVector::zeros(3).append(1.0);
        assert_eq!(v.dimension(), 4);
        assert_eq!(v.get(3), 1.0);

        let w = FeatureVector::zeros(3).append(0.0);
        assert_eq!(w.dimension(), 4);
        assert!(w.entries().is_empty());
    }

    #[test]
    fn test_assemble_dimension_is_stable() {
        let corpus = vec![
            "falloir tuer".to_string(),
            "construction école".to_string(),
            "haine gratuit".to_string(),
        ];
        let vectorizer = TfidfVectorizer::fit(&corpus, &VectorizerConfig::default()).unwrap();
        let lexicon = Lexicon::build(["tuer", "haine"]);
        let expected = vectorizer.vocabulary_len() + 1;

        for text in ["falloir tuer", "inconnu total", "", "haine"] {
            let features = assemble(text, &vectorizer, &lexicon);
            assert_eq!(features.dimension(), expected);
        }

        let hit = assemble("falloir tuer", &vectorizer, &lexicon);
        assert_eq!(hit.get(expected - 1), 1.0);

        let unseen = assemble("inconnu total", &vectorizer, &lexicon);
        assert!(unseen.entries().is_empty());
    }
}
