//! Flagged-term lexicon and membership test

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Upper bound on the number of lexicon terms
pub const MAX_LEXICON_TERMS: usize = 50;

/// Ordered, de-duplicated set of flagged terms.
///
/// Built once at training time, persisted as an artifact and read-only
/// afterwards. Deserialized lexicons go through the same de-duplication and
/// cap as freshly built ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Lexicon {
    terms: Vec<String>,
    index: HashSet<String>,
}

impl Lexicon {
    /// Build a lexicon from terms in priority order.
    ///
    /// Duplicates keep their first position and only the first
    /// [`MAX_LEXICON_TERMS`] distinct terms are retained.
    pub fn build<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered = Vec::new();
        let mut index = HashSet::new();

        for term in terms {
            if ordered.len() == MAX_LEXICON_TERMS {
                break;
            }
            let term = term.into();
            if index.insert(term.clone()) {
                ordered.push(term);
            }
        }

        Self {
            terms: ordered,
            index,
        }
    }

    /// Terms in first-seen order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// True iff any whitespace-separated token of `normalized` is a lexicon term
    pub fn contains_flagged(&self, normalized: &str) -> bool {
        normalized
            .split_whitespace()
            .any(|token| self.index.contains(token))
    }

    /// Lexicon-membership feature value: 1.0 on a hit, 0.0 otherwise
    pub fn membership(&self, normalized: &str) -> f64 {
        if self.contains_flagged(normalized) {
            1.0
        } else {
            0.0
        }
    }
}

impl From<Vec<String>> for Lexicon {
    fn from(terms: Vec<String>) -> Self {
        Self::build(terms)
    }
}

impl From<Lexicon> for Vec<String> {
    fn from(lexicon: Lexicon) -> Self {
        lexicon.terms
    }
}

impl PartialEq for Lexicon {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_build_dedupes_in_order() {
        let lexicon = Lexicon::build(["fou", "mbwa", "fou", "ndoki", "mbwa"]);
        assert_eq!(lexicon.terms(), &["fou", "mbwa", "ndoki"]);
    }

    #[test]
    fn test_build_caps_terms() {
        let lexicon = Lexicon::build((0..80).map(|i| format!("t{}", i % 70)));
        assert_eq!(lexicon.len(), MAX_LEXICON_TERMS);
        assert_eq!(lexicon.terms()[49], "t49");
        assert!(!lexicon.contains_flagged("t55"));
    }

    #[test]
    fn test_membership() {
        let lexicon = Lexicon::build(["tuer", "haine"]);
        assert_eq!(lexicon.membership("falloir tuer"), 1.0);
        assert_eq!(lexicon.membership("tuerie gratuite"), 0.0);
        assert_eq!(lexicon.membership(""), 0.0);
        assert_eq!(lexicon.membership("   "), 0.0);
    }

    #[test]
    fn test_bincode_round_trip_keeps_index() {
        let lexicon = Lexicon::build(["kuua", "adui"]);
        let bytes = bincode::serialize(&lexicon).unwrap();
        let restored: Lexicon = bincode::deserialize(&bytes).unwrap();

        assert_eq!(restored, lexicon);
        assert!(restored.contains_flagged("kuua watu"));
    }

    proptest! {
        #[test]
        fn prop_membership_is_monotone_under_superset(
            base in proptest::collection::vec("[a-e]{1,3}", 0..6),
            extra in proptest::collection::vec("[a-e]{1,3}", 0..6),
        ) {
            let lexicon = Lexicon::build(["ab", "cde", "e"]);
            let a = base.join(" ");
            let b = base.iter().chain(extra.iter()).cloned().collect::<Vec<_>>().join(" ");

            if lexicon.contains_flagged(&a) {
                prop_assert!(lexicon.contains_flagged(&b));
            }
        }
    }
}
