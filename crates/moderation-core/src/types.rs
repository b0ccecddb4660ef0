//! Core types for the moderation pipeline

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text submitted for moderation, before any normalization.
///
/// Request payloads carry either a string or an array of strings; arrays are
/// joined with single spaces. Anything else is treated as empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawText(String);

impl RawText {
    /// Create raw text from a string
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Build raw text from a JSON payload value.
    ///
    /// Strings are taken as-is. Arrays are joined with spaces: string items
    /// verbatim, numbers and booleans by their JSON rendering, while nulls and
    /// nested containers are skipped. Every other value yields empty text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Self(s.clone()),
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        Value::Bool(b) => Some(b.to_string()),
                        _ => None,
                    })
                    .collect();
                Self(parts.join(" "))
            }
            _ => Self::default(),
        }
    }

    /// Borrow the underlying text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the text is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for RawText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for RawText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

/// Outcome of a single moderation decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Whether the text should go to human review
    pub flagged: bool,

    /// Estimated probability of the flagged class (0.0-1.0)
    pub probability: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(flagged: bool, probability: f64) -> Self {
        Self {
            flagged,
            probability,
        }
    }

    /// Answer for blank input, produced without consulting the classifier
    pub fn blank() -> Self {
        Self::new(false, 0.0)
    }

    /// Copy of this prediction with the probability rounded to `decimals` digits
    pub fn rounded(&self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        Self {
            flagged: self.flagged,
            probability: (self.probability * factor).round() / factor,
        }
    }
}
