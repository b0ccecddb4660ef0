//! HTTP routes and handlers

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use moderation_core::{Prediction, RawText};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, error};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/check", post(check))
        .route("/metrics", get(metrics))
        .fallback(fallback)
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// Liveness report
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub moderation: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        moderation: "loaded".to_string(),
    })
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

/// Moderation decision returned by `/check`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CheckResponse {
    /// Whether the text should be routed to human review
    pub a_signer: bool,

    /// Probability of the flagged class
    pub proba: f64,
}

impl From<Prediction> for CheckResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            a_signer: prediction.flagged,
            proba: prediction.probability,
        }
    }
}

/// Classify the submitted text.
///
/// The body is read leniently: anything that is not a JSON object carrying a
/// usable `text` or `texte` field is treated as empty text. Every outcome is a
/// 200 with a decision.
async fn check(State(state): State<AppState>, body: Bytes) -> Json<CheckResponse> {
    metrics::counter!("moderation_requests_total").increment(1);

    let text = serde_json::from_slice::<Value>(&body)
        .map(|payload| extract_text(&payload))
        .unwrap_or_default();

    if text.is_blank() {
        debug!("Blank text, skipping classification");
        metrics::counter!("moderation_fast_path_total").increment(1);
        return Json(Prediction::blank().into());
    }

    let start = Instant::now();
    let prediction = match state.classifier.classify(text.as_str()).await {
        Ok(result) => result.prediction,
        Err(e) => {
            error!("Classifier {} failed: {}", state.classifier.name(), e);
            metrics::counter!("moderation_fast_path_total").increment(1);
            return Json(Prediction::blank().into());
        }
    };
    metrics::histogram!("moderation_inference_latency_us")
        .record(start.elapsed().as_micros() as f64);

    if prediction.flagged {
        metrics::counter!("moderation_flagged_total").increment(1);
    }
    debug!(
        "Checked text: flagged={} p={:.4}",
        prediction.flagged, prediction.probability
    );

    Json(prediction.rounded(state.config.probability_decimals).into())
}

/// Pick the request text: `text` unless it is falsy, then `texte`
fn extract_text(payload: &Value) -> RawText {
    let Some(fields) = payload.as_object() else {
        return RawText::default();
    };

    fields
        .get("text")
        .filter(|value| is_truthy(value))
        .or_else(|| fields.get("texte"))
        .map(RawText::from_json)
        .unwrap_or_default()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

async fn fallback(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Error handling
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("no route for {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = json!({
            "error": {
                "message": self.to_string(),
                "type": "not_found",
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_prefers_text() {
        let raw = extract_text(&json!({"text": "il faut tuer", "texte": "autre"}));
        assert_eq!(raw.as_str(), "il faut tuer");
    }

    #[test]
    fn test_extract_text_falls_back_to_texte() {
        for payload in [
            json!({"texte": "bonjour"}),
            json!({"text": "", "texte": "bonjour"}),
            json!({"text": null, "texte": "bonjour"}),
            json!({"text": [], "texte": "bonjour"}),
        ] {
            assert_eq!(extract_text(&payload).as_str(), "bonjour");
        }
    }

    #[test]
    fn test_extract_text_joins_arrays() {
        let raw = extract_text(&json!({"text": ["mort", "aux", "autres"]}));
        assert_eq!(raw.as_str(), "mort aux autres");
    }

    #[test]
    fn test_extract_text_unusable_payloads() {
        assert!(extract_text(&json!("il faut tuer")).is_blank());
        assert!(extract_text(&json!([1, 2])).is_blank());
        assert!(extract_text(&json!({})).is_blank());
        assert!(extract_text(&json!({"text": 42})).is_blank());
        assert!(extract_text(&json!({"text": {"nested": "x"}})).is_blank());
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!(" ")));
        assert!(is_truthy(&json!(1.5)));
    }
}
