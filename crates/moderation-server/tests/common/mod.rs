//! Shared helpers for router tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use moderation_classifiers::{ClassificationResult, Classifier};
use moderation_core::{Error, Prediction, Result};
use moderation_server::{create_router, AppState, ServiceConfig};
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// A configurable mock classifier that counts its calls
pub struct MockClassifier {
    name: String,
    prediction: Prediction,
    fail: bool,
    call_count: AtomicU32,
    last_text: std::sync::Mutex<Option<String>>,
}

impl MockClassifier {
    /// Create a mock that answers every text with `prediction`
    pub fn new(prediction: Prediction) -> Self {
        Self {
            name: "mock".to_string(),
            prediction,
            fail: false,
            call_count: AtomicU32::new(0),
            last_text: std::sync::Mutex::new(None),
        }
    }

    /// Make every classify call fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Prediction::new(true, 1.0))
        }
    }

    /// Get the number of times classify was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Text received by the most recent call
    pub fn last_text(&self) -> Option<String> {
        self.last_text.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_text.lock().unwrap() = Some(text.to_string());

        if self.fail {
            return Err(Error::classifier("simulated failure"));
        }
        Ok(ClassificationResult::new(self.prediction))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Router around any classifier, with a detached metrics recorder
pub fn router_with(classifier: Arc<dyn Classifier>) -> Router {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    create_router(AppState::new(ServiceConfig::default(), classifier, handle))
}

/// POST a raw body to `/check`
pub async fn post_check(app: &Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/check")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

/// GET `uri`
pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
