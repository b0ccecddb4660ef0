//! Shared application state

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use moderation_classifiers::{Classifier, ModerationModel};
use std::sync::Arc;
use tracing::info;

use crate::config::ServiceConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServiceConfig>,

    /// Classifier answering `/check`
    pub classifier: Arc<dyn Classifier>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Build state around an already constructed classifier
    pub fn new(
        config: ServiceConfig,
        classifier: Arc<dyn Classifier>,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        Self {
            config: Arc::new(config),
            classifier,
            metrics_handle,
        }
    }

    /// Load the trained model named by the configuration
    pub fn load(config: ServiceConfig, metrics_handle: PrometheusHandle) -> Result<Self> {
        info!("Loading moderation model from: {}", config.model_dir);
        let model = ModerationModel::load(&config.model_dir, &config.lemmatizer)
            .with_context(|| format!("cannot start without a trained model in {}", config.model_dir))?;
        info!(
            "Model loaded: {} vocabulary terms, {} lexicon terms",
            model.vectorizer().vocabulary_len(),
            model.lexicon().len()
        );

        Ok(Self::new(config, Arc::new(model), metrics_handle))
    }
}
