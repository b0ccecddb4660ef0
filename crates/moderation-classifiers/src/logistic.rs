//! Binary logistic regression
//!
//! Fitted with full-batch gradient descent on the L2-regularized, sample
//! weighted log loss. The intercept is not regularized. Inference returns
//! the probability and the class decision from one decision value.

use crate::features::FeatureVector;
use moderation_core::{Error, Prediction, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Per-class sample weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    /// `n_samples / (2 * n_class)` for each class
    #[default]
    Balanced,
    /// Every sample weighs 1
    Uniform,
}

/// Training hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionConfig {
    /// Inverse regularization strength
    #[serde(default = "default_c")]
    pub c: f64,

    /// Iteration bound
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Stop once every gradient component is below this value
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Gradient descent step size
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    #[serde(default)]
    pub class_weight: ClassWeight,

    /// Probability above which a sample is flagged.
    /// 0.5 is the native boundary of the linear model (decision value 0).
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            c: default_c(),
            max_iter: default_max_iter(),
            tolerance: default_tolerance(),
            learning_rate: default_learning_rate(),
            class_weight: ClassWeight::Balanced,
            threshold: default_threshold(),
        }
    }
}

fn default_c() -> f64 {
    1.0
}

fn default_max_iter() -> usize {
    500
}

fn default_tolerance() -> f64 {
    1e-4
}

fn default_learning_rate() -> f64 {
    1.0
}

fn default_threshold() -> f64 {
    0.5
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Fitted binary logistic regression model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    coefficients: Vec<f64>,
    intercept: f64,
    threshold: f64,
    iterations: usize,
    converged: bool,
}

impl LogisticRegression {
    /// Build a model from known parameters
    pub fn from_parameters(coefficients: Vec<f64>, intercept: f64, threshold: f64) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(Self {
            coefficients,
            intercept,
            threshold,
            iterations: 0,
            converged: true,
        })
    }

    /// Fit on labeled samples (label 1 = flag, 0 = benign)
    pub fn fit(
        samples: &[FeatureVector],
        labels: &[u8],
        config: &LogisticRegressionConfig,
    ) -> Result<Self> {
        validate_threshold(config.threshold)?;
        if config.c <= 0.0 {
            return Err(Error::config("regularization strength C must be positive"));
        }
        if samples.is_empty() {
            return Err(Error::classifier("cannot fit on an empty training set"));
        }
        if samples.len() != labels.len() {
            return Err(Error::classifier(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }

        let dimension = samples[0].dimension();
        if samples.iter().any(|s| s.dimension() != dimension) {
            return Err(Error::classifier("samples have inconsistent dimensions"));
        }

        let positives = labels.iter().filter(|&&y| y == 1).count();
        let negatives = labels.iter().filter(|&&y| y == 0).count();
        if positives + negatives != labels.len() {
            return Err(Error::classifier("labels must be 0 or 1"));
        }
        if positives == 0 || negatives == 0 {
            return Err(Error::classifier(
                "training set needs samples of both classes",
            ));
        }

        let n = samples.len() as f64;
        let (positive_weight, negative_weight) = match config.class_weight {
            ClassWeight::Balanced => (n / (2.0 * positives as f64), n / (2.0 * negatives as f64)),
            ClassWeight::Uniform => (1.0, 1.0),
        };

        let mut weights = vec![0.0; dimension];
        let mut intercept = 0.0;
        let mut iterations = 0;
        let mut converged = false;

        for iteration in 0..config.max_iter {
            iterations = iteration + 1;

            let mut gradient: Vec<f64> = weights.iter().map(|w| w / (config.c * n)).collect();
            let mut intercept_gradient = 0.0;

            for (sample, &label) in samples.iter().zip(labels) {
                let (y, sample_weight) = if label == 1 {
                    (1.0, positive_weight)
                } else {
                    (0.0, negative_weight)
                };
                let p = sigmoid(sample.dot(&weights) + intercept);
                let error = sample_weight * (p - y) / n;

                for &(column, value) in sample.entries() {
                    gradient[column] += error * value;
                }
                intercept_gradient += error;
            }

            let largest = gradient
                .iter()
                .chain(std::iter::once(&intercept_gradient))
                .fold(0.0f64, |acc, g| acc.max(g.abs()));
            if largest < config.tolerance {
                debug!("Converged after {} iterations", iteration);
                iterations = iteration;
                converged = true;
                break;
            }

            for (w, g) in weights.iter_mut().zip(&gradient) {
                *w -= config.learning_rate * g;
            }
            intercept -= config.learning_rate * intercept_gradient;
        }

        if !converged {
            warn!(
                "Gradient descent stopped at max_iter={} before the gradient fell below {}; \
                 consider raising max_iter",
                config.max_iter, config.tolerance
            );
        }

        info!(
            "Fitted logistic regression: {} features, {} samples ({} flagged), {} iterations",
            dimension,
            samples.len(),
            positives,
            iterations
        );

        Ok(Self {
            coefficients: weights,
            intercept,
            threshold: config.threshold,
            iterations,
            converged,
        })
    }

    /// Check parameters read back from storage
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err(Error::config("classifier holds non-finite parameters"));
        }
        Ok(())
    }

    /// Whether fitting reached the gradient tolerance before `max_iter`
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Input dimension the model was fitted for
    pub fn dimension(&self) -> usize {
        self.coefficients.len()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Probability threshold of the decision rule
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Gradient descent iterations performed while fitting
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Signed distance to the separating hyperplane
    pub fn decision_function(&self, features: &FeatureVector) -> f64 {
        features.dot(&self.coefficients) + self.intercept
    }

    /// Decision value at which the model switches to flagging
    pub fn decision_boundary(&self) -> f64 {
        (self.threshold / (1.0 - self.threshold)).ln()
    }

    /// Flag decision and probability from a single decision value
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        if features.dimension() != self.dimension() {
            return Err(Error::classifier(format!(
                "feature dimension {} does not match model dimension {}",
                features.dimension(),
                self.dimension()
            )));
        }

        let z = self.decision_function(features);
        Ok(Prediction::new(z > self.decision_boundary(), sigmoid(z)))
    }
}

fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold > 0.0 && threshold < 1.0 {
        Ok(())
    } else {
        Err(Error::config(format!(
            "decision threshold must lie in (0, 1), got {}",
            threshold
        )))
    }
}
