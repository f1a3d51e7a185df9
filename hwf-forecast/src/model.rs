//! Model seams and the pretrained model artifacts that fill them
//!
//! Models are trained elsewhere and shipped as JSON. Each artifact lists the
//! feature names it was fitted on, so rows are matched by name rather than
//! by position.

use crate::error::{ForecastError, Result};
use crate::features::FeatureRow;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Decision threshold applied to classifier probabilities when the artifact
/// does not carry one.
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

/// Predicts the daily maximum temperature for one feature row.
pub trait Regressor {
    fn predict(&self, row: &FeatureRow) -> Result<f64>;
}

/// Predicts a heat-wave label for each feature row.
pub trait Classifier {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<bool>>;
}

/// Linear regression: `intercept + sum(coefficient * feature)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegressor {
    pub fn new(features: Vec<String>, coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        check_shape(&features, &coefficients)?;
        Ok(LinearRegressor {
            features,
            coefficients,
            intercept,
        })
    }

    /// Parse a JSON artifact.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hwf_forecast::{FeatureRow, LinearRegressor, Regressor};
    ///
    /// let json = r#"{"features": ["hist_mean", "max_lag_1d"], "coefficients": [0.5, 0.5], "intercept": 1.0}"#;
    /// let model = LinearRegressor::from_json_str(json).unwrap();
    /// let row = FeatureRow::new(7, 24.0, vec![(1, 28.0)]);
    /// assert_eq!(model.predict(&row).unwrap(), 27.0);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let model: LinearRegressor = serde_json::from_str(json)?;
        check_shape(&model.features, &model.coefficients)?;
        Ok(model)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        LinearRegressor::from_json_str(&std::fs::read_to_string(path)?)
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, row: &FeatureRow) -> Result<f64> {
        linear_combination(&self.features, &self.coefficients, self.intercept, row)
    }
}

/// Logistic regression with a fixed decision threshold on the probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_decision_threshold")]
    pub decision_threshold: f64,
}

fn default_decision_threshold() -> f64 {
    DEFAULT_DECISION_THRESHOLD
}

impl LogisticClassifier {
    pub fn new(features: Vec<String>, coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        check_shape(&features, &coefficients)?;
        Ok(LogisticClassifier {
            features,
            coefficients,
            intercept,
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let model: LogisticClassifier = serde_json::from_str(json)?;
        check_shape(&model.features, &model.coefficients)?;
        if !(0.0..=1.0).contains(&model.decision_threshold) {
            return Err(ForecastError::MalformedArtifact(format!(
                "decision threshold {} outside [0, 1]",
                model.decision_threshold
            )));
        }
        Ok(model)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        LogisticClassifier::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Probability of a heat-wave day for one row.
    pub fn probability(&self, row: &FeatureRow) -> Result<f64> {
        let z = linear_combination(&self.features, &self.coefficients, self.intercept, row)?;
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

impl Classifier for LogisticClassifier {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<bool>> {
        rows.iter()
            .map(|row| {
                self.probability(row)
                    .map(|probability| probability >= self.decision_threshold)
            })
            .collect()
    }
}

fn check_shape(features: &[String], coefficients: &[f64]) -> Result<()> {
    if features.len() != coefficients.len() {
        return Err(ForecastError::MalformedArtifact(format!(
            "{} features but {} coefficients",
            features.len(),
            coefficients.len()
        )));
    }
    Ok(())
}

fn linear_combination(
    features: &[String],
    coefficients: &[f64],
    intercept: f64,
    row: &FeatureRow,
) -> Result<f64> {
    features
        .iter()
        .zip(coefficients)
        .try_fold(intercept, |acc, (name, coefficient)| -> Result<f64> {
            let value = row
                .get(name)
                .ok_or_else(|| ForecastError::MalformedFeatures(name.clone()))?;
            Ok(acc + coefficient * value)
        })
}
