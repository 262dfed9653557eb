//! Logistic regression over the eight four-factors features.
//!
//! `P(home wins) = sigmoid(intercept + Σ coefficient_i · feature_i)`

use serde::Deserialize;

use super::{bind_features, schema, Classifier};
use crate::error::PredictError;
use crate::stats::NUM_FEATURES;

/// Serialized form, exported from the training pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticArtifact {
    #[serde(default)]
    pub version: Option<String>,
    /// Feature names in the order the model was trained on
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Class labels; only `[0, 1]` (away win, home win) is supported
    #[serde(default = "default_classes")]
    pub classes: Vec<u8>,
}

fn default_classes() -> Vec<u8> {
    vec![0, 1]
}

#[derive(Debug, Clone)]
pub struct LogisticModel {
    name: String,
    trained_order: Vec<String>,
    /// Coefficients rearranged into [`crate::stats::FEATURE_NAMES`] order
    weights: [f64; NUM_FEATURES],
    intercept: f64,
}

impl LogisticModel {
    /// Bind the artifact's feature order to the canonical one, by name.
    pub fn from_artifact(artifact: LogisticArtifact) -> Result<Self, PredictError> {
        if artifact.classes != [0, 1] {
            return Err(schema(format!(
                "expected classes [0, 1], got {:?}",
                artifact.classes
            )));
        }
        if artifact.coefficients.len() != artifact.feature_names.len() {
            return Err(schema(format!(
                "{} coefficients for {} features",
                artifact.coefficients.len(),
                artifact.feature_names.len()
            )));
        }
        if !artifact.intercept.is_finite() || artifact.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(schema("non-finite coefficient"));
        }
        let positions = bind_features(&artifact.feature_names)?;
        let weights = positions.map(|i| artifact.coefficients[i]);

        let name = match artifact.version {
            Some(v) => format!("logistic_regression {v}"),
            None => "logistic_regression".to_string(),
        };
        Ok(Self {
            name,
            trained_order: artifact.feature_names,
            weights,
            intercept: artifact.intercept,
        })
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

impl Classifier for LogisticModel {
    fn predict_proba(&self, features: &[f64; NUM_FEATURES]) -> Result<[f64; 2], PredictError> {
        let z = self.intercept
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        let home = sigmoid(z);
        Ok([1.0 - home, home])
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn feature_names(&self) -> &[String] {
        &self.trained_order
    }
}
