//! Trained classifier loading and the process-wide model handle.

use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::info;

use crate::error::PredictError;
use crate::stats::{FEATURE_NAMES, NUM_FEATURES};

pub mod logistic;
pub mod onnx;
pub mod predictor;

use logistic::{LogisticArtifact, LogisticModel};
use onnx::OnnxManifest;
pub use predictor::{display_pair, predict_winner};

/// A binary classifier over the four factors.
///
/// Features are always passed in [`crate::stats::FEATURE_NAMES`] order;
/// implementations bind their own trained order when they are loaded.
pub trait Classifier: Send + Sync {
    /// `[P(away wins), P(home wins)]`
    fn predict_proba(&self, features: &[f64; NUM_FEATURES]) -> Result<[f64; 2], PredictError>;

    /// Predicted label: 1 for a home win, 0 for an away win. Ties go to 0.
    fn predict(&self, features: &[f64; NUM_FEATURES]) -> Result<u8, PredictError> {
        self.predict_proba(features).map(label_of)
    }

    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Feature names in the order the model was trained on.
    fn feature_names(&self) -> &[String];
}

/// Argmax over `[away, home]`, ties to the away class.
pub fn label_of([away, home]: [f64; 2]) -> u8 {
    u8::from(home > away)
}

pub(crate) fn schema(detail: impl Into<String>) -> PredictError {
    PredictError::ModelSchema {
        detail: detail.into(),
    }
}

/// For each canonical feature, its position in `trained` names.
///
/// `trained` must name every canonical feature exactly once and nothing else.
pub(crate) fn bind_features(trained: &[String]) -> Result<[usize; NUM_FEATURES], PredictError> {
    if trained.len() != NUM_FEATURES {
        return Err(schema(format!(
            "expected {} features, artifact has {}",
            NUM_FEATURES,
            trained.len()
        )));
    }
    let mut positions = [0; NUM_FEATURES];
    for (slot, name) in positions.iter_mut().zip(FEATURE_NAMES) {
        let mut found = trained
            .iter()
            .enumerate()
            .filter(|(_, n)| n.as_str() == name)
            .map(|(i, _)| i);
        match (found.next(), found.next()) {
            (Some(i), None) => *slot = i,
            (None, _) => return Err(schema(format!("feature `{name}` missing"))),
            (Some(_), Some(_)) => return Err(schema(format!("feature `{name}` repeated"))),
        }
    }
    // Eight names, each canonical name exactly once: nothing unknown is left.
    Ok(positions)
}

/// On-disk artifact, tagged by `model_type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
enum ModelArtifact {
    LogisticRegression(LogisticArtifact),
    /// Manifest pointing at an `.onnx` export next to it
    Onnx(OnnxManifest),
}

/// Read and validate a classifier artifact.
///
/// A missing file is [`PredictError::ModelUnavailable`]; any other read
/// failure, a parse failure or a feature mismatch is fatal for the request.
pub fn load_classifier(path: &Path) -> Result<Arc<dyn Classifier>, PredictError> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => PredictError::ModelUnavailable {
            path: path.to_path_buf(),
        },
        _ => PredictError::ModelIo {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let artifact: ModelArtifact =
        serde_json::from_slice(&bytes).map_err(|source| PredictError::ModelCorrupt {
            path: path.to_path_buf(),
            source,
        })?;
    let model: Arc<dyn Classifier> = match artifact {
        ModelArtifact::LogisticRegression(a) => Arc::new(LogisticModel::from_artifact(a)?),
        ModelArtifact::Onnx(manifest) => onnx::load(manifest, path)?,
    };
    Ok(model)
}

/// Lazily loaded, read-only model shared by every request.
///
/// Only a successful load is cached, so an artifact that is missing at
/// startup is picked up once it appears.
pub struct ModelStore {
    path: PathBuf,
    model: OnceLock<Arc<dyn Classifier>>,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            model: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Return the cached model, loading it on first use.
    pub fn get(&self) -> Result<Arc<dyn Classifier>, PredictError> {
        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }
        let loaded = load_classifier(&self.path)?;
        info!(
            "Model loaded: {} from {}, trained on [{}]",
            loaded.name(),
            self.path.display(),
            loaded.feature_names().join(", ")
        );
        // Two requests may race to load; both see the first one stored.
        Ok(Arc::clone(self.model.get_or_init(|| loaded)))
    }
}
