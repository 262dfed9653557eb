//! ONNX classifiers (pure Rust via `tract-onnx`, behind the `onnx` feature).
//!
//! The artifact is a small JSON manifest naming the `.onnx` file and the
//! feature order it was trained on:
//!
//! ```json
//! {"model_type": "onnx", "model_file": "four_factors.onnx",
//!  "feature_names": ["h_efg", "h_tov", ...], "version": "2024-01"}
//! ```
//!
//! The graph takes one `[1, 8]` f32 input and must produce a two-element
//! f32 probability output `[P(away), P(home)]`. scikit-learn exports made
//! with `zipmap=False` qualify; the integer label output is ignored.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{bind_features, Classifier};
use crate::error::PredictError;

#[derive(Debug, Clone, Deserialize)]
pub struct OnnxManifest {
    #[serde(default)]
    pub version: Option<String>,
    /// Relative paths resolve against the manifest's directory
    pub model_file: PathBuf,
    /// Feature names in the order the model was trained on
    pub feature_names: Vec<String>,
}

impl OnnxManifest {
    pub fn model_path(&self, manifest_path: &Path) -> PathBuf {
        match manifest_path.parent() {
            Some(dir) if self.model_file.is_relative() => dir.join(&self.model_file),
            _ => self.model_file.clone(),
        }
    }
}

/// Build a classifier from a manifest read at `manifest_path`.
///
/// A missing `.onnx` file is [`PredictError::ModelUnavailable`], like a
/// missing manifest.
pub fn load(
    manifest: OnnxManifest,
    manifest_path: &Path,
) -> Result<Arc<dyn Classifier>, PredictError> {
    let positions = bind_features(&manifest.feature_names)?;
    let model_path = manifest.model_path(manifest_path);
    if !model_path.is_file() {
        return Err(PredictError::ModelUnavailable { path: model_path });
    }
    build(manifest, &model_path, positions)
}

#[cfg(not(feature = "onnx"))]
fn build(
    _manifest: OnnxManifest,
    model_path: &Path,
    _positions: [usize; crate::stats::NUM_FEATURES],
) -> Result<Arc<dyn Classifier>, PredictError> {
    Err(super::schema(format!(
        "{} is an ONNX model; rebuild with the `onnx` feature to serve it",
        model_path.display()
    )))
}

#[cfg(feature = "onnx")]
fn build(
    manifest: OnnxManifest,
    model_path: &Path,
    positions: [usize; crate::stats::NUM_FEATURES],
) -> Result<Arc<dyn Classifier>, PredictError> {
    Ok(Arc::new(runtime::OnnxModel::load(
        manifest,
        model_path,
        positions,
    )?))
}

#[cfg(feature = "onnx")]
mod runtime {
    use std::path::Path;
    use tract_onnx::prelude::*;
    use tracing::debug;

    use super::OnnxManifest;
    use crate::error::PredictError;
    use crate::model::{schema, Classifier};
    use crate::stats::NUM_FEATURES;

    const INPUT_SHAPE: [usize; 2] = [1, NUM_FEATURES];

    pub struct OnnxModel {
        name: String,
        trained_order: Vec<String>,
        /// Position of each canonical feature in the graph input
        positions: [usize; NUM_FEATURES],
        plan: TypedRunnableModel<TypedModel>,
        /// Which graph output holds the class probabilities
        proba_output: usize,
    }

    fn inference(e: impl std::fmt::Display) -> PredictError {
        PredictError::Inference {
            detail: e.to_string(),
        }
    }

    /// First output that reads as two f32 values.
    fn probability_output(outputs: &TVec<TValue>) -> Option<usize> {
        outputs.iter().position(|t| {
            t.to_array_view::<f32>()
                .map(|a| a.len() == 2)
                .unwrap_or(false)
        })
    }

    impl OnnxModel {
        pub fn load(
            manifest: OnnxManifest,
            model_path: &Path,
            positions: [usize; NUM_FEATURES],
        ) -> Result<Self, PredictError> {
            let plan = tract_onnx::onnx()
                .model_for_path(model_path)
                .and_then(|m| {
                    m.with_input_fact(
                        0,
                        InferenceFact::dt_shape(f32::datum_type(), tvec!(1, NUM_FEATURES)),
                    )
                })
                .and_then(|m| m.into_optimized())
                .and_then(|m| m.into_runnable())
                .map_err(|e| schema(format!("{}: {e}", model_path.display())))?;

            // Locate the probability output with a dry run on zeros.
            let dummy =
                tract_ndarray::ArrayD::<f32>::zeros(tract_ndarray::IxDyn(&INPUT_SHAPE)).into_tvalue();
            let outputs = plan
                .run(tvec!(dummy))
                .map_err(|e| schema(format!("{}: {e}", model_path.display())))?;
            let proba_output = probability_output(&outputs).ok_or_else(|| {
                schema(format!(
                    "{} has no two-class f32 probability output (export with zipmap=False)",
                    model_path.display()
                ))
            })?;
            debug!(
                "ONNX model {} uses output {} of {}",
                model_path.display(),
                proba_output,
                outputs.len()
            );

            let name = match manifest.version {
                Some(v) => format!("onnx {v}"),
                None => "onnx".to_string(),
            };
            Ok(Self {
                name,
                trained_order: manifest.feature_names,
                positions,
                plan,
                proba_output,
            })
        }
    }

    impl Classifier for OnnxModel {
        fn predict_proba(&self, features: &[f64; NUM_FEATURES]) -> Result<[f64; 2], PredictError> {
            let mut input = vec![0f32; NUM_FEATURES];
            for (value, &at) in features.iter().zip(&self.positions) {
                input[at] = *value as f32;
            }
            let tensor =
                tract_ndarray::ArrayD::<f32>::from_shape_vec(tract_ndarray::IxDyn(&INPUT_SHAPE), input)
                    .map_err(inference)?
                    .into_tvalue();
            let outputs = self.plan.run(tvec!(tensor)).map_err(inference)?;
            let proba = outputs
                .get(self.proba_output)
                .ok_or_else(|| inference("probability output missing"))?
                .to_array_view::<f32>()
                .map_err(inference)?;
            match proba.as_slice() {
                Some(&[away, home]) => Ok([f64::from(away), f64::from(home)]),
                _ => Err(inference(format!(
                    "expected 2 probabilities, got {}",
                    proba.len()
                ))),
            }
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn feature_names(&self) -> &[String] {
            &self.trained_order
        }
    }
}
