use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a box score from becoming a prediction.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("missing field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` must be a non-negative number, got {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("inconsistent box score: {detail}")]
    InconsistentBoxScore { detail: String },

    /// A four-factors denominator was zero.
    #[error("`{feature}` is undefined for this box score (zero denominator)")]
    UndefinedRatio { feature: &'static str },

    #[error("prediction model not found at {}", path.display())]
    ModelUnavailable { path: PathBuf },

    #[error("model artifact does not match the four factors features: {detail}")]
    ModelSchema { detail: String },

    #[error("model artifact at {} is not a valid model", path.display())]
    ModelCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The model loaded but could not score this input.
    #[error("model inference failed: {detail}")]
    Inference { detail: String },

    #[error("failed to read model artifact at {}", path.display())]
    ModelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PredictError {
    /// Rejected at the input boundary, before any derivation happens.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            PredictError::MissingField { .. }
                | PredictError::InvalidNumber { .. }
                | PredictError::InconsistentBoxScore { .. }
        )
    }
}
