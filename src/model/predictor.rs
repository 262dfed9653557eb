use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::{label_of, ModelStore};
use crate::error::PredictError;
use crate::stats::FourFactors;

/// Shown in place of a winner when no model artifact is available.
pub const MODEL_MISSING_MESSAGE: &str = "Prediction model is missing";

/// Probability reported alongside [`MODEL_MISSING_MESSAGE`].
pub const MODEL_MISSING_PROBABILITY: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Winner {
    #[serde(rename = "Home team")]
    Home,
    #[serde(rename = "Away team")]
    Away,
}

impl Winner {
    /// Label 1 is a home win, anything else an away win.
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Winner::Home
        } else {
            Winner::Away
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Winner::Home => "Home team",
            Winner::Away => "Away team",
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub winner: Winner,
    /// Confidence in the predicted side, rounded to three places
    pub probability: f64,
}

/// Three-place rounding. A winning probability below 0.5005, or an exact
/// tie, is reported as 0.5.
fn round3(p: f64) -> f64 {
    (p * 1000.0).round() / 1000.0
}

/// Predict the winner of the game the four factors were derived from.
pub fn predict_winner(store: &ModelStore, factors: &FourFactors) -> Result<Prediction, PredictError> {
    let model = store.get()?;
    let proba = model.predict_proba(&factors.to_array())?;
    let [away, home] = proba;
    let prediction = Prediction {
        winner: Winner::from_label(label_of(proba)),
        probability: round3(away.max(home)),
    };
    debug!(
        "{} predicts {} (p={:.3})",
        model.name(),
        prediction.winner,
        prediction.probability
    );
    Ok(prediction)
}

/// Collapse a prediction into the `(label, probability)` pair shown to users.
///
/// A missing model becomes [`MODEL_MISSING_MESSAGE`] with
/// [`MODEL_MISSING_PROBABILITY`]; every other error is passed through.
pub fn display_pair(
    result: Result<Prediction, PredictError>,
) -> Result<(String, f64), PredictError> {
    match result {
        Ok(p) => Ok((p.winner.to_string(), p.probability)),
        Err(PredictError::ModelUnavailable { .. }) => Ok((
            MODEL_MISSING_MESSAGE.to_string(),
            MODEL_MISSING_PROBABILITY,
        )),
        Err(e) => Err(e),
    }
}
