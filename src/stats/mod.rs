pub mod box_score;
pub mod four_factors;

pub use box_score::{BoxScore, COUNTER_NAMES};
pub use four_factors::{derive_four_factors, FourFactors, FEATURE_NAMES, NUM_FEATURES};
