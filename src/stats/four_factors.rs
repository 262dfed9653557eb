//! Dean Oliver's four factors.
//!
//! Each side gets four ratios:
//! - **Shooting**: (FG + 0.5 * 3P) / FGA, in [0, 1.5] (1.5 when every shot is a made three)
//! - **Turnovers**: TOV / (FGA + 0.44 * FTA + TOV), in [0, 1]
//! - **Rebounding**: DRB / (opponent ORB + DRB), in [0, 1]
//! - **Free throws**: FT / FGA, not bounded above (a team can make more free
//!   throws than it attempts field goals)
//!
//! A zero denominator fails the derivation with
//! [`PredictError::UndefinedRatio`] instead of producing NaN.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::box_score::{BoxScore, TeamBox};
use crate::error::PredictError;

/// Number of model input features
pub const NUM_FEATURES: usize = 8;

/// Feature names in canonical order. [`FourFactors::to_array`] follows it.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "h_efg", "a_efg", "h_tov", "a_tov", "h_drb", "a_drb", "h_ftr", "a_ftr",
];

/// Weight of free throw attempts in a possession estimate.
const FTA_POSSESSION_WEIGHT: f64 = 0.44;

/// Highest effective field goal percentage: every attempt a made three.
const MAX_EFG: f64 = 1.5;

/// Largest value a derivable factor can take, by feature name.
fn upper_bound(name: &str) -> f64 {
    if name.ends_with("_efg") {
        MAX_EFG
    } else if name.ends_with("_ftr") {
        f64::INFINITY
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourFactors {
    /// Home effective field goal percentage
    pub h_efg: f64,
    pub a_efg: f64,
    /// Home turnovers per possession
    pub h_tov: f64,
    pub a_tov: f64,
    /// Home defensive rebound percentage
    pub h_drb: f64,
    pub a_drb: f64,
    /// Home free throws made per field goal attempt
    pub h_ftr: f64,
    pub a_ftr: f64,
}

impl FourFactors {
    /// Values in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.h_efg, self.a_efg, self.h_tov, self.a_tov, self.h_drb, self.a_drb, self.h_ftr,
            self.a_ftr,
        ]
    }

    /// Parse eight already-computed factors from raw form fields.
    ///
    /// Each value must be finite and within the range a box score could
    /// produce for that factor.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, PredictError> {
        let mut values = [0.0; NUM_FEATURES];
        for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
            let raw = fields.get(name).map(|v| v.trim()).unwrap_or_default();
            if raw.is_empty() {
                return Err(PredictError::MissingField {
                    field: name.to_string(),
                });
            }
            *slot = match raw.parse::<f64>() {
                Ok(v) if v.is_finite() && (0.0..=upper_bound(name)).contains(&v) => v,
                _ => {
                    return Err(PredictError::InvalidNumber {
                        field: name.to_string(),
                        value: raw.to_string(),
                    })
                }
            };
        }
        let [h_efg, a_efg, h_tov, a_tov, h_drb, a_drb, h_ftr, a_ftr] = values;
        Ok(Self {
            h_efg,
            a_efg,
            h_tov,
            a_tov,
            h_drb,
            a_drb,
            h_ftr,
            a_ftr,
        })
    }
}

fn ratio(feature: &'static str, numerator: f64, denominator: f64) -> Result<f64, PredictError> {
    if denominator <= 0.0 {
        return Err(PredictError::UndefinedRatio { feature });
    }
    Ok(numerator / denominator)
}

struct SideFactors {
    efg: f64,
    tov: f64,
    drb: f64,
    ftr: f64,
}

/// `names` are the feature names for this side, in efg/tov/drb/ftr order.
fn side_factors(
    team: &TeamBox,
    opponent: &TeamBox,
    names: [&'static str; 4],
) -> Result<SideFactors, PredictError> {
    let fga = f64::from(team.fga);
    let drb = f64::from(team.defensive_rebounds());
    Ok(SideFactors {
        efg: ratio(
            names[0],
            f64::from(team.fgm) + 0.5 * f64::from(team.three_pm),
            fga,
        )?,
        tov: ratio(
            names[1],
            f64::from(team.tov),
            fga + FTA_POSSESSION_WEIGHT * f64::from(team.fta) + f64::from(team.tov),
        )?,
        drb: ratio(names[2], drb, f64::from(opponent.orb) + drb)?,
        ftr: ratio(names[3], f64::from(team.ftm), fga)?,
    })
}

/// Derive both sides' four factors from a box score.
pub fn derive_four_factors(score: &BoxScore) -> Result<FourFactors, PredictError> {
    let home = side_factors(
        &score.home,
        &score.away,
        ["h_efg", "h_tov", "h_drb", "h_ftr"],
    )?;
    let away = side_factors(
        &score.away,
        &score.home,
        ["a_efg", "a_tov", "a_drb", "a_ftr"],
    )?;
    Ok(FourFactors {
        h_efg: home.efg,
        a_efg: away.efg,
        h_tov: home.tov,
        a_tov: away.tov,
        h_drb: home.drb,
        a_drb: away.drb,
        h_ftr: home.ftr,
        a_ftr: away.ftr,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::stats::box_score::tests::sample_box_score;
    use approx::assert_relative_eq;

    /// Four factors of the sample box score, rounded to six places.
    pub(crate) fn sample_four_factors() -> FourFactors {
        FourFactors {
            h_efg: 0.581250,
            a_efg: 0.455556,
            h_tov: 0.162711,
            a_tov: 0.079281,
            h_drb: 0.666667,
            a_drb: 0.761905,
            h_ftr: 0.112500,
            a_ftr: 0.300000,
        }
    }

    #[test]
    fn sample_game_matches_reference_values() {
        let got = derive_four_factors(&sample_box_score()).unwrap();
        let want = sample_four_factors();
        for (g, w) in got.to_array().into_iter().zip(want.to_array()) {
            assert_relative_eq!(g, w, epsilon = 1e-5);
        }
    }

    #[test]
    fn away_turnover_rate_uses_away_turnovers() {
        // 9 / (90 + 0.44 * 33 + 9), not 9 / (90 + 0.44 * 33 + 17)
        let ff = derive_four_factors(&sample_box_score()).unwrap();
        assert_relative_eq!(ff.a_tov, 9.0 / 113.52, epsilon = 1e-12);
    }

    #[test]
    fn all_factors_are_bounded_ratios() {
        let ff = derive_four_factors(&sample_box_score()).unwrap();
        let values = ff.to_array();
        assert_eq!(values.len(), 8);
        for (name, v) in FEATURE_NAMES.iter().zip(values) {
            assert!(v.is_finite());
            assert!((0.0..=upper_bound(name)).contains(&v), "{name}={v} out of range");
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let score = sample_box_score();
        assert_eq!(
            derive_four_factors(&score).unwrap(),
            derive_four_factors(&score).unwrap()
        );
    }

    #[test]
    fn zero_home_attempts_is_undefined() {
        let mut score = sample_box_score();
        score.home.fga = 0;
        score.home.fgm = 0;
        score.home.three_pm = 0;
        match derive_four_factors(&score) {
            Err(PredictError::UndefinedRatio { feature }) => assert_eq!(feature, "h_efg"),
            other => panic!("expected UndefinedRatio, got {other:?}"),
        }
    }

    #[test]
    fn zero_rebounds_is_undefined() {
        let mut score = sample_box_score();
        score.away.trb = 0;
        score.away.orb = 0;
        score.home.orb = 0;
        score.home.trb = 0;
        match derive_four_factors(&score) {
            Err(PredictError::UndefinedRatio { feature }) => assert_eq!(feature, "h_drb"),
            other => panic!("expected UndefinedRatio, got {other:?}"),
        }
    }

    #[test]
    fn zero_turnovers_is_a_defined_zero_rate() {
        let mut score = sample_box_score();
        score.home.tov = 0;
        let ff = derive_four_factors(&score).unwrap();
        assert_eq!(ff.h_tov, 0.0);
    }

    #[test]
    fn array_follows_feature_names() {
        let ff = sample_four_factors();
        let values = ff.to_array();
        assert_eq!(FEATURE_NAMES[3], "a_tov");
        assert_eq!(values[3], ff.a_tov);
        assert_eq!(FEATURE_NAMES[7], "a_ftr");
        assert_eq!(values[7], ff.a_ftr);
    }

    fn sample_fields() -> HashMap<String, String> {
        FEATURE_NAMES
            .iter()
            .zip(sample_four_factors().to_array())
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn factors_from_form_fields() {
        assert_eq!(
            FourFactors::from_fields(&sample_fields()).unwrap(),
            sample_four_factors()
        );
    }

    #[test]
    fn factors_out_of_range_are_rejected() {
        for (name, value) in [
            ("h_efg", "1.6"),
            ("a_tov", "1.5"),
            ("h_drb", "1.01"),
            ("a_ftr", "-0.1"),
            ("h_efg", "NaN"),
            ("h_ftr", "inf"),
        ] {
            let mut fields = sample_fields();
            fields.insert(name.into(), value.into());
            assert!(
                matches!(
                    FourFactors::from_fields(&fields),
                    Err(PredictError::InvalidNumber { .. })
                ),
                "{name}={value} accepted"
            );
        }
    }

    #[test]
    fn all_threes_game_round_trips_through_form_fields() {
        let mut score = sample_box_score();
        score.home.fgm = 10;
        score.home.fga = 10;
        score.home.three_pm = 10;
        let ff = derive_four_factors(&score).unwrap();
        assert_relative_eq!(ff.h_efg, MAX_EFG);

        let fields: HashMap<String, String> = FEATURE_NAMES
            .iter()
            .zip(ff.to_array())
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        assert_eq!(FourFactors::from_fields(&fields).unwrap(), ff);
    }

    #[test]
    fn free_throw_rate_above_one_is_accepted() {
        // 12 free throws on 10 field goal attempts
        let mut score = sample_box_score();
        score.home.fga = 10;
        score.home.fgm = 5;
        score.home.three_pm = 2;
        score.home.ftm = 12;
        score.home.fta = 14;
        let ff = derive_four_factors(&score).unwrap();
        assert_relative_eq!(ff.h_ftr, 1.2);

        let mut fields = sample_fields();
        fields.insert("h_ftr".into(), ff.h_ftr.to_string());
        assert!(FourFactors::from_fields(&fields).is_ok());
    }
}
