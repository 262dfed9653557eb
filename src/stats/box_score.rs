use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::PredictError;

/// Counter suffixes, in form order. Each is prefixed with `h_` or `a_`.
pub const COUNTER_NAMES: [&str; 8] = ["fgm", "fga", "3pm", "ftm", "fta", "trb", "orb", "tov"];

/// One side's raw counting stats for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamBox {
    /// Field goals made
    pub fgm: u32,
    /// Field goals attempted
    pub fga: u32,
    /// Three-pointers made
    pub three_pm: u32,
    /// Free throws made
    pub ftm: u32,
    /// Free throws attempted
    pub fta: u32,
    /// Total rebounds
    pub trb: u32,
    /// Offensive rebounds
    pub orb: u32,
    /// Turnovers
    pub tov: u32,
}

impl TeamBox {
    /// Rebounds grabbed on the defensive end.
    pub fn defensive_rebounds(&self) -> u32 {
        self.trb.saturating_sub(self.orb)
    }

    /// Read the eight `{prefix}_*` counters out of raw form fields.
    fn from_fields(fields: &HashMap<String, String>, prefix: &str) -> Result<Self, PredictError> {
        let get = |name: &str| counter(fields, &format!("{prefix}_{name}"));
        Ok(Self {
            fgm: get("fgm")?,
            fga: get("fga")?,
            three_pm: get("3pm")?,
            ftm: get("ftm")?,
            fta: get("fta")?,
            trb: get("trb")?,
            orb: get("orb")?,
            tov: get("tov")?,
        })
    }

    fn validate(&self, side: &str) -> Result<(), PredictError> {
        let checks = [
            (self.fgm <= self.fga, "field goals made exceed attempts"),
            (self.three_pm <= self.fgm, "three-pointers made exceed field goals made"),
            (self.ftm <= self.fta, "free throws made exceed attempts"),
            (self.orb <= self.trb, "offensive rebounds exceed total rebounds"),
        ];
        for (ok, what) in checks {
            if !ok {
                return Err(PredictError::InconsistentBoxScore {
                    detail: format!("{side} team {what}"),
                });
            }
        }
        Ok(())
    }
}

fn counter(fields: &HashMap<String, String>, name: &str) -> Result<u32, PredictError> {
    let raw = fields.get(name).map(|v| v.trim()).unwrap_or_default();
    if raw.is_empty() {
        return Err(PredictError::MissingField {
            field: name.to_string(),
        });
    }
    raw.parse::<u32>().map_err(|_| PredictError::InvalidNumber {
        field: name.to_string(),
        value: raw.to_string(),
    })
}

/// Sixteen-counter box score for a single game.
///
/// On the wire it is the flat `h_fgm` .. `a_tov` shape used by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "FlatBoxScore", into = "FlatBoxScore")]
pub struct BoxScore {
    pub home: TeamBox,
    pub away: TeamBox,
}

impl BoxScore {
    /// Parse raw form fields. Every field is required and must be a
    /// non-negative integer; the counters must also be consistent.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, PredictError> {
        let score = Self {
            home: TeamBox::from_fields(fields, "h")?,
            away: TeamBox::from_fields(fields, "a")?,
        };
        score.validate()?;
        Ok(score)
    }

    pub fn validate(&self) -> Result<(), PredictError> {
        self.home.validate("home")?;
        self.away.validate("away")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct FlatBoxScore {
    h_fgm: u32,
    h_fga: u32,
    h_3pm: u32,
    h_ftm: u32,
    h_fta: u32,
    h_trb: u32,
    h_orb: u32,
    h_tov: u32,
    a_fgm: u32,
    a_fga: u32,
    a_3pm: u32,
    a_ftm: u32,
    a_fta: u32,
    a_trb: u32,
    a_orb: u32,
    a_tov: u32,
}

impl From<FlatBoxScore> for BoxScore {
    fn from(f: FlatBoxScore) -> Self {
        Self {
            home: TeamBox {
                fgm: f.h_fgm,
                fga: f.h_fga,
                three_pm: f.h_3pm,
                ftm: f.h_ftm,
                fta: f.h_fta,
                trb: f.h_trb,
                orb: f.h_orb,
                tov: f.h_tov,
            },
            away: TeamBox {
                fgm: f.a_fgm,
                fga: f.a_fga,
                three_pm: f.a_3pm,
                ftm: f.a_ftm,
                fta: f.a_fta,
                trb: f.a_trb,
                orb: f.a_orb,
                tov: f.a_tov,
            },
        }
    }
}

impl From<BoxScore> for FlatBoxScore {
    fn from(b: BoxScore) -> Self {
        Self {
            h_fgm: b.home.fgm,
            h_fga: b.home.fga,
            h_3pm: b.home.three_pm,
            h_ftm: b.home.ftm,
            h_fta: b.home.fta,
            h_trb: b.home.trb,
            h_orb: b.home.orb,
            h_tov: b.home.tov,
            a_fgm: b.away.fgm,
            a_fga: b.away.fga,
            a_3pm: b.away.three_pm,
            a_ftm: b.away.ftm,
            a_fta: b.away.fta,
            a_trb: b.away.trb,
            a_orb: b.away.orb,
            a_tov: b.away.tov,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Box score from a real game, used across the crate's tests.
    pub(crate) fn sample_fields() -> HashMap<String, String> {
        [
            ("h_fgm", "40"),
            ("h_fga", "80"),
            ("h_3pm", "13"),
            ("h_ftm", "9"),
            ("h_fta", "17"),
            ("h_trb", "42"),
            ("h_orb", "10"),
            ("h_tov", "17"),
            ("a_fgm", "37"),
            ("a_fga", "90"),
            ("a_3pm", "8"),
            ("a_ftm", "27"),
            ("a_fta", "33"),
            ("a_trb", "48"),
            ("a_orb", "16"),
            ("a_tov", "9"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    pub(crate) fn sample_box_score() -> BoxScore {
        BoxScore::from_fields(&sample_fields()).expect("sample box score is valid")
    }

    #[test]
    fn parses_all_sixteen_fields() {
        let score = sample_box_score();
        assert_eq!(score.home.fgm, 40);
        assert_eq!(score.home.three_pm, 13);
        assert_eq!(score.away.fta, 33);
        assert_eq!(score.away.tov, 9);
        assert_eq!(score.home.defensive_rebounds(), 32);
    }

    #[test]
    fn missing_field_is_rejected() {
        let mut fields = sample_fields();
        fields.remove("a_orb");
        match BoxScore::from_fields(&fields) {
            Err(PredictError::MissingField { field }) => assert_eq!(field, "a_orb"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn blank_field_counts_as_missing() {
        let mut fields = sample_fields();
        fields.insert("h_tov".into(), "   ".into());
        assert!(matches!(
            BoxScore::from_fields(&fields),
            Err(PredictError::MissingField { .. })
        ));
    }

    #[test]
    fn non_integer_values_are_rejected() {
        for bad in ["12.5", "-3", "ten"] {
            let mut fields = sample_fields();
            fields.insert("h_fga".into(), bad.into());
            match BoxScore::from_fields(&fields) {
                Err(PredictError::InvalidNumber { field, value }) => {
                    assert_eq!(field, "h_fga");
                    assert_eq!(value, bad);
                }
                other => panic!("expected InvalidNumber for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let mut fields = sample_fields();
        fields.insert("h_fgm".into(), " 40 ".into());
        assert_eq!(BoxScore::from_fields(&fields).unwrap(), sample_box_score());
    }

    #[test]
    fn made_above_attempted_is_inconsistent() {
        let mut fields = sample_fields();
        fields.insert("a_ftm".into(), "34".into());
        let err = BoxScore::from_fields(&fields).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("away team free throws"));
    }

    #[test]
    fn offensive_above_total_rebounds_is_inconsistent() {
        let mut score = sample_box_score();
        score.home.orb = score.home.trb + 1;
        assert!(matches!(
            score.validate(),
            Err(PredictError::InconsistentBoxScore { .. })
        ));
    }

    #[test]
    fn deserializes_flat_json() {
        let json = serde_json::json!({
            "h_fgm": 40, "h_fga": 80, "h_3pm": 13, "h_ftm": 9,
            "h_fta": 17, "h_trb": 42, "h_orb": 10, "h_tov": 17,
            "a_fgm": 37, "a_fga": 90, "a_3pm": 8, "a_ftm": 27,
            "a_fta": 33, "a_trb": 48, "a_orb": 16, "a_tov": 9
        });
        let score: BoxScore = serde_json::from_value(json).unwrap();
        assert_eq!(score, sample_box_score());
    }

    #[test]
    fn json_missing_counter_fails() {
        let json = serde_json::json!({ "h_fgm": 40 });
        assert!(serde_json::from_value::<BoxScore>(json).is_err());
    }
}
