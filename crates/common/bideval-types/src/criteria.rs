use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

use crate::bid::BidId;
use crate::error::BidEvalError;

/// Upper bound of every per-criterion score.
pub const MAX_CRITERION_SCORE: u8 = 10;

/// Criteria the engine knows how to score. The display form is the
/// criterion name used by evaluators and in override keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum CriterionKind {
    #[strum(serialize = "Price Competitiveness")]
    #[serde(rename = "Price Competitiveness")]
    PriceCompetitiveness,
    #[strum(serialize = "Timeline")]
    Timeline,
    #[strum(serialize = "Credentials")]
    Credentials,
    #[strum(serialize = "Documentation")]
    Documentation,
    #[strum(serialize = "Communication")]
    Communication,
}

impl CriterionKind {
    /// Communication is judged by a person; it has no automatic scorer.
    pub fn is_automatic(&self) -> bool {
        !matches!(self, CriterionKind::Communication)
    }
}

/// A weighted scoring dimension. Weights are adjusted by the evaluator
/// between calls and should add up to 100 across all criteria.
/// Deserialization applies the same weight check as [`ScoringCriterion::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CriterionFields")]
pub struct ScoringCriterion {
    pub name: String,
    pub weight: f64,
    pub description: String,
}

#[derive(Deserialize)]
struct CriterionFields {
    name: String,
    weight: f64,
    #[serde(default)]
    description: String,
}

impl TryFrom<CriterionFields> for ScoringCriterion {
    type Error = BidEvalError;

    fn try_from(fields: CriterionFields) -> Result<Self, Self::Error> {
        ScoringCriterion::new(fields.name, fields.weight, fields.description)
    }
}

impl ScoringCriterion {
    pub fn new(name: impl Into<String>, weight: f64, description: impl Into<String>) -> Result<Self, BidEvalError> {
        let name = name.into();
        validate_weight(&name, weight)?;
        Ok(Self { name, weight, description: description.into() })
    }

    /// Copy of this criterion with a new weight.
    pub fn with_weight(&self, weight: f64) -> Result<Self, BidEvalError> {
        validate_weight(&self.name, weight)?;
        Ok(Self { weight, ..self.clone() })
    }

    /// Automatic-scoring strategy for this criterion, looked up by name.
    pub fn kind(&self) -> Option<CriterionKind> {
        self.name.parse().ok()
    }
}

fn validate_weight(name: &str, weight: f64) -> Result<(), BidEvalError> {
    if !weight.is_finite() || !(0.0..=100.0).contains(&weight) {
        return Err(BidEvalError::InvalidWeight { criterion: name.to_string(), weight });
    }
    Ok(())
}

/// Wire form of a single override entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualScore {
    pub bid_id: BidId,
    pub criterion: String,
    pub score: u8,
}

/// Evaluator-supplied scores that replace the automatic value for a
/// (bid, criterion) pair. Passed into every evaluation; never stored by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ManualScore>", into = "Vec<ManualScore>")]
pub struct ManualScoreOverrides {
    scores: BTreeMap<(BidId, String), u8>,
}

impl ManualScoreOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an override. Scores above the maximum are clamped.
    pub fn set(&mut self, bid_id: BidId, criterion: impl Into<String>, score: u8) {
        let criterion = criterion.into();
        if score > MAX_CRITERION_SCORE {
            tracing::warn!(
                "Override {} for bid {} / '{}' exceeds {}; clamping",
                score, bid_id, criterion, MAX_CRITERION_SCORE
            );
        }
        self.scores.insert((bid_id, criterion), score.min(MAX_CRITERION_SCORE));
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, bid_id: impl Into<BidId>, criterion: impl Into<String>, score: u8) -> Self {
        self.set(bid_id.into(), criterion, score);
        self
    }

    pub fn remove(&mut self, bid_id: &BidId, criterion: &str) -> Option<u8> {
        self.scores.remove(&(bid_id.clone(), criterion.to_string()))
    }

    pub fn get(&self, bid_id: &BidId, criterion: &str) -> Option<u8> {
        self.scores.get(&(bid_id.clone(), criterion.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl From<Vec<ManualScore>> for ManualScoreOverrides {
    fn from(entries: Vec<ManualScore>) -> Self {
        let mut overrides = ManualScoreOverrides::new();
        for entry in entries {
            overrides.set(entry.bid_id, entry.criterion, entry.score);
        }
        overrides
    }
}

impl From<ManualScoreOverrides> for Vec<ManualScore> {
    fn from(overrides: ManualScoreOverrides) -> Self {
        overrides
            .scores
            .into_iter()
            .map(|((bid_id, criterion), score)| ManualScore { bid_id, criterion, score })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criterion_kind_resolves_from_display_name() {
        let price = ScoringCriterion::new("Price Competitiveness", 30.0, "").unwrap();
        assert_eq!(price.kind(), Some(CriterionKind::PriceCompetitiveness));
        assert_eq!(CriterionKind::Timeline.to_string(), "Timeline");

        let custom = ScoringCriterion::new("Safety Record", 5.0, "").unwrap();
        assert_eq!(custom.kind(), None);
        assert!(!CriterionKind::Communication.is_automatic());
    }

    #[test]
    fn weight_outside_range_is_rejected() {
        assert!(matches!(
            ScoringCriterion::new("Timeline", 120.0, ""),
            Err(BidEvalError::InvalidWeight { .. })
        ));
        assert!(ScoringCriterion::new("Timeline", -1.0, "").is_err());
        assert!(ScoringCriterion::new("Timeline", f64::NAN, "").is_err());

        let timeline = ScoringCriterion::new("Timeline", 20.0, "Schedule").unwrap();
        let heavier = timeline.with_weight(35.0).unwrap();
        assert_eq!(heavier.weight, 35.0);
        assert_eq!(heavier.description, "Schedule");
    }

    #[test]
    fn deserialization_checks_weight() {
        let parsed: ScoringCriterion = serde_json::from_str(r#"{"name":"Timeline","weight":25.0}"#).unwrap();
        assert_eq!(parsed.weight, 25.0);
        assert_eq!(parsed.description, "");

        let err = serde_json::from_str::<ScoringCriterion>(r#"{"name":"Timeline","weight":150.0}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid weight 150 for criterion 'Timeline'"));
        assert!(serde_json::from_str::<ScoringCriterion>(r#"{"name":"Timeline","weight":-5}"#).is_err());
    }

    #[test]
    fn overrides_clamp_and_replace() {
        let mut overrides = ManualScoreOverrides::new().with("a", "Communication", 7);
        assert_eq!(overrides.get(&BidId::from("a"), "Communication"), Some(7));

        overrides.set(BidId::from("a"), "Communication", 14);
        assert_eq!(overrides.get(&BidId::from("a"), "Communication"), Some(10));
        assert_eq!(overrides.len(), 1);

        assert_eq!(overrides.remove(&BidId::from("a"), "Communication"), Some(10));
        assert!(overrides.is_empty());
    }

    #[test]
    fn overrides_use_list_wire_format() {
        let json = r#"[{"bid_id":"b2","criterion":"Timeline","score":4}]"#;
        let overrides: ManualScoreOverrides = serde_json::from_str(json).unwrap();
        assert_eq!(overrides.get(&BidId::from("b2"), "Timeline"), Some(4));
        assert_eq!(serde_json::to_string(&overrides).unwrap(), json);
    }
}
