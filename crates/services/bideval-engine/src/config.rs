use serde::{Deserialize, Serialize};

/// Ordering applied between bids with equal weighted scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the order the bids were supplied in.
    #[default]
    InputOrder,
    /// Order tied bids by identifier, independent of fetch order.
    BidId,
}

/// Tunables for the evaluation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tie_break: TieBreak,
    /// Allowed distance of the weight total from 100 before it is reported as unbalanced.
    pub weight_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::InputOrder,
            weight_tolerance: 0.01,
        }
    }
}
