use thiserror::Error;

use crate::bid::BidId;

/// Errors raised by the bid evaluation crates.
///
/// Expected edge cases (no valid bids, zero denominators, unparsable
/// timelines, a full comparison selection) are never errors; they produce
/// explicit "no data" values instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BidEvalError {
    #[error("Invalid weight {weight} for criterion '{criterion}': must be between 0 and 100")]
    InvalidWeight { criterion: String, weight: f64 },

    #[error("Unknown bid: {0}")]
    UnknownBid(BidId),

    #[error("Unknown criterion: {0}")]
    UnknownCriterion(String),
}
