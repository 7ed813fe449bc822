#![forbid(unsafe_code)]

pub mod bid;
pub mod criteria;
pub mod error;

pub use bid::{Bid, BidId, BidStatus, BudgetLimit};
pub use criteria::{CriterionKind, ManualScore, ManualScoreOverrides, ScoringCriterion, MAX_CRITERION_SCORE};
pub use error::BidEvalError;
