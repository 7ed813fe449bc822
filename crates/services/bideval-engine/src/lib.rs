#![forbid(unsafe_code)]

//! Bid analytics, weighted multi-criteria scoring, side-by-side comparison
//! and recommendations over the bids received for one bid request.
//!
//! Every entry point is a pure function of its inputs: the engine reads
//! bids, an optional budget limit, criteria weights and manual overrides,
//! and never changes or stores any of them.

pub mod budget;
pub mod comparison;
pub mod config;
pub mod evaluator;
pub mod quality;
pub mod recommendation;
pub mod scoring;
pub mod statistics;
pub mod timeline;
pub mod trend;

pub use budget::BudgetCompliance;
pub use comparison::{ComparisonMetrics, ComparisonRow, ComparisonSelection, SelectOutcome, MAX_COMPARISON_BIDS};
pub use config::{EngineConfig, TieBreak};
pub use evaluator::{BidEvaluator, ComparisonReport, EvaluationReport, EvaluationRequest, SelectionEntry};
pub use quality::QualityMetrics;
pub use recommendation::{Insight, InsightKind, Recommendation, RecommendedBid};
pub use scoring::{default_criteria, BidScore, ScoreBreakdown, ScoringEngine, WeightReport};
pub use statistics::{BidStatistics, PriceBucket, PriceStatistics};
pub use timeline::{DurationExtractor, DurationUnit, KeywordDurationExtractor, TimelineDuration};
pub use trend::{TrendDirection, TrendResult};

pub use bideval_types::{Bid, BidEvalError, BidId, BidStatus, BudgetLimit, CriterionKind, ManualScoreOverrides, ScoringCriterion};
