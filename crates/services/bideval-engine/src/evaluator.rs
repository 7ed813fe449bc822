use bideval_types::{Bid, BidEvalError, BidId, BudgetLimit, ManualScoreOverrides, ScoringCriterion};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::budget::{self, BudgetCompliance};
use crate::comparison::{self, ComparisonMetrics, ComparisonSelection, SelectOutcome};
use crate::config::EngineConfig;
use crate::quality::{self, QualityMetrics};
use crate::recommendation::{self, Recommendation, RecommendationInputs};
use crate::scoring::{self, BidScore, ScoringEngine, WeightReport};
use crate::statistics::{self, BidStatistics};
use crate::timeline::{DurationExtractor, KeywordDurationExtractor};
use crate::trend::{self, TrendResult};

/// Everything one evaluation reads. Supplied fresh on every call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub bids: Vec<Bid>,
    #[serde(default)]
    pub budget_limit: Option<BudgetLimit>,
    /// Empty means the default criteria and weights.
    #[serde(default)]
    pub criteria: Vec<ScoringCriterion>,
    #[serde(default)]
    pub overrides: ManualScoreOverrides,
}

impl EvaluationRequest {
    pub fn new(bids: Vec<Bid>) -> Self {
        Self { bids, ..Default::default() }
    }

    pub fn with_budget(mut self, budget_limit: BudgetLimit) -> Self {
        self.budget_limit = Some(budget_limit);
        self
    }

    pub fn with_criteria(mut self, criteria: Vec<ScoringCriterion>) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn with_overrides(mut self, overrides: ManualScoreOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    fn effective_criteria(&self) -> Cow<'_, [ScoringCriterion]> {
        if self.criteria.is_empty() {
            Cow::Owned(scoring::default_criteria())
        } else {
            Cow::Borrowed(&self.criteria)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub statistics: BidStatistics,
    pub quality: QualityMetrics,
    pub trend: TrendResult,
    /// Absent when the request carries no budget limit.
    pub budget_compliance: Option<BudgetCompliance>,
    pub criteria: Vec<ScoringCriterion>,
    pub weights: WeightReport,
    /// Open bids, best first.
    pub scores: Vec<BidScore>,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub bid_id: BidId,
    pub outcome: SelectOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub selected: Vec<BidId>,
    pub outcomes: Vec<SelectionEntry>,
    /// Requested ids left out because the selection was full or the bid is closed.
    pub ignored_bid_ids: Vec<BidId>,
    pub metrics: Option<ComparisonMetrics>,
}

/// Runs the full analytics, scoring and recommendation pipeline. Holds
/// configuration only; every call recomputes from its inputs.
pub struct BidEvaluator {
    config: EngineConfig,
    extractor: Box<dyn DurationExtractor>,
}

impl Default for BidEvaluator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl BidEvaluator {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_extractor(config, Box::new(KeywordDurationExtractor))
    }

    pub fn with_extractor(config: EngineConfig, extractor: Box<dyn DurationExtractor>) -> Self {
        Self { config, extractor }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn evaluate(&self, request: &EvaluationRequest) -> EvaluationReport {
        let bids = &request.bids;
        let criteria = request.effective_criteria();

        let statistics = statistics::aggregate(bids);
        let quality = quality::collect(bids);
        let trend = trend::analyze(bids);
        let budget_compliance = budget::evaluate(bids, request.budget_limit);
        let weights = scoring::weight_report(&criteria, self.config.weight_tolerance);

        let scores = ScoringEngine::new(&criteria, &request.overrides, self.extractor.as_ref(), self.config.tie_break)
            .rank(bids, request.budget_limit);

        let recommendation = recommendation::generate(&RecommendationInputs {
            bids,
            budget_limit: request.budget_limit,
            ranked: &scores,
            statistics: &statistics,
            quality: &quality,
            trend: &trend,
            compliance: budget_compliance.as_ref(),
        });

        tracing::info!(
            "Evaluated {} bids ({} scored, {} overrides); top pick: {}",
            bids.len(),
            scores.len(),
            request.overrides.len(),
            recommendation.top.as_ref().map_or("none", |t| t.bid_id.as_str())
        );

        EvaluationReport {
            statistics,
            quality,
            trend,
            budget_compliance,
            criteria: criteria.into_owned(),
            weights,
            scores,
            recommendation,
        }
    }

    /// Builds a selection from `bid_ids` in order and computes comparison
    /// metrics. Ids beyond the selection limit are reported, not rejected.
    pub fn compare(&self, request: &EvaluationRequest, bid_ids: &[BidId]) -> Result<ComparisonReport, BidEvalError> {
        let mut selection = ComparisonSelection::new();
        let mut outcomes = Vec::with_capacity(bid_ids.len());
        for id in bid_ids {
            let outcome = selection.select_id(&request.bids, id)?;
            outcomes.push(SelectionEntry { bid_id: id.clone(), outcome });
        }

        let ignored_bid_ids = outcomes
            .iter()
            .filter(|e| matches!(e.outcome, SelectOutcome::SelectionFull | SelectOutcome::NotEligible))
            .map(|e| e.bid_id.clone())
            .collect::<Vec<_>>();
        if !ignored_bid_ids.is_empty() {
            tracing::debug!("Comparison ignored bids: {:?}", ignored_bid_ids);
        }

        let metrics = comparison::compute_metrics(&selection, &request.bids, self.extractor.as_ref());

        Ok(ComparisonReport {
            selected: selection.ids().to_vec(),
            outcomes,
            ignored_bid_ids,
            metrics,
        })
    }
}
