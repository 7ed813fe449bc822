use bideval_types::{
    Bid, BidId, BudgetLimit, CriterionKind, ManualScoreOverrides, ScoringCriterion, MAX_CRITERION_SCORE,
};
use serde::{Deserialize, Serialize};

use crate::config::TieBreak;
use crate::timeline::{self, DurationExtractor};

/// Price score given to the only priced bid; there is nothing to compare it with.
pub const SOLE_BID_PRICE_SCORE: u8 = 5;
/// Bonus added to the price score of bids at or under the budget limit.
pub const BUDGET_BONUS: f64 = 2.0;
/// Weight total the criteria are expected to add up to.
pub const EXPECTED_WEIGHT_TOTAL: f64 = 100.0;

const PRICE_SCALE: f64 = 8.0;
const LONG_NOTES_CHARS: usize = 50;

/// Criteria used when the evaluator has not supplied any.
pub fn default_criteria() -> Vec<ScoringCriterion> {
    let criterion = |kind: CriterionKind, weight: f64, description: &str| ScoringCriterion {
        name: kind.to_string(),
        weight,
        description: description.to_string(),
    };
    vec![
        criterion(CriterionKind::PriceCompetitiveness, 30.0, "How the quoted total compares with the other bids and the budget"),
        criterion(CriterionKind::Timeline, 20.0, "Proposed project duration; shorter is better"),
        criterion(CriterionKind::Credentials, 25.0, "License, insurance, warranty and payment terms"),
        criterion(CriterionKind::Documentation, 15.0, "Uploaded documents, line items, notes and contact details"),
        criterion(CriterionKind::Communication, 10.0, "Responsiveness and clarity, scored manually"),
    ]
}

/// Whether the criterion weights add up to 100. Reported, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightReport {
    pub total: f64,
    pub balanced: bool,
}

pub fn weight_report(criteria: &[ScoringCriterion], tolerance: f64) -> WeightReport {
    let total: f64 = criteria.iter().map(|c| c.weight).sum();
    let balanced = (total - EXPECTED_WEIGHT_TOTAL).abs() <= tolerance;
    if !balanced {
        tracing::warn!("Criterion weights total {} instead of {}", total, EXPECTED_WEIGHT_TOTAL);
    }
    WeightReport { total, balanced }
}

/// Valid-amount range of the whole bid set, used to normalise price scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceContext {
    pub min: f64,
    pub max: f64,
    pub valid_count: usize,
    pub budget_limit: Option<BudgetLimit>,
}

impl PriceContext {
    pub fn from_bids(bids: &[Bid], budget_limit: Option<BudgetLimit>) -> Self {
        let (min, max, valid_count) = bids.iter().filter_map(Bid::valid_amount).fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0usize),
            |(min, max, n), amount| (min.min(amount), max.max(amount), n + 1),
        );
        if valid_count == 0 {
            return Self { min: 0.0, max: 0.0, valid_count, budget_limit };
        }
        Self { min, max, valid_count, budget_limit }
    }
}

pub fn price_score(bid: &Bid, ctx: &PriceContext) -> u8 {
    let Some(amount) = bid.valid_amount() else {
        return 0;
    };
    if ctx.valid_count <= 1 {
        return SOLE_BID_PRICE_SCORE;
    }

    let range = ctx.max - ctx.min;
    if range <= 0.0 {
        return MAX_CRITERION_SCORE;
    }

    let normalized = 1.0 - (amount - ctx.min) / range;
    let bonus = match ctx.budget_limit {
        Some(limit) if amount <= limit => BUDGET_BONUS,
        _ => 0.0,
    };
    to_score((normalized * PRICE_SCALE + bonus).round())
}

pub fn credentials_score(bid: &Bid) -> u8 {
    let mut score = 0;
    if bid.has_license() {
        score += 4;
    }
    if bid.has_insurance() {
        score += 3;
    }
    if bid.has_warranty() {
        score += 2;
    }
    if bid.has_payment_terms() {
        score += 1;
    }
    score
}

pub fn documentation_score(bid: &Bid) -> u8 {
    let mut score = 0;
    if bid.has_uploaded_file {
        score += 4;
    }
    if bid.has_line_items() {
        score += 3;
    }
    if bid.notes_len() > LONG_NOTES_CHARS {
        score += 2;
    }
    if bid.has_contact_phone() {
        score += 1;
    }
    score
}

fn to_score(raw: f64) -> u8 {
    raw.clamp(0.0, MAX_CRITERION_SCORE as f64) as u8
}

/// One criterion's contribution to a bid's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub criterion: String,
    /// Computed score; absent for criteria without an automatic scorer.
    pub automatic: Option<u8>,
    pub manual: Option<u8>,
    /// Manual score when given, otherwise the automatic one (0 if neither).
    pub score: u8,
    pub weight: f64,
    pub weighted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidScore {
    pub bid_id: BidId,
    pub company_name: String,
    pub criterion_scores: Vec<ScoreBreakdown>,
    /// Unweighted sum of final criterion scores.
    pub total_score: u32,
    pub weighted_score: f64,
    pub rank: usize,
}

impl BidScore {
    pub fn criterion_score(&self, criterion: &str) -> Option<u8> {
        self.criterion_scores.iter().find(|c| c.criterion == criterion).map(|c| c.score)
    }
}

/// Weighted multi-criteria scorer. Holds only borrowed, per-call inputs.
pub struct ScoringEngine<'a> {
    criteria: &'a [ScoringCriterion],
    overrides: &'a ManualScoreOverrides,
    extractor: &'a dyn DurationExtractor,
    tie_break: TieBreak,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(
        criteria: &'a [ScoringCriterion],
        overrides: &'a ManualScoreOverrides,
        extractor: &'a dyn DurationExtractor,
        tie_break: TieBreak,
    ) -> Self {
        Self { criteria, overrides, extractor, tie_break }
    }

    /// Automatic score for one criterion, `None` when the criterion is judged manually.
    pub fn automatic_score(&self, bid: &Bid, criterion: &ScoringCriterion, prices: &PriceContext) -> Option<u8> {
        let score = match criterion.kind()? {
            CriterionKind::PriceCompetitiveness => price_score(bid, prices),
            CriterionKind::Timeline => timeline::timeline_score(bid, self.extractor),
            CriterionKind::Credentials => credentials_score(bid),
            CriterionKind::Documentation => documentation_score(bid),
            CriterionKind::Communication => return None,
        };
        Some(score.min(MAX_CRITERION_SCORE))
    }

    pub fn score_bid(&self, bid: &Bid, prices: &PriceContext) -> BidScore {
        let criterion_scores: Vec<ScoreBreakdown> = self
            .criteria
            .iter()
            .map(|criterion| {
                let automatic = self.automatic_score(bid, criterion, prices);
                let manual = self.overrides.get(&bid.id, &criterion.name);
                let score = manual.or(automatic).unwrap_or(0);
                ScoreBreakdown {
                    criterion: criterion.name.clone(),
                    automatic,
                    manual,
                    score,
                    weight: criterion.weight,
                    weighted: score as f64 * criterion.weight / 100.0,
                }
            })
            .collect();

        let total_score: u32 = criterion_scores.iter().map(|c| c.score as u32).sum();
        let weighted_score: f64 = criterion_scores.iter().map(|c| c.weighted).sum();

        tracing::debug!(
            "Bid {} ({}): total={}, weighted={:.2}",
            bid.id, bid.company_name, total_score, weighted_score
        );

        BidScore {
            bid_id: bid.id.clone(),
            company_name: bid.company_name.clone(),
            criterion_scores,
            total_score,
            weighted_score,
            rank: 0,
        }
    }

    /// Scores every open bid and ranks them by weighted score, highest first.
    /// Price normalisation uses the valid amounts of the full bid set.
    pub fn rank(&self, bids: &[Bid], budget_limit: Option<BudgetLimit>) -> Vec<BidScore> {
        let prices = PriceContext::from_bids(bids, budget_limit);

        let mut scores: Vec<BidScore> = bids
            .iter()
            .filter(|b| b.is_eligible())
            .map(|b| self.score_bid(b, &prices))
            .collect();

        // sort_by is stable, so equal scores keep input order
        scores.sort_by(|a, b| {
            let by_score = b.weighted_score.total_cmp(&a.weighted_score);
            match self.tie_break {
                TieBreak::InputOrder => by_score,
                TieBreak::BidId => by_score.then_with(|| a.bid_id.cmp(&b.bid_id)),
            }
        });

        for (i, score) in scores.iter_mut().enumerate() {
            score.rank = i + 1;
        }
        scores
    }
}
