use bideval_types::{Bid, BidId, BudgetLimit};
use serde::{Deserialize, Serialize};

use crate::budget::{self, BudgetCompliance};
use crate::quality::QualityMetrics;
use crate::scoring::BidScore;
use crate::statistics::BidStatistics;
use crate::trend::{TrendDirection, TrendResult};

const COMPETITIVE_SPREAD_RATIO: f64 = 0.3;
const MIN_BIDS_FOR_SPREAD_INSIGHT: usize = 3;
const BUDGET_ALERT_PERCENTAGE: f64 = 50.0;
const DOCUMENTATION_ALERT_RATIO: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedBid {
    pub bid_id: BidId,
    pub company_name: String,
    pub weighted_score: f64,
}

impl From<&BidScore> for RecommendedBid {
    fn from(score: &BidScore) -> Self {
        Self {
            bid_id: score.bid_id.clone(),
            company_name: score.company_name.clone(),
            weighted_score: score.weighted_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    CompetitiveMarket,
    VariedPricing,
    BudgetAlert,
    Documentation,
    CloseBiddingSoon,
    FavorableConsiderWaiting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
}

impl Insight {
    fn new(kind: InsightKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub top: Option<RecommendedBid>,
    /// Best-scoring bid within budget, when it is not already the top pick.
    pub budget_alternate: Option<RecommendedBid>,
    pub insights: Vec<Insight>,
}

/// Everything the generator reads; all of it produced upstream.
pub struct RecommendationInputs<'a> {
    pub bids: &'a [Bid],
    pub budget_limit: Option<BudgetLimit>,
    pub ranked: &'a [BidScore],
    pub statistics: &'a BidStatistics,
    pub quality: &'a QualityMetrics,
    pub trend: &'a TrendResult,
    pub compliance: Option<&'a BudgetCompliance>,
}

pub fn generate(inputs: &RecommendationInputs<'_>) -> Recommendation {
    let top = inputs.ranked.iter().find(|s| s.rank == 1).map(RecommendedBid::from);
    let budget_alternate = inputs
        .budget_limit
        .and_then(|limit| best_within_budget(inputs.bids, inputs.ranked, limit))
        .filter(|alternate| top.as_ref().map_or(true, |t| t.bid_id != alternate.bid_id));

    let insights = insights(inputs);
    tracing::debug!(
        "Recommendation: top={:?}, alternate={:?}, {} insights",
        top.as_ref().map(|t| &t.bid_id),
        budget_alternate.as_ref().map(|a| &a.bid_id),
        insights.len()
    );

    Recommendation { top, budget_alternate, insights }
}

fn best_within_budget(bids: &[Bid], ranked: &[BidScore], limit: BudgetLimit) -> Option<RecommendedBid> {
    // ranked is ordered best first, so the first compliant entry wins
    ranked
        .iter()
        .find(|score| {
            bids.iter()
                .find(|b| b.id == score.bid_id)
                .map_or(false, |b| budget::is_compliant(b, limit))
        })
        .map(RecommendedBid::from)
}

fn insights(inputs: &RecommendationInputs<'_>) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(stats) = inputs.statistics.summary() {
        if stats.valid_count >= MIN_BIDS_FOR_SPREAD_INSIGHT {
            let spread = stats.spread_ratio();
            if spread < COMPETITIVE_SPREAD_RATIO {
                insights.push(Insight::new(
                    InsightKind::CompetitiveMarket,
                    format!(
                        "Competitive market: bids fall within {:.0}% of the average price.",
                        spread * 100.0
                    ),
                ));
            } else {
                insights.push(Insight::new(
                    InsightKind::VariedPricing,
                    format!(
                        "Varied pricing: the spread between bids is {:.0}% of the average. Review scope differences before deciding.",
                        spread * 100.0
                    ),
                ));
            }
        }
    }

    if let Some(compliance) = inputs.compliance {
        // no priced bids means no compliance data to alert on
        if compliance.valid_count > 0 && compliance.percentage < BUDGET_ALERT_PERCENTAGE {
            insights.push(Insight::new(
                InsightKind::BudgetAlert,
                format!(
                    "Budget alert: only {:.0}% of bids are within the budget of {:.2}.",
                    compliance.percentage, compliance.budget_limit
                ),
            ));
        }
    }

    if inputs.quality.total_bids > 0 && inputs.quality.documentation_ratio() < DOCUMENTATION_ALERT_RATIO {
        insights.push(Insight::new(
            InsightKind::Documentation,
            format!(
                "Documentation: only {} of {} bids include supporting documents. Consider requesting them.",
                inputs.quality.with_documents, inputs.quality.total_bids
            ),
        ));
    }

    match inputs.trend.direction {
        TrendDirection::Increasing => insights.push(Insight::new(
            InsightKind::CloseBiddingSoon,
            "Recent bids are trending higher. Consider closing bidding soon.",
        )),
        TrendDirection::Decreasing => insights.push(Insight::new(
            InsightKind::FavorableConsiderWaiting,
            "Recent bids are trending lower. Conditions are favorable; waiting for more bids may pay off.",
        )),
        TrendDirection::Stable => {}
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TieBreak;
    use crate::scoring::ScoringEngine;
    use crate::timeline::KeywordDurationExtractor;
    use crate::{quality, statistics, trend};
    use bideval_types::{ManualScoreOverrides, ScoringCriterion};
    use chrono::Utc;

    fn priced(id: &str, amount: f64) -> Bid {
        let mut bid = Bid::new(id, format!("{} Builders", id), Utc::now());
        bid.total_amount = Some(amount);
        bid
    }

    fn recommend(bids: &[Bid], budget_limit: Option<f64>, overrides: &ManualScoreOverrides) -> Recommendation {
        let criteria = vec![
            ScoringCriterion::new("Price Competitiveness", 50.0, "").unwrap(),
            ScoringCriterion::new("Communication", 50.0, "").unwrap(),
        ];
        let ranked = ScoringEngine::new(&criteria, overrides, &KeywordDurationExtractor, TieBreak::InputOrder)
            .rank(bids, budget_limit);
        let stats = statistics::aggregate(bids);
        let quality = quality::collect(bids);
        let trend = trend::analyze(bids);
        let compliance = budget::evaluate(bids, budget_limit);
        generate(&RecommendationInputs {
            bids,
            budget_limit,
            ranked: &ranked,
            statistics: &stats,
            quality: &quality,
            trend: &trend,
            compliance: compliance.as_ref(),
        })
    }

    fn kinds(rec: &Recommendation) -> Vec<InsightKind> {
        rec.insights.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn empty_input_recommends_nothing() {
        let rec = recommend(&[], None, &ManualScoreOverrides::new());
        assert_eq!(rec, Recommendation::default());
    }

    #[test]
    fn alternate_hidden_when_top_is_within_budget() {
        let bids = vec![priced("cheap", 800.0), priced("pricey", 1000.0)];
        let rec = recommend(&bids, Some(900.0), &ManualScoreOverrides::new());
        assert_eq!(rec.top.as_ref().unwrap().bid_id, BidId::from("cheap"));
        assert!(rec.budget_alternate.is_none());
    }

    #[test]
    fn alternate_surfaces_when_top_is_over_budget() {
        let bids = vec![priced("cheap", 800.0), priced("pricey", 1000.0)];
        // cheap: 10*0.5 = 5.0; pricey: 4*0.5 + 10*0.5 = 7.0
        let overrides = ManualScoreOverrides::new()
            .with("pricey", "Price Competitiveness", 4)
            .with("pricey", "Communication", 10);
        let rec = recommend(&bids, Some(900.0), &overrides);
        assert_eq!(rec.top.as_ref().unwrap().bid_id, BidId::from("pricey"));
        let alternate = rec.budget_alternate.unwrap();
        assert_eq!(alternate.bid_id, BidId::from("cheap"));
        assert_eq!(alternate.weighted_score, 5.0);

        let rec = recommend(&bids, None, &overrides);
        assert!(rec.budget_alternate.is_none());
    }

    #[test]
    fn spread_insights_need_three_valid_bids() {
        let two = vec![priced("a", 100.0), priced("b", 500.0)];
        let rec = recommend(&two, None, &ManualScoreOverrides::new());
        assert!(!kinds(&rec).contains(&InsightKind::VariedPricing));

        let tight = vec![priced("a", 1000.0), priced("b", 1050.0), priced("c", 1100.0)];
        assert!(kinds(&recommend(&tight, None, &ManualScoreOverrides::new())).contains(&InsightKind::CompetitiveMarket));

        let wide = vec![priced("a", 500.0), priced("b", 1000.0), priced("c", 1500.0)];
        assert!(kinds(&recommend(&wide, None, &ManualScoreOverrides::new())).contains(&InsightKind::VariedPricing));
    }

    #[test]
    fn no_budget_alert_without_priced_bids() {
        let bids = vec![Bid::new("a", "Alpha", Utc::now()), Bid::new("b", "Beta", Utc::now())];
        let rec = recommend(&bids, Some(1000.0), &ManualScoreOverrides::new());
        assert_eq!(kinds(&rec), vec![InsightKind::Documentation]);
    }

    #[test]
    fn budget_and_documentation_alerts() {
        let bids = vec![priced("a", 1000.0), priced("b", 2000.0), priced("c", 3000.0)];
        let rec = recommend(&bids, Some(1500.0), &ManualScoreOverrides::new());
        let found = kinds(&rec);
        assert!(found.contains(&InsightKind::BudgetAlert));
        assert!(found.contains(&InsightKind::Documentation));

        let mut documented = bids.clone();
        for bid in &mut documented {
            bid.has_uploaded_file = true;
        }
        let rec = recommend(&documented, Some(5000.0), &ManualScoreOverrides::new());
        let found = kinds(&rec);
        assert!(!found.contains(&InsightKind::BudgetAlert));
        assert!(!found.contains(&InsightKind::Documentation));
    }
}
