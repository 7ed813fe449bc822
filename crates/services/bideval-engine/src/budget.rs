use bideval_types::{Bid, BudgetLimit};
use serde::{Deserialize, Serialize};

/// How the valid bids sit against the request's budget ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetCompliance {
    pub budget_limit: BudgetLimit,
    pub within_budget: usize,
    pub over_budget: usize,
    pub valid_count: usize,
    /// Share of valid bids within budget, 0 when there are no valid bids.
    pub percentage: f64,
    /// Mean of within-budget amounts; absent when no bid is within budget.
    pub compliant_average: Option<f64>,
}

/// True when the bid has a valid amount at or under the limit.
pub fn is_compliant(bid: &Bid, budget_limit: BudgetLimit) -> bool {
    bid.valid_amount().map_or(false, |amount| amount <= budget_limit)
}

/// Returns `None` without a budget limit: "no compliance data" is not the
/// same as "everything complies".
pub fn evaluate(bids: &[Bid], budget_limit: Option<BudgetLimit>) -> Option<BudgetCompliance> {
    let budget_limit = budget_limit?;

    let amounts: Vec<f64> = bids.iter().filter_map(Bid::valid_amount).collect();
    let compliant: Vec<f64> = amounts.iter().copied().filter(|a| *a <= budget_limit).collect();

    let valid_count = amounts.len();
    let within_budget = compliant.len();
    let percentage = if valid_count == 0 {
        0.0
    } else {
        within_budget as f64 / valid_count as f64 * 100.0
    };
    let compliant_average = if within_budget == 0 {
        None
    } else {
        Some(compliant.iter().sum::<f64>() / within_budget as f64)
    };

    tracing::debug!(
        "Budget {}: {}/{} valid bids within budget ({:.1}%)",
        budget_limit, within_budget, valid_count, percentage
    );

    Some(BudgetCompliance {
        budget_limit,
        within_budget,
        over_budget: valid_count - within_budget,
        valid_count,
        percentage,
        compliant_average,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn priced(id: &str, amount: Option<f64>) -> Bid {
        let mut bid = Bid::new(id, id, Utc::now());
        bid.total_amount = amount;
        bid
    }

    #[test]
    fn absent_without_budget_limit() {
        assert!(evaluate(&[priced("a", Some(10.0))], None).is_none());
    }

    #[test]
    fn classifies_three_bid_set() {
        let bids = vec![priced("A", Some(1000.0)), priced("B", Some(1200.0)), priced("C", Some(900.0))];
        let result = evaluate(&bids, Some(1100.0)).unwrap();
        assert_eq!(result.within_budget, 2);
        assert_eq!(result.over_budget, 1);
        assert_eq!(result.within_budget + result.over_budget, result.valid_count);
        assert!((result.percentage - 66.666).abs() < 0.01);
        assert_eq!(result.compliant_average, Some(950.0));
        assert!(is_compliant(&bids[0], 1100.0));
        assert!(!is_compliant(&bids[1], 1100.0));
    }

    #[test]
    fn nothing_within_budget_has_no_compliant_average() {
        let bids = vec![priced("a", Some(5000.0)), priced("b", None)];
        let result = evaluate(&bids, Some(100.0)).unwrap();
        assert_eq!(result.valid_count, 1);
        assert_eq!(result.within_budget, 0);
        assert_eq!(result.percentage, 0.0);
        assert_eq!(result.compliant_average, None);
    }

    #[test]
    fn no_valid_bids_reports_zero_percent() {
        let result = evaluate(&[priced("a", None)], Some(100.0)).unwrap();
        assert_eq!(result.valid_count, 0);
        assert_eq!(result.percentage, 0.0);
        assert!(!is_compliant(&priced("a", None), 100.0));
    }
}
