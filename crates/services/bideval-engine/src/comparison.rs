use bideval_types::{Bid, BidEvalError, BidId};
use serde::{Deserialize, Serialize};

use crate::scoring::credentials_score;
use crate::timeline::{timeline_score, DurationExtractor};

/// Most bids that can be compared side by side.
pub const MAX_COMPARISON_BIDS: usize = 3;
/// Fewest priced bids needed before comparison metrics are produced.
pub const MIN_PRICED_FOR_METRICS: usize = 2;

/// What a selection request did. Anything other than `Added`/`Removed`
/// left the selection untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectOutcome {
    Added,
    Removed,
    AlreadySelected,
    SelectionFull,
    NotEligible,
}

impl SelectOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, SelectOutcome::Added | SelectOutcome::Removed)
    }
}

/// Ordered set of at most three open bids chosen for side-by-side review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSelection {
    ids: Vec<BidId>,
}

impl ComparisonSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the bid unless it is closed, already present, or the selection is full.
    pub fn select(&mut self, bid: &Bid) -> SelectOutcome {
        if !bid.is_eligible() {
            return SelectOutcome::NotEligible;
        }
        if self.contains(&bid.id) {
            return SelectOutcome::AlreadySelected;
        }
        if self.is_full() {
            tracing::debug!("Comparison selection full; ignoring bid {}", bid.id);
            return SelectOutcome::SelectionFull;
        }
        self.ids.push(bid.id.clone());
        SelectOutcome::Added
    }

    /// Looks the id up in `bids` and selects it.
    pub fn select_id(&mut self, bids: &[Bid], id: &BidId) -> Result<SelectOutcome, BidEvalError> {
        let bid = bids
            .iter()
            .find(|b| &b.id == id)
            .ok_or_else(|| BidEvalError::UnknownBid(id.clone()))?;
        Ok(self.select(bid))
    }

    pub fn deselect(&mut self, id: &BidId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| selected != id);
        self.ids.len() != before
    }

    pub fn toggle(&mut self, bid: &Bid) -> SelectOutcome {
        if self.deselect(&bid.id) {
            SelectOutcome::Removed
        } else {
            self.select(bid)
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &BidId) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> &[BidId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ids.len() >= MAX_COMPARISON_BIDS
    }

    /// Selected bids in selection order. Ids missing from `bids` are skipped.
    pub fn resolve<'a>(&self, bids: &'a [Bid]) -> Vec<&'a Bid> {
        self.ids
            .iter()
            .filter_map(|id| bids.iter().find(|b| &b.id == id))
            .collect()
    }
}

/// One column of the side-by-side view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub bid_id: BidId,
    pub company_name: String,
    pub total_amount: Option<f64>,
    /// 1 for the cheapest priced bid; absent for bids without a valid amount.
    pub price_rank: Option<usize>,
    pub is_lowest: bool,
    pub is_highest: bool,
    pub timeline_score: u8,
    pub credentials_score: u8,
    pub best_timeline: bool,
    pub best_credentials: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetrics {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    /// Reported separately from `range` for presentation; same value.
    pub potential_savings: f64,
    pub rows: Vec<ComparisonRow>,
}

/// Price metrics and per-field markers for the selection. `None` until at
/// least two selected bids carry a valid amount.
pub fn compute_metrics(
    selection: &ComparisonSelection,
    bids: &[Bid],
    extractor: &dyn DurationExtractor,
) -> Option<ComparisonMetrics> {
    let selected = selection.resolve(bids);

    let mut priced: Vec<(usize, f64)> = selected
        .iter()
        .enumerate()
        .filter_map(|(i, b)| b.valid_amount().map(|amount| (i, amount)))
        .collect();
    if priced.len() < MIN_PRICED_FOR_METRICS {
        return None;
    }

    let amounts: Vec<f64> = priced.iter().map(|(_, a)| *a).collect();
    let min = amounts.iter().copied().fold(f64::INFINITY, f64::min);
    let max = amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let average = amounts.iter().sum::<f64>() / amounts.len() as f64;
    let range = max - min;

    priced.sort_by(|a, b| a.1.total_cmp(&b.1));
    let mut price_ranks: Vec<Option<usize>> = vec![None; selected.len()];
    for (rank, (index, _)) in priced.iter().enumerate() {
        price_ranks[*index] = Some(rank + 1);
    }

    let timeline_scores: Vec<u8> = selected.iter().map(|b| timeline_score(b, extractor)).collect();
    let credential_scores: Vec<u8> = selected.iter().map(|b| credentials_score(b)).collect();
    let best_timeline = best_of(&timeline_scores);
    let best_credentials = best_of(&credential_scores);

    let rows = selected
        .iter()
        .enumerate()
        .map(|(i, bid)| ComparisonRow {
            bid_id: bid.id.clone(),
            company_name: bid.company_name.clone(),
            total_amount: bid.valid_amount(),
            price_rank: price_ranks[i],
            is_lowest: price_ranks[i] == Some(1),
            // only reachable when every selected bid is priced
            is_highest: price_ranks[i] == Some(selected.len()),
            timeline_score: timeline_scores[i],
            credentials_score: credential_scores[i],
            best_timeline: best_timeline == Some(timeline_scores[i]),
            best_credentials: best_credentials == Some(credential_scores[i]),
        })
        .collect();

    Some(ComparisonMetrics {
        average,
        min,
        max,
        range,
        potential_savings: range,
        rows,
    })
}

/// Highest score in the group, only when someone actually scored.
fn best_of(scores: &[u8]) -> Option<u8> {
    scores.iter().copied().max().filter(|best| *best > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::KeywordDurationExtractor;
    use bideval_types::BidStatus;
    use chrono::Utc;

    fn priced(id: &str, amount: Option<f64>) -> Bid {
        let mut bid = Bid::new(id, format!("{} Remodeling", id), Utc::now());
        bid.total_amount = amount;
        bid
    }

    #[test]
    fn fourth_selection_is_ignored() {
        let bids: Vec<Bid> = ["a", "b", "c", "d"].iter().map(|id| priced(id, Some(100.0))).collect();
        let mut selection = ComparisonSelection::new();
        for bid in &bids[..3] {
            assert_eq!(selection.select(bid), SelectOutcome::Added);
        }
        let before = selection.clone();
        assert_eq!(selection.select(&bids[3]), SelectOutcome::SelectionFull);
        assert_eq!(selection, before);
        assert_eq!(selection.len(), MAX_COMPARISON_BIDS);
    }

    #[test]
    fn closed_and_duplicate_bids_are_not_added() {
        let mut accepted = priced("x", Some(10.0));
        accepted.status = BidStatus::Accepted;
        let open = priced("y", Some(20.0));

        let mut selection = ComparisonSelection::new();
        assert_eq!(selection.select(&accepted), SelectOutcome::NotEligible);
        assert_eq!(selection.select(&open), SelectOutcome::Added);
        assert_eq!(selection.select(&open), SelectOutcome::AlreadySelected);
        assert!(!SelectOutcome::AlreadySelected.changed());
        assert_eq!(selection.ids(), &[BidId::from("y")]);
    }

    #[test]
    fn toggle_and_unknown_ids() {
        let bids = vec![priced("a", Some(1.0))];
        let mut selection = ComparisonSelection::new();
        assert_eq!(selection.toggle(&bids[0]), SelectOutcome::Added);
        assert_eq!(selection.toggle(&bids[0]), SelectOutcome::Removed);
        assert!(selection.is_empty());

        let err = selection.select_id(&bids, &BidId::from("missing")).unwrap_err();
        assert_eq!(err, BidEvalError::UnknownBid(BidId::from("missing")));
        assert_eq!(selection.select_id(&bids, &BidId::from("a")), Ok(SelectOutcome::Added));
    }

    #[test]
    fn metrics_need_two_priced_bids() {
        let bids = vec![priced("a", Some(500.0)), priced("b", None)];
        let mut selection = ComparisonSelection::new();
        selection.select(&bids[0]);
        selection.select(&bids[1]);
        assert!(compute_metrics(&selection, &bids, &KeywordDurationExtractor).is_none());
    }

    #[test]
    fn ranks_prices_within_selection() {
        let bids = vec![priced("mid", Some(1100.0)), priced("none", None), priced("low", Some(900.0))];
        let mut selection = ComparisonSelection::new();
        for bid in &bids {
            selection.select(bid);
        }

        let metrics = compute_metrics(&selection, &bids, &KeywordDurationExtractor).unwrap();
        assert_eq!(metrics.min, 900.0);
        assert_eq!(metrics.max, 1100.0);
        assert_eq!(metrics.average, 1000.0);
        assert_eq!(metrics.range, 200.0);
        assert_eq!(metrics.potential_savings, metrics.range);

        // rank 2 of a three-bid selection is not the highest
        let mid = &metrics.rows[0];
        assert_eq!(mid.price_rank, Some(2));
        assert!(!mid.is_highest && !mid.is_lowest);

        let none = &metrics.rows[1];
        assert_eq!(none.price_rank, None);
        assert!(!none.is_highest && !none.is_lowest);

        let low = &metrics.rows[2];
        assert_eq!(low.price_rank, Some(1));
        assert!(low.is_lowest);
    }

    #[test]
    fn highest_marker_when_every_bid_is_priced() {
        let bids = vec![priced("a", Some(1000.0)), priced("b", Some(1200.0)), priced("c", Some(900.0))];
        let mut selection = ComparisonSelection::new();
        for bid in &bids {
            selection.select(bid);
        }

        let metrics = compute_metrics(&selection, &bids, &KeywordDurationExtractor).unwrap();
        let flags: Vec<(bool, bool)> = metrics.rows.iter().map(|r| (r.is_lowest, r.is_highest)).collect();
        assert_eq!(flags, vec![(false, false), (false, true), (true, false)]);
    }

    #[test]
    fn marks_best_timeline_and_credentials() {
        let mut fast = priced("fast", Some(100.0));
        fast.timeline = Some("2 weeks".into());
        let mut licensed = priced("licensed", Some(120.0));
        licensed.timeline = Some("10 weeks".into());
        licensed.license_number = Some("LIC-9".into());
        let bids = vec![fast, licensed];

        let mut selection = ComparisonSelection::new();
        selection.select(&bids[0]);
        selection.select(&bids[1]);
        let metrics = compute_metrics(&selection, &bids, &KeywordDurationExtractor).unwrap();

        assert!(metrics.rows[0].best_timeline);
        assert!(!metrics.rows[0].best_credentials);
        assert!(!metrics.rows[1].best_timeline);
        assert!(metrics.rows[1].best_credentials);
    }
}
