use bideval_types::Bid;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Number of most recent valid bids compared against the earlier ones.
pub const RECENT_WINDOW: usize = 3;
/// Minimum group size on both sides before a trend is reported.
pub const MIN_GROUP_SIZE: usize = 2;

const INCREASE_FACTOR: f64 = 1.1;
const DECREASE_FACTOR: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub direction: TrendDirection,
    /// Averages are only present when both groups had enough bids.
    pub recent_average: Option<f64>,
    pub earlier_average: Option<f64>,
}

impl TrendResult {
    fn insufficient() -> Self {
        Self { direction: TrendDirection::Stable, recent_average: None, earlier_average: None }
    }

    pub fn has_data(&self) -> bool {
        self.recent_average.is_some() && self.earlier_average.is_some()
    }
}

/// Compares the average of the last three valid bids (by submission time)
/// against the average of all earlier valid bids.
pub fn analyze(bids: &[Bid]) -> TrendResult {
    let mut valid: Vec<(&Bid, f64)> = bids
        .iter()
        .filter_map(|b| b.valid_amount().map(|amount| (b, amount)))
        .collect();
    valid.sort_by_key(|(b, _)| b.submitted_at);

    let split = valid.len().saturating_sub(RECENT_WINDOW);
    let (earlier, recent) = valid.split_at(split);
    if earlier.len() < MIN_GROUP_SIZE || recent.len() < MIN_GROUP_SIZE {
        tracing::debug!(
            "Not enough valid bids for a trend (earlier={}, recent={})",
            earlier.len(),
            recent.len()
        );
        return TrendResult::insufficient();
    }

    let recent_avg = mean(recent);
    let earlier_avg = mean(earlier);
    let direction = if recent_avg > earlier_avg * INCREASE_FACTOR {
        TrendDirection::Increasing
    } else if recent_avg < earlier_avg * DECREASE_FACTOR {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    TrendResult {
        direction,
        recent_average: Some(recent_avg),
        earlier_average: Some(earlier_avg),
    }
}

fn mean(group: &[(&Bid, f64)]) -> f64 {
    group.iter().map(|(_, amount)| amount).sum::<f64>() / group.len() as f64
}
