use bideval_types::Bid;
use serde::{Deserialize, Serialize};

/// Number of equal-width buckets in the price histogram.
pub const DISTRIBUTION_BUCKETS: usize = 5;

/// One bar of the price histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Descriptive statistics over valid bid amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStatistics {
    pub average: f64,
    /// Element at index n/2 of the ascending amounts. For an even count this
    /// is the upper of the two middle values.
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub valid_count: usize,
    pub total_count: usize,
    pub buckets: [PriceBucket; DISTRIBUTION_BUCKETS],
}

impl PriceStatistics {
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Range relative to the average; 0 when the average is 0.
    pub fn spread_ratio(&self) -> f64 {
        if self.average > 0.0 {
            self.range() / self.average
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BidStatistics {
    /// No bid carries a usable amount.
    NoData { total_count: usize },
    Available(PriceStatistics),
}

impl BidStatistics {
    pub fn summary(&self) -> Option<&PriceStatistics> {
        match self {
            BidStatistics::NoData { .. } => None,
            BidStatistics::Available(stats) => Some(stats),
        }
    }
}

pub fn aggregate(bids: &[Bid]) -> BidStatistics {
    let mut amounts: Vec<f64> = bids.iter().filter_map(Bid::valid_amount).collect();
    if amounts.is_empty() {
        return BidStatistics::NoData { total_count: bids.len() };
    }

    amounts.sort_by(f64::total_cmp);
    let n = amounts.len();
    let min = amounts[0];
    let max = amounts[n - 1];
    let average = amounts.iter().sum::<f64>() / n as f64;
    let median = amounts[n / 2];

    let stats = PriceStatistics {
        average,
        median,
        min,
        max,
        valid_count: n,
        total_count: bids.len(),
        buckets: distribution(&amounts, min, max),
    };

    tracing::debug!(
        "Aggregated {} valid of {} bids: min={}, max={}, avg={:.2}, median={}",
        n, stats.total_count, min, max, average, median
    );

    BidStatistics::Available(stats)
}

fn distribution(amounts: &[f64], min: f64, max: f64) -> [PriceBucket; DISTRIBUTION_BUCKETS] {
    let bucket_size = (max - min) / DISTRIBUTION_BUCKETS as f64;

    let mut buckets = [PriceBucket { lower: min, upper: min, count: 0 }; DISTRIBUTION_BUCKETS];
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.lower = min + bucket_size * i as f64;
        bucket.upper = if i == DISTRIBUTION_BUCKETS - 1 { max } else { min + bucket_size * (i + 1) as f64 };
    }

    for &amount in amounts {
        buckets[bucket_index(amount, min, bucket_size)].count += 1;
    }
    buckets
}

/// Bucket for `amount`; the top edge (amount == max) lands in the last bucket.
fn bucket_index(amount: f64, min: f64, bucket_size: f64) -> usize {
    if bucket_size <= 0.0 {
        return 0;
    }
    let index = ((amount - min) / bucket_size).floor() as usize;
    index.min(DISTRIBUTION_BUCKETS - 1)
}
