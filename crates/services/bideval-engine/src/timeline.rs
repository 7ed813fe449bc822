use bideval_types::Bid;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Score for a timeline that is present but could not be read.
pub const UNPARSABLE_TIMELINE_SCORE: u8 = 5;

static FIRST_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DurationUnit {
    Days,
    Weeks,
    Months,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineDuration {
    pub amount: u32,
    pub unit: DurationUnit,
}

impl TimelineDuration {
    pub fn new(amount: u32, unit: DurationUnit) -> Self {
        Self { amount, unit }
    }

    /// Maps the duration onto the 0-10 scale; shorter is better.
    pub fn score(&self) -> u8 {
        let thresholds: &[(u32, u8)] = match self.unit {
            DurationUnit::Weeks => &[(2, 10), (4, 8), (8, 6), (12, 4)],
            DurationUnit::Months => &[(1, 8), (2, 6), (3, 4)],
            DurationUnit::Days => &[(14, 10), (30, 8), (60, 6), (90, 4)],
        };
        thresholds
            .iter()
            .find(|(limit, _)| self.amount <= *limit)
            .map_or(2, |(_, score)| *score)
    }
}

/// Reads a duration out of a vendor's free-text timeline. Implementations
/// can be swapped for structured input without touching the scorer.
pub trait DurationExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Option<TimelineDuration>;
}

/// Keyword heuristic: the unit is the first of "week", "month", "day" found
/// in the text (checked in that order) and the amount is the first integer.
/// Compound durations such as "2 months 3 weeks" are not combined.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordDurationExtractor;

impl DurationExtractor for KeywordDurationExtractor {
    fn extract(&self, text: &str) -> Option<TimelineDuration> {
        let lowered = text.to_lowercase();
        let unit = if lowered.contains("week") {
            DurationUnit::Weeks
        } else if lowered.contains("month") {
            DurationUnit::Months
        } else if lowered.contains("day") {
            DurationUnit::Days
        } else {
            return None;
        };

        let amount = FIRST_INTEGER.find(&lowered)?.as_str().parse::<u32>().ok()?;
        Some(TimelineDuration::new(amount, unit))
    }
}

/// Timeline criterion score: 0 when the bid gives no timeline, a neutral
/// default when the text cannot be read.
pub fn timeline_score(bid: &Bid, extractor: &dyn DurationExtractor) -> u8 {
    let Some(text) = bid.timeline.as_deref().filter(|t| !t.trim().is_empty()) else {
        return 0;
    };

    match extractor.extract(text) {
        Some(duration) => duration.score(),
        None => {
            tracing::debug!("Bid {}: could not read timeline '{}'", bid.id, text);
            UNPARSABLE_TIMELINE_SCORE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn with_timeline(text: Option<&str>) -> Bid {
        let mut bid = Bid::new("t", "Vendor", Utc::now());
        bid.timeline = text.map(str::to_string);
        bid
    }

    #[test]
    fn extracts_unit_and_first_integer() {
        let extractor = KeywordDurationExtractor;
        assert_eq!(extractor.extract("6 weeks"), Some(TimelineDuration::new(6, DurationUnit::Weeks)));
        assert_eq!(extractor.extract("Approx. 3 Months"), Some(TimelineDuration::new(3, DurationUnit::Months)));
        assert_eq!(extractor.extract("45 business days"), Some(TimelineDuration::new(45, DurationUnit::Days)));
        assert_eq!(extractor.extract("ASAP"), None);
        assert_eq!(extractor.extract("a few weeks"), None);
    }

    #[test]
    fn first_matching_unit_wins() {
        let extractor = KeywordDurationExtractor;
        // "week" is checked before "month", and the first integer is used
        assert_eq!(
            extractor.extract("2 months 3 weeks"),
            Some(TimelineDuration::new(2, DurationUnit::Weeks))
        );
    }

    #[test]
    fn week_thresholds() {
        let scores: Vec<u8> = [1, 2, 3, 4, 8, 12, 13]
            .iter()
            .map(|w| TimelineDuration::new(*w, DurationUnit::Weeks).score())
            .collect();
        assert_eq!(scores, vec![10, 10, 8, 8, 6, 4, 2]);
    }

    #[test]
    fn month_and_day_thresholds() {
        assert_eq!(TimelineDuration::new(1, DurationUnit::Months).score(), 8);
        assert_eq!(TimelineDuration::new(3, DurationUnit::Months).score(), 4);
        assert_eq!(TimelineDuration::new(6, DurationUnit::Months).score(), 2);
        assert_eq!(TimelineDuration::new(10, DurationUnit::Days).score(), 10);
        assert_eq!(TimelineDuration::new(60, DurationUnit::Days).score(), 6);
        assert_eq!(TimelineDuration::new(120, DurationUnit::Days).score(), 2);
    }

    #[test]
    fn absent_and_unparsable_timelines() {
        let extractor = KeywordDurationExtractor;
        assert_eq!(timeline_score(&with_timeline(None), &extractor), 0);
        assert_eq!(timeline_score(&with_timeline(Some("  ")), &extractor), 0);
        assert_eq!(timeline_score(&with_timeline(Some("whenever works")), &extractor), UNPARSABLE_TIMELINE_SCORE);
        assert_eq!(timeline_score(&with_timeline(Some("2 weeks")), &extractor), 10);
    }

    struct FixedExtractor;

    impl DurationExtractor for FixedExtractor {
        fn extract(&self, _text: &str) -> Option<TimelineDuration> {
            Some(TimelineDuration::new(20, DurationUnit::Weeks))
        }
    }

    #[test]
    fn extractor_is_pluggable() {
        assert_eq!(timeline_score(&with_timeline(Some("anything")), &FixedExtractor), 2);
    }
}
