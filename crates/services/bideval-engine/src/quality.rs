use bideval_types::Bid;
use serde::{Deserialize, Serialize};

/// Completeness of submissions across every bid, valid or not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub total_bids: usize,
    pub with_documents: usize,
    pub with_license: usize,
    pub with_insurance: usize,
    pub with_timeline: usize,
    /// Percentage of the four completeness indicators present, 0 when there are no bids.
    pub quality_score: f64,
}

impl QualityMetrics {
    /// Share of bids with an uploaded file, 0 when there are no bids.
    pub fn documentation_ratio(&self) -> f64 {
        if self.total_bids == 0 {
            return 0.0;
        }
        self.with_documents as f64 / self.total_bids as f64
    }
}

pub fn collect(bids: &[Bid]) -> QualityMetrics {
    let with_documents = bids.iter().filter(|b| b.has_uploaded_file).count();
    let with_license = bids.iter().filter(|b| b.has_license()).count();
    let with_insurance = bids.iter().filter(|b| b.has_insurance()).count();
    let with_timeline = bids.iter().filter(|b| b.has_timeline()).count();

    let present = with_documents + with_license + with_insurance + with_timeline;
    let quality_score = if bids.is_empty() {
        0.0
    } else {
        present as f64 / (4 * bids.len()) as f64 * 100.0
    };

    QualityMetrics {
        total_bids: bids.len(),
        with_documents,
        with_license,
        with_insurance,
        with_timeline,
        quality_score,
    }
}
