use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};

/// Monetary ceiling owned by the bid request. Read-only to the engine.
pub type BudgetLimit = f64;

/// Identifier of a vendor bid as issued by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BidId(pub String);

impl BidId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BidId {
    fn from(s: &str) -> Self {
        BidId(s.to_string())
    }
}

impl From<String> for BidId {
    fn from(s: String) -> Self {
        BidId(s)
    }
}

/// Lifecycle state of a bid. Transitions happen outside the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BidStatus {
    #[default]
    Submitted,
    UnderReview,
    Accepted,
    Rejected,
    Withdrawn,
}

impl BidStatus {
    /// Accepted, rejected and withdrawn bids never change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BidStatus::Accepted | BidStatus::Rejected | BidStatus::Withdrawn)
    }

    /// Only open bids take part in scoring and comparison.
    pub fn is_eligible(&self) -> bool {
        !self.is_terminal()
    }
}

/// One vendor's submission against a bid request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub company_name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: Option<String>,

    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub insurance_info: Option<String>,

    /// Quoted total. Absent or non-positive amounts are excluded from price statistics.
    #[serde(default)]
    pub total_amount: Option<f64>,

    #[serde(default)]
    pub notes: Option<String>,
    /// Free-text duration such as "6 weeks" or "about 2 months".
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub warranty: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub line_items: Option<String>,

    #[serde(default)]
    pub has_uploaded_file: bool,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,

    #[serde(default)]
    pub status: BidStatus,
    pub submitted_at: DateTime<Utc>,
}

/// A text field counts as present only when it holds non-blank text.
pub(crate) fn is_present(field: &Option<String>) -> bool {
    field.as_deref().map_or(false, |s| !s.trim().is_empty())
}

impl Bid {
    /// Creates a bare submitted bid; remaining fields are filled in by the caller.
    pub fn new(id: impl Into<BidId>, company_name: impl Into<String>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            company_name: company_name.into(),
            contact_name: String::new(),
            contact_email: String::new(),
            contact_phone: None,
            license_number: None,
            insurance_info: None,
            total_amount: None,
            notes: None,
            timeline: None,
            warranty: None,
            payment_terms: None,
            line_items: None,
            has_uploaded_file: false,
            file_name: None,
            file_url: None,
            status: BidStatus::Submitted,
            submitted_at,
        }
    }

    /// The quoted amount, only when it is usable for monetary statistics.
    pub fn valid_amount(&self) -> Option<f64> {
        self.total_amount.filter(|amount| amount.is_finite() && *amount > 0.0)
    }

    pub fn is_valid(&self) -> bool {
        self.valid_amount().is_some()
    }

    pub fn is_eligible(&self) -> bool {
        self.status.is_eligible()
    }

    pub fn has_license(&self) -> bool {
        is_present(&self.license_number)
    }

    pub fn has_insurance(&self) -> bool {
        is_present(&self.insurance_info)
    }

    pub fn has_timeline(&self) -> bool {
        is_present(&self.timeline)
    }

    pub fn has_warranty(&self) -> bool {
        is_present(&self.warranty)
    }

    pub fn has_payment_terms(&self) -> bool {
        is_present(&self.payment_terms)
    }

    pub fn has_line_items(&self) -> bool {
        is_present(&self.line_items)
    }

    pub fn has_contact_phone(&self) -> bool {
        is_present(&self.contact_phone)
    }

    /// Character count of the notes field, 0 when absent.
    pub fn notes_len(&self) -> usize {
        self.notes.as_deref().map_or(0, |n| n.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_test::{assert_tokens, Token};
    use std::str::FromStr;

    fn bid(amount: Option<f64>) -> Bid {
        let mut bid = Bid::new("b1", "Acme Roofing", Utc::now());
        bid.total_amount = amount;
        bid
    }

    #[test]
    fn valid_amount_requires_positive_total() {
        assert_eq!(bid(Some(1200.0)).valid_amount(), Some(1200.0));
        assert!(!bid(Some(0.0)).is_valid());
        assert!(!bid(Some(-50.0)).is_valid());
        assert!(!bid(None).is_valid());
        assert!(!bid(Some(f64::NAN)).is_valid());
    }

    #[test]
    fn terminal_statuses_are_not_eligible() {
        assert!(BidStatus::Submitted.is_eligible());
        assert!(BidStatus::UnderReview.is_eligible());
        for status in [BidStatus::Accepted, BidStatus::Rejected, BidStatus::Withdrawn] {
            assert!(status.is_terminal());
            assert!(!status.is_eligible());
        }
    }

    #[test]
    fn blank_text_counts_as_absent() {
        let mut b = bid(None);
        b.license_number = Some("   ".to_string());
        b.insurance_info = Some("Policy 42".to_string());
        assert!(!b.has_license());
        assert!(b.has_insurance());
    }

    #[test]
    fn status_string_forms() {
        assert_tokens(
            &BidStatus::UnderReview,
            &[Token::UnitVariant { name: "BidStatus", variant: "under_review" }],
        );
        assert_eq!(BidStatus::from_str("withdrawn").unwrap(), BidStatus::Withdrawn);
        assert_eq!(BidStatus::Submitted.to_string(), "submitted");
        assert_eq!(BidStatus::default(), BidStatus::Submitted);
    }

    #[test]
    fn deserializes_minimal_bid() {
        let json = r#"{
            "id": "bid-7",
            "company_name": "Northside Builders",
            "total_amount": 15000.0,
            "submitted_at": "2024-03-01T10:00:00Z"
        }"#;
        let parsed: Bid = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, BidId::from("bid-7"));
        assert_eq!(parsed.status, BidStatus::Submitted);
        assert!(!parsed.has_uploaded_file);
        assert_eq!(parsed.valid_amount(), Some(15000.0));
    }
}
