//! Output records produced by an allocation run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::{MerchantId, StandId};
use crate::merchant::Merchant;

/// Business reason a merchant did not receive stands.
///
/// Rejections are expected outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    MarketFull,
    MinimumUnavailable,
    PreferenceUnavailable,
    CategoryFull,
    FixedStandUnavailable,
}

impl RejectionReason {
    /// Numeric reason code used by the administration.
    pub fn code(self) -> u8 {
        match self {
            RejectionReason::MarketFull => 1,
            RejectionReason::CategoryFull => 2,
            RejectionReason::MinimumUnavailable => 3,
            RejectionReason::PreferenceUnavailable => 4,
            RejectionReason::FixedStandUnavailable => 5,
        }
    }

    /// Human-readable explanation sent along with the rejection.
    pub fn message(self) -> &'static str {
        match self {
            RejectionReason::MarketFull => "market is full",
            RejectionReason::CategoryFull => "all stands for this trade category are taken",
            RejectionReason::MinimumUnavailable => "minimum number of stands is not available",
            RejectionReason::PreferenceUnavailable => "preferred stands are not available",
            RejectionReason::FixedStandUnavailable => "fixed stand is not available",
        }
    }
}

/// A merchant's stands for the market day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRecord {
    pub merchant_id: MerchantId,
    pub market_id: String,
    pub market_date: NaiveDate,
    pub stands: Vec<StandId>,
    pub merchant: Merchant,
}

/// A merchant that was turned away, with the reason why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionRecord {
    pub merchant_id: MerchantId,
    pub market_id: String,
    pub market_date: NaiveDate,
    pub reason: RejectionReason,
    pub reason_code: u8,
    pub reason_message: String,
    pub merchant: Merchant,
}

impl RejectionRecord {
    /// Builds a rejection record from a merchant snapshot.
    pub fn new(
        merchant: &Merchant,
        market_id: impl Into<String>,
        market_date: NaiveDate,
        reason: RejectionReason,
    ) -> Self {
        Self {
            merchant_id: merchant.id.clone(),
            market_id: market_id.into(),
            market_date,
            reason,
            reason_code: reason.code(),
            reason_message: reason.message().to_string(),
            merchant: merchant.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merchant::Status;

    #[test]
    fn test_rejection_record_carries_reason_details() {
        let merchant = Merchant::new("m1", 4, Status::Soll);
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let record =
            RejectionRecord::new(&merchant, "noordermarkt", date, RejectionReason::CategoryFull);

        assert_eq!(record.reason_code, 2);
        assert_eq!(record.reason_message, "all stands for this trade category are taken");
        assert_eq!(record.merchant_id, MerchantId::from("m1"));
    }

    #[test]
    fn test_reason_codes_are_distinct() {
        let reasons = [
            RejectionReason::MarketFull,
            RejectionReason::MinimumUnavailable,
            RejectionReason::PreferenceUnavailable,
            RejectionReason::CategoryFull,
            RejectionReason::FixedStandUnavailable,
        ];
        let mut codes: Vec<u8> = reasons.iter().map(|r| r.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), reasons.len());
    }
}
