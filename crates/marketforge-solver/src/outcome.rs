//! Result of an allocation run.

use chrono::NaiveDate;
use marketforge_core::{AllocationRecord, MerchantId, RejectionReason, RejectionRecord, StandId};
use serde::Serialize;

use crate::audit::AuditLog;
use crate::phase::analyze::MarketAnalysis;
use crate::validation::ValidationReport;

/// Everything an allocation run produced.
///
/// Records are sorted by merchant id and stands by layout position, so
/// identical input always serialises to identical output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationOutcome {
    pub market_id: String,
    pub market_date: NaiveDate,
    pub allocations: Vec<AllocationRecord>,
    pub rejections: Vec<RejectionRecord>,
    pub analysis: MarketAnalysis,
    pub validation: ValidationReport,
    pub audit: AuditLog,
}

impl AllocationOutcome {
    pub fn allocation_of(&self, merchant: &MerchantId) -> Option<&AllocationRecord> {
        self.allocations.iter().find(|a| &a.merchant_id == merchant)
    }

    pub fn rejection_of(&self, merchant: &MerchantId) -> Option<&RejectionRecord> {
        self.rejections.iter().find(|r| &r.merchant_id == merchant)
    }

    /// Stands assigned to the merchant, empty if it was rejected.
    pub fn stands_of(&self, merchant: &MerchantId) -> &[StandId] {
        self.allocation_of(merchant)
            .map(|a| a.stands.as_slice())
            .unwrap_or_default()
    }

    pub fn reason_of(&self, merchant: &MerchantId) -> Option<RejectionReason> {
        self.rejection_of(merchant).map(|r| r.reason)
    }

    /// Who holds the stand, if anybody.
    pub fn holder_of(&self, stand: &StandId) -> Option<&MerchantId> {
        self.allocations
            .iter()
            .find(|a| a.stands.contains(stand))
            .map(|a| &a.merchant_id)
    }

    pub fn allocated_stand_count(&self) -> usize {
        self.allocations.iter().map(|a| a.stands.len()).sum()
    }
}
