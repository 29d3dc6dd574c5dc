//! Phase identifiers and the audit log.
//!
//! The log records which phase produced every allocation, expansion,
//! release and rejection. It is read-only after a run and has no influence
//! on the allocation itself.

use std::fmt;

use marketforge_core::{MerchantId, RejectionReason, StandId};
use serde::Serialize;

/// Applicant tier, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    RequiredCategory,
    Baking,
    Equipment,
    General,
}

impl TierKind {
    pub const ALL: [TierKind; 4] = [
        TierKind::RequiredCategory,
        TierKind::Baking,
        TierKind::Equipment,
        TierKind::General,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TierKind::RequiredCategory => "required-category",
            TierKind::Baking => "baking",
            TierKind::Equipment => "equipment",
            TierKind::General => "general",
        }
    }
}

/// Applicant list: priority ("A") or general ("B").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PriorityList {
    A,
    B,
}

/// Merchant group grown by an expansion phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionGroup {
    /// Holders and other merchants with a fixed entitlement.
    Entitled,
    /// Applicants of one tier.
    Applicants(TierKind),
}

/// Identity of an allocation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseId {
    AnalyzeMarket,
    NonMovingHolders,
    MovingHolders,
    TemporaryHolders,
    ExperimentalWithoutStand,
    ReserveExpansion,
    Tier(TierKind, PriorityList),
    Expansion(ExpansionGroup),
    Validation,
    CorrectivePass,
    FinalRejection,
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseId::AnalyzeMarket => f.write_str("analyze-market"),
            PhaseId::NonMovingHolders => f.write_str("non-moving-holders"),
            PhaseId::MovingHolders => f.write_str("moving-holders"),
            PhaseId::TemporaryHolders => f.write_str("temporary-holders"),
            PhaseId::ExperimentalWithoutStand => f.write_str("experimental-without-stand"),
            PhaseId::ReserveExpansion => f.write_str("reserve-expansion"),
            PhaseId::Tier(tier, list) => write!(f, "tier-{}-{:?}", tier.name(), list),
            PhaseId::Expansion(ExpansionGroup::Entitled) => f.write_str("expansion-entitled"),
            PhaseId::Expansion(ExpansionGroup::Applicants(tier)) => {
                write!(f, "expansion-{}", tier.name())
            }
            PhaseId::Validation => f.write_str("validation"),
            PhaseId::CorrectivePass => f.write_str("corrective-pass"),
            PhaseId::FinalRejection => f.write_str("final-rejection"),
        }
    }
}

/// What happened to a merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Allocated,
    Expanded,
    /// Stands returned to the pool by reclaim.
    Released,
    /// Stands held back for a later expansion.
    Reserved,
    Rejected(RejectionReason),
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub sequence: usize,
    pub phase: PhaseId,
    pub merchant: MerchantId,
    pub stands: Vec<StandId>,
    pub action: AuditAction,
}

/// Append-only record of engine decisions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        phase: PhaseId,
        merchant: &MerchantId,
        stands: &[StandId],
        action: AuditAction,
    ) {
        let sequence = self.entries.len();
        self.entries.push(AuditEntry {
            sequence,
            phase,
            merchant: merchant.clone(),
            stands: stands.to_vec(),
            action,
        });
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Allocations and expansions committed during `phase`.
    ///
    /// Entries whose stands were later released are still listed.
    pub fn allocated_in(&self, phase: PhaseId) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter().filter(move |e| {
            e.phase == phase && matches!(e.action, AuditAction::Allocated | AuditAction::Expanded)
        })
    }

    /// Every entry concerning the merchant, in order.
    pub fn history_of<'a>(
        &'a self,
        merchant: &'a MerchantId,
    ) -> impl Iterator<Item = &'a AuditEntry> + 'a {
        self.entries.iter().filter(move |e| &e.merchant == merchant)
    }

    /// Every entry that touched the stand, in order.
    pub fn history_of_stand<'a>(
        &'a self,
        stand: &'a StandId,
    ) -> impl Iterator<Item = &'a AuditEntry> + 'a {
        self.entries.iter().filter(move |e| e.stands.contains(stand))
    }

    /// Phases that produced at least one entry, in first-seen order.
    pub fn phases(&self) -> Vec<PhaseId> {
        let mut seen = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.phase) {
                seen.push(entry.phase);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stands(ids: &[&str]) -> Vec<StandId> {
        ids.iter().map(|s| StandId::from(*s)).collect()
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(PhaseId::MovingHolders.to_string(), "moving-holders");
        assert_eq!(
            PhaseId::Tier(TierKind::Baking, PriorityList::A).to_string(),
            "tier-baking-A"
        );
        assert_eq!(
            PhaseId::Expansion(ExpansionGroup::Applicants(TierKind::General)).to_string(),
            "expansion-general"
        );
    }

    #[test]
    fn test_queries() {
        let mut log = AuditLog::new();
        let a = MerchantId::from("a");
        let b = MerchantId::from("b");
        log.record(PhaseId::NonMovingHolders, &a, &stands(&["1"]), AuditAction::Allocated);
        log.record(
            PhaseId::Tier(TierKind::General, PriorityList::B),
            &b,
            &stands(&["2"]),
            AuditAction::Allocated,
        );
        log.record(
            PhaseId::Expansion(ExpansionGroup::Entitled),
            &a,
            &stands(&["2"]),
            AuditAction::Reserved,
        );
        log.record(
            PhaseId::Validation,
            &b,
            &stands(&["2"]),
            AuditAction::Released,
        );

        assert_eq!(log.allocated_in(PhaseId::NonMovingHolders).count(), 1);
        assert_eq!(log.allocated_in(PhaseId::Validation).count(), 0);
        assert_eq!(log.history_of(&b).count(), 2);
        assert_eq!(log.history_of_stand(&StandId::from("2")).count(), 3);
        assert_eq!(log.phases().len(), 4);
        assert_eq!(log.entries()[3].sequence, 3);
    }
}
