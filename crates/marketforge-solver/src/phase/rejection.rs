//! Final rejection.

use marketforge_core::RejectionReason;

use crate::audit::PhaseId;
use crate::error::Result;
use crate::phase::AllocationPhase;
use crate::scope::RunScope;

/// Rejects every merchant still queued, with the first reason recorded
/// for it or market full.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinalRejectionPhase;

impl AllocationPhase for FinalRejectionPhase {
    fn solve(&mut self, scope: &mut RunScope<'_>) -> Result<()> {
        for merchant in scope.queued_by(|_| true) {
            let reason = scope
                .pending_reason(&merchant.id)
                .unwrap_or(RejectionReason::MarketFull);
            scope.reject(&merchant.id, reason)?;
        }
        Ok(())
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::FinalRejection
    }

    fn phase_type_name(&self) -> &'static str {
        "FinalRejection"
    }
}
