//! Holders that stay on their own stands.

use crate::audit::PhaseId;
use crate::error::Result;
use crate::phase::AllocationPhase;
use crate::placement::allocate_own_stands;
use crate::scope::RunScope;

/// Allocates every non-moving holder its own stands.
///
/// Holders run in status precedence (VPL, TVPL, then EXP/EXPF/EB), each
/// group by rank. No capacity check applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedHoldersPhase;

impl AllocationPhase for FixedHoldersPhase {
    fn solve(&mut self, scope: &mut RunScope<'_>) -> Result<()> {
        for merchant in scope.queued_by(|m| m.is_holder() && !m.wants_to_move) {
            allocate_own_stands(scope, merchant)?;
        }
        Ok(())
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::NonMovingHolders
    }

    fn phase_type_name(&self) -> &'static str {
        "FixedHolders"
    }
}
