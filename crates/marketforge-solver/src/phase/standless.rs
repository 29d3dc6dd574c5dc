//! Entitled merchants without a stand of their own.

use marketforge_core::Status;

use crate::audit::PhaseId;
use crate::error::Result;
use crate::phase::AllocationPhase;
use crate::placement::{place, Placement, Search};
use crate::scope::RunScope;

/// Temporary holders without a stand (TVPLZ), placed anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporaryHoldersPhase;

impl AllocationPhase for TemporaryHoldersPhase {
    fn solve(&mut self, scope: &mut RunScope<'_>) -> Result<()> {
        let rules = Placement::new(Search::Anywhere).check_capacity(true);
        for merchant in scope.queued_by(|m| m.status == Status::Tvplz) {
            place(scope, merchant, rules)?;
        }
        Ok(())
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::TemporaryHolders
    }

    fn phase_type_name(&self) -> &'static str {
        "TemporaryHolders"
    }
}

/// Experimental sellers and other entitled merchants that own no stand,
/// placed on their preferences only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandlessEntitledPhase;

impl AllocationPhase for StandlessEntitledPhase {
    fn solve(&mut self, scope: &mut RunScope<'_>) -> Result<()> {
        let rules = Placement::new(Search::PreferencesOnly).check_capacity(true);
        for merchant in scope.queued_by(|m| m.status.has_fixed_entitlement() && m.owned.is_empty()) {
            place(scope, merchant, rules)?;
        }
        Ok(())
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::ExperimentalWithoutStand
    }

    fn phase_type_name(&self) -> &'static str {
        "StandlessEntitled"
    }
}
