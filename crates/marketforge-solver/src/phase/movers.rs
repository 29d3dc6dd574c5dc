//! Holders asking to relocate.

use tracing::info;

use crate::audit::PhaseId;
use crate::error::Result;
use crate::mover::MoverResolver;
use crate::phase::AllocationPhase;
use crate::scope::RunScope;

/// Runs the [`MoverResolver`] over every queued relocating holder.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovingHoldersPhase;

impl AllocationPhase for MovingHoldersPhase {
    fn solve(&mut self, scope: &mut RunScope<'_>) -> Result<()> {
        let resolver = MoverResolver::new(scope.config().iteration_limit);
        let summary = resolver.resolve(scope)?;
        info!(
            event = "movers_resolved",
            moved = summary.moved,
            traded = summary.traded,
            stayed = summary.stayed,
            rounds = summary.rounds,
        );
        Ok(())
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::MovingHolders
    }

    fn phase_type_name(&self) -> &'static str {
        "MovingHolders"
    }
}
