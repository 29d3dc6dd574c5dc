//! Expansion reservations for entitled merchants.

use marketforge_core::Status;
use tracing::debug;

use crate::audit::PhaseId;
use crate::error::Result;
use crate::phase::expansion::growth_query;
use crate::phase::AllocationPhase;
use crate::scope::RunScope;

/// Holds back the stands entitled merchants will grow into, so that
/// applicants placed before the expansion rounds cannot take them.
///
/// Each merchant reserves the largest expansion it can get, in priority
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReserveExpansionPhase;

impl AllocationPhase for ReserveExpansionPhase {
    fn solve(&mut self, scope: &mut RunScope<'_>) -> Result<()> {
        let expansion = &scope.config().expansion;
        if !expansion.enabled || !expansion.reserve_for_holders {
            return Ok(());
        }

        for merchant in scope.allocated_by(|m| m.status != Status::Soll) {
            let current = scope.allocation(&merchant.id).unwrap_or_default().to_vec();
            if current.len() >= merchant.maximum {
                continue;
            }
            let cluster = {
                let finder = scope.finder();
                (current.len() + 1..=merchant.maximum)
                    .rev()
                    .find_map(|size| finder.best_expansion(&growth_query(merchant, size), &current))
            };
            let Some(cluster) = cluster else {
                continue;
            };
            let extra: Vec<_> = cluster.into_iter().filter(|s| !current.contains(s)).collect();
            let reserved = scope.reserve(&merchant.id, &extra);
            debug!(event = "reservation", merchant = %merchant.id, reserved);
        }
        Ok(())
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::ReserveExpansion
    }

    fn phase_type_name(&self) -> &'static str {
        "ReserveExpansion"
    }
}
