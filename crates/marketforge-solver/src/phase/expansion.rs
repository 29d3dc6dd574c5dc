//! Expansion rounds.

use marketforge_core::{Merchant, Status};
use tracing::debug;

use crate::audit::{ExpansionGroup, PhaseId};
use crate::cluster::{ClusterQuery, MatchMode};
use crate::error::Result;
use crate::fixed_point::FixedPoint;
use crate::phase::tier::{retry_tiers, tier_of};
use crate::phase::AllocationPhase;
use crate::scope::RunScope;

/// Query growing a merchant's allocation to `size` stands.
///
/// New stands must be preferred unless the merchant accepts any stand.
pub(crate) fn growth_query(merchant: &Merchant, size: usize) -> ClusterQuery<'_> {
    let mode = if merchant.anywhere {
        MatchMode::Anywhere
    } else {
        MatchMode::All
    };
    ClusterQuery::new(merchant, size)
        .candidates(&merchant.preferences)
        .mode(mode)
}

/// Grows allocated merchants of one group one stand at a time, round
/// robin in priority order, until a round leaves the pool unchanged.
///
/// The entitled group also releases every remaining reservation when it
/// is done and gives the queued applicants another pass over the tiers,
/// so a released stand can still go to an applicant who wanted it.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionPhase {
    group: ExpansionGroup,
}

impl ExpansionPhase {
    pub fn new(group: ExpansionGroup) -> Self {
        Self { group }
    }

    pub fn group(&self) -> ExpansionGroup {
        self.group
    }

    fn includes(&self, scope: &RunScope<'_>, merchant: &Merchant) -> bool {
        match self.group {
            ExpansionGroup::Entitled => merchant.status != Status::Soll,
            ExpansionGroup::Applicants(tier) => {
                merchant.status == Status::Soll && tier_of(scope.market(), merchant) == tier
            }
        }
    }

    /// Adds one stand to the merchant if possible.
    fn grow(&self, scope: &mut RunScope<'_>, merchant: &Merchant) -> Result<bool> {
        let current = scope.allocation(&merchant.id).unwrap_or_default().to_vec();
        if current.len() >= merchant.maximum {
            return Ok(false);
        }
        if !merchant.is_holder() && !scope.guard().allocation_allowed(&merchant.categories, 1) {
            return Ok(false);
        }
        let query = growth_query(merchant, current.len() + 1);
        let Some(cluster) = scope.finder_for(&merchant.id).best_expansion(&query, &current) else {
            return Ok(false);
        };
        let added = cluster.into_iter().filter(|s| !current.contains(s)).collect();
        scope.expand(&merchant.id, added)?;
        Ok(true)
    }
}

impl AllocationPhase for ExpansionPhase {
    fn solve(&mut self, scope: &mut RunScope<'_>) -> Result<()> {
        if scope.config().expansion.enabled {
            let members = scope.allocated_by(|m| self.includes(scope, m));
            let mut fixed_point = FixedPoint::new("expansion", scope.config().iteration_limit);
            while !fixed_point.converged(scope.pool().len())? {
                for merchant in &members {
                    self.grow(scope, merchant)?;
                }
            }
            debug!(
                event = "expansion_done",
                group = %self.phase_id(),
                members = members.len(),
                rounds = fixed_point.iterations(),
            );
        }
        if self.group == ExpansionGroup::Entitled {
            let released = scope.release_reservations();
            debug!(event = "reservations_released", count = released);
            if released > 0 {
                let placed = retry_tiers(scope)?;
                debug!(event = "tiers_retried", released, placed);
            }
        }
        Ok(())
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::Expansion(self.group)
    }

    fn phase_type_name(&self) -> &'static str {
        "Expansion"
    }
}
