//! Ranked applicant tiers.

use marketforge_core::{Market, Merchant, Status};

use crate::audit::{PhaseId, PriorityList, TierKind};
use crate::error::Result;
use crate::phase::AllocationPhase;
use crate::placement::{place, Placement, Search};
use crate::scope::RunScope;

/// The tier an applicant is processed in: the first of required
/// category, baking, equipment and general that applies.
pub fn tier_of(market: &Market, merchant: &Merchant) -> TierKind {
    if merchant
        .categories
        .iter()
        .any(|c| market.is_required_category(c))
    {
        TierKind::RequiredCategory
    } else if merchant.bake.is_baking() {
        TierKind::Baking
    } else if merchant.equipment {
        TierKind::Equipment
    } else {
        TierKind::General
    }
}

/// Places the applicants of one tier and list by ascending rank.
#[derive(Debug, Clone, Copy)]
pub struct TierPhase {
    tier: TierKind,
    list: PriorityList,
}

impl TierPhase {
    pub fn new(tier: TierKind, list: PriorityList) -> Self {
        Self { tier, list }
    }

    /// Every tier phase in processing order.
    pub fn all() -> Vec<TierPhase> {
        TierKind::ALL
            .iter()
            .flat_map(|&tier| [PriorityList::A, PriorityList::B].map(|list| TierPhase::new(tier, list)))
            .collect()
    }
}

/// Runs every tier again over the applicants still queued.
///
/// Decisions are recorded against each tier's own phase id; the scope's
/// phase is restored afterwards.
pub(crate) fn retry_tiers(scope: &mut RunScope<'_>) -> Result<usize> {
    let previous = scope.phase();
    let before = scope.allocated_count();
    for mut tier in TierPhase::all() {
        scope.set_phase(tier.phase_id());
        tier.solve(scope)?;
    }
    scope.set_phase(previous);
    Ok(scope.allocated_count() - before)
}

impl AllocationPhase for TierPhase {
    fn solve(&mut self, scope: &mut RunScope<'_>) -> Result<()> {
        let market = scope.market();
        let on_a_list = self.list == PriorityList::A;
        let applicants = scope.queued_by(|m| {
            m.status == Status::Soll && m.priority_list == on_a_list && tier_of(market, m) == self.tier
        });
        let rules = Placement::new(Search::Preferred).check_capacity(true);
        for merchant in applicants {
            place(scope, merchant, rules)?;
        }
        Ok(())
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::Tier(self.tier, self.list)
    }

    fn phase_type_name(&self) -> &'static str {
        "Tier"
    }
}
