//! Post-pass validation and reclaim.

use marketforge_core::{MerchantId, RejectionReason, StandId};
use serde::Serialize;
use tracing::{info, warn};

use crate::audit::PhaseId;
use crate::error::Result;
use crate::placement::{place, Placement, Search};
use crate::scope::RunScope;

/// Findings of the validation phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Merchants needing equipment that hold a stand without it.
    pub equipment_violations: Vec<(MerchantId, StandId)>,
    /// Merchants whose allocation was reverted, with the reason.
    pub reclaimed: Vec<(MerchantId, RejectionReason)>,
    /// Merchants placed by the corrective pass.
    pub corrective_allocations: Vec<MerchantId>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.equipment_violations.is_empty() && self.reclaimed.is_empty()
    }
}

/// Inspects the end state and reverts allocations that fall short of the
/// merchant's entitlement.
///
/// Double allocation is an invariant violation and aborts the run.
/// Equipment violations are reported but left in place. Reverted merchants
/// return to the queue with the reason they would be rejected for.
pub fn validate(scope: &mut RunScope<'_>) -> Result<ValidationReport> {
    scope.check_invariants()?;

    let mut report = ValidationReport::default();
    let mut reverts = Vec::new();
    for merchant in scope.allocated_by(|_| true) {
        let stands = scope.allocation(&merchant.id).unwrap_or_default();
        if merchant.equipment {
            for stand in stands {
                let equipped = scope.market().stand(stand).is_some_and(|s| s.equipment);
                if !equipped {
                    warn!(
                        event = "equipment_violation",
                        merchant = %merchant.id,
                        stand = %stand,
                    );
                    report
                        .equipment_violations
                        .push((merchant.id.clone(), stand.clone()));
                }
            }
        }

        let below_minimum = stands.len() < merchant.entitled_minimum();
        if !below_minimum {
            continue;
        }
        let outside_preferences = stands.iter().any(|s| !merchant.prefers(s));
        let reason = if !merchant.anywhere && outside_preferences {
            RejectionReason::PreferenceUnavailable
        } else {
            RejectionReason::MinimumUnavailable
        };
        reverts.push((merchant, reason));
    }

    if !scope.config().validation.reclaim {
        return Ok(report);
    }
    for (merchant, reason) in reverts {
        scope.release(&merchant.id)?;
        scope.set_reason(&merchant.id, reason);
        report.reclaimed.push((merchant.id.clone(), reason));
    }
    Ok(report)
}

/// One more allocation pass over everything still queued, ignoring
/// tiers and reservations.
pub fn corrective_pass(scope: &mut RunScope<'_>) -> Result<Vec<MerchantId>> {
    let previous = scope.phase();
    scope.set_phase(PhaseId::CorrectivePass);

    let mut placed = Vec::new();
    for merchant in scope.queued_by(|_| true) {
        let rules = Placement::new(Search::Preferred)
            .ignore_reserved()
            .check_capacity(!merchant.is_holder());
        if place(scope, merchant, rules)? {
            placed.push(merchant.id.clone());
        }
    }
    info!(
        event = "corrective_pass",
        placed = placed.len(),
        queued = scope.queue_len(),
    );

    scope.set_phase(previous);
    Ok(placed)
}
