//! Validation and reclaim phase.

use tracing::info;

use crate::audit::PhaseId;
use crate::error::Result;
use crate::phase::AllocationPhase;
use crate::scope::RunScope;
use crate::validation::{corrective_pass, validate};

/// Runs [`validate`] and, if anything was reverted, one corrective pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationPhase;

impl AllocationPhase for ValidationPhase {
    fn solve(&mut self, scope: &mut RunScope<'_>) -> Result<()> {
        let mut report = validate(scope)?;
        if !report.reclaimed.is_empty() && scope.config().validation.corrective_pass {
            report.corrective_allocations = corrective_pass(scope)?;
        }
        info!(
            event = "validation",
            equipment_violations = report.equipment_violations.len(),
            reclaimed = report.reclaimed.len(),
            corrected = report.corrective_allocations.len(),
        );
        *scope.validation_mut() = report;
        Ok(())
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::Validation
    }

    fn phase_type_name(&self) -> &'static str {
        "Validation"
    }
}
