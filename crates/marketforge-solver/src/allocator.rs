//! The allocation run: phases in legal priority order.

use std::time::Instant;

use marketforge_config::EngineConfig;
use marketforge_core::Market;
use tracing::info;

use crate::audit::{ExpansionGroup, TierKind};
use crate::error::Result;
use crate::outcome::AllocationOutcome;
use crate::phase::{
    AllocationPhase, AnalyzeMarketPhase, ExpansionPhase, FinalRejectionPhase, FixedHoldersPhase,
    MovingHoldersPhase, ReserveExpansionPhase, StandlessEntitledPhase, TemporaryHoldersPhase,
    TierPhase, ValidationPhase,
};
use crate::scope::RunScope;

/// Allocates stands for one market day.
///
/// # Example
///
/// ```
/// use marketforge_config::EngineConfig;
/// use marketforge_solver::MarketAllocator;
/// use marketforge_test::{MarketBuilder, MerchantFixture};
///
/// let market = MarketBuilder::new("noordermarkt")
///     .row(&["1", "2", "3"])
///     .merchant(MerchantFixture::vpl("holder", 1, &["1"]))
///     .merchant(MerchantFixture::soll("applicant", 12).prefer(&["2"]))
///     .market();
///
/// let outcome = MarketAllocator::new(EngineConfig::default())
///     .allocate(&market)
///     .unwrap();
/// assert_eq!(outcome.allocations.len(), 2);
/// assert!(outcome.rejections.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarketAllocator {
    config: EngineConfig,
}

impl MarketAllocator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The phases of a run, in execution order.
    pub fn phases(&self) -> Vec<Box<dyn AllocationPhase>> {
        let mut phases: Vec<Box<dyn AllocationPhase>> = vec![
            Box::new(AnalyzeMarketPhase),
            Box::new(FixedHoldersPhase),
            Box::new(MovingHoldersPhase),
            Box::new(TemporaryHoldersPhase),
            Box::new(StandlessEntitledPhase),
            Box::new(ReserveExpansionPhase),
        ];
        for tier in TierPhase::all() {
            phases.push(Box::new(tier));
        }
        phases.push(Box::new(ExpansionPhase::new(ExpansionGroup::Entitled)));
        for tier in TierKind::ALL {
            phases.push(Box::new(ExpansionPhase::new(ExpansionGroup::Applicants(tier))));
        }
        phases.push(Box::new(ValidationPhase));
        phases.push(Box::new(FinalRejectionPhase));
        phases
    }

    /// Runs every phase and returns the outcome.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocationError`](crate::AllocationError) on any
    /// invariant violation. A failed run has no partial result.
    pub fn allocate(&self, market: &Market) -> Result<AllocationOutcome> {
        let started = Instant::now();
        let mut scope = RunScope::new(market, &self.config);

        info!(
            event = "run_start",
            market = %market.id,
            date = %market.date,
            merchants = market.merchant_count(),
            stands = scope.pool().len(),
        );

        for (phase_index, mut phase) in self.phases().into_iter().enumerate() {
            let phase_started = Instant::now();
            scope.set_phase(phase.phase_id());
            info!(
                event = "phase_start",
                phase = %phase.phase_id(),
                phase_type = phase.phase_type_name(),
                phase_index,
                queued = scope.queue_len(),
                available = scope.pool().len(),
            );

            phase.solve(&mut scope)?;
            if self.config.asserts_every_phase() {
                scope.check_invariants()?;
            }

            info!(
                event = "phase_end",
                phase = %phase.phase_id(),
                phase_index,
                duration_ms = phase_started.elapsed().as_millis() as u64,
                queued = scope.queue_len(),
                available = scope.pool().len(),
                allocated = scope.allocated_count(),
            );
        }

        scope.check_complete()?;
        let outcome = scope.into_outcome();
        info!(
            event = "run_end",
            market = %outcome.market_id,
            duration_ms = started.elapsed().as_millis() as u64,
            allocated = outcome.allocations.len(),
            rejected = outcome.rejections.len(),
            stands = outcome.allocated_stand_count(),
        );
        Ok(outcome)
    }
}
