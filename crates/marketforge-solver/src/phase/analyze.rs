//! Market analysis phase.

use marketforge_core::Status;
use serde::Serialize;
use tracing::info;

use crate::audit::PhaseId;
use crate::error::Result;
use crate::phase::AllocationPhase;
use crate::scope::RunScope;

/// Supply and demand at the start of the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    /// Active stands.
    pub supply: usize,
    /// Sum of every eligible merchant's minimum.
    pub demand: usize,
    pub merchants: usize,
    pub holders: usize,
    pub applicants: usize,
}

impl MarketAnalysis {
    /// Returns true if not every merchant can get its minimum.
    pub fn is_short(&self) -> bool {
        self.demand > self.supply
    }

    /// Stands left over (positive) or missing (negative).
    pub fn surplus(&self) -> i64 {
        self.supply as i64 - self.demand as i64
    }
}

/// Computes the [`MarketAnalysis`]. Never changes the allocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeMarketPhase;

impl AllocationPhase for AnalyzeMarketPhase {
    fn solve(&mut self, scope: &mut RunScope<'_>) -> Result<()> {
        let market = scope.market();
        let analysis = MarketAnalysis {
            supply: scope.pool().len(),
            demand: market.merchants().map(|m| m.minimum).sum(),
            merchants: market.merchant_count(),
            holders: market.merchants().filter(|m| m.is_holder()).count(),
            applicants: market
                .merchants()
                .filter(|m| m.status == Status::Soll)
                .count(),
        };
        info!(
            event = "market_analysis",
            supply = analysis.supply,
            demand = analysis.demand,
            merchants = analysis.merchants,
            short = analysis.is_short(),
        );
        scope.set_analysis(analysis);
        Ok(())
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::AnalyzeMarket
    }

    fn phase_type_name(&self) -> &'static str {
        "AnalyzeMarket"
    }
}
