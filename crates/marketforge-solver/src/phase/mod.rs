//! Allocation phases.
//!
//! Phases run in a fixed order that encodes legal priority:
//! - [`AnalyzeMarketPhase`]: supply and demand signal, informational only
//! - [`FixedHoldersPhase`]: holders keep their own stands
//! - [`MovingHoldersPhase`]: holders asking to relocate
//! - [`TemporaryHoldersPhase`] and [`StandlessEntitledPhase`]
//! - [`ReserveExpansionPhase`]: holders claim their expansion stands
//! - [`TierPhase`]: ranked applicants, one tier and list at a time
//! - [`ExpansionPhase`]: allocated merchants grow toward their maximum
//! - [`ValidationPhase`]: reclaim and corrective pass
//! - [`FinalRejectionPhase`]: everyone left over is turned away

pub mod analyze;
pub mod expansion;
pub mod holders;
pub mod movers;
pub mod rejection;
pub mod reservation;
pub mod standless;
pub mod tier;
pub mod validation;

use std::fmt::Debug;

use crate::audit::PhaseId;
use crate::error::Result;
use crate::scope::RunScope;

pub use analyze::{AnalyzeMarketPhase, MarketAnalysis};
pub use expansion::ExpansionPhase;
pub use holders::FixedHoldersPhase;
pub use movers::MovingHoldersPhase;
pub use rejection::FinalRejectionPhase;
pub use reservation::ReserveExpansionPhase;
pub use standless::{StandlessEntitledPhase, TemporaryHoldersPhase};
pub use tier::{tier_of, TierPhase};
pub use validation::ValidationPhase;

/// A phase of the allocation run.
///
/// Phases are executed in sequence by the allocator. Each phase reads and
/// mutates the shared [`RunScope`]; later phases depend on the exact state
/// earlier ones leave behind.
pub trait AllocationPhase: Debug {
    /// Executes this phase.
    ///
    /// # Errors
    ///
    /// Returns an error only for invariant violations. Merchants that
    /// cannot be placed are left queued with a pending reason.
    fn solve(&mut self, scope: &mut RunScope<'_>) -> Result<()>;

    /// Identity recorded against every decision this phase makes.
    fn phase_id(&self) -> PhaseId;

    /// Returns the name of this phase type.
    fn phase_type_name(&self) -> &'static str;
}
