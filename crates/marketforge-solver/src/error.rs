//! Error types for the allocation engine.
//!
//! Only invariant violations are errors. Merchants that cannot be placed
//! are rejections, recorded in the outcome, and never abort a run.

use marketforge_core::{MerchantId, StandId};
use thiserror::Error;

use crate::audit::PhaseId;

/// An invariant violation that aborts the run.
///
/// These indicate a logic or data-corruption defect; a run that returns
/// one must be treated as failed, never as a partial result.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// A stand expected in the available pool was missing.
    #[error("stand {stand} is not available for {merchant} during {phase}")]
    StandNotAvailable {
        merchant: MerchantId,
        stand: StandId,
        phase: PhaseId,
    },

    /// A merchant expected in the queue (or allocation table) was missing.
    #[error("merchant {merchant} is not in the expected state during {phase}")]
    MerchantNotQueued { merchant: MerchantId, phase: PhaseId },

    /// A merchant unknown to the market was referenced.
    #[error("unknown merchant {merchant} during {phase}")]
    UnknownMerchant { merchant: MerchantId, phase: PhaseId },

    /// A stand ended up in more than one allocation.
    #[error("stand {stand} is allocated to {merchants:?}")]
    DoubleAllocation {
        stand: StandId,
        merchants: Vec<MerchantId>,
    },

    /// A merchant was both allocated and rejected, or neither.
    #[error("merchant {merchant} has an inconsistent disposition")]
    DoubleDisposition { merchant: MerchantId },

    /// A fixed-point loop hit its safety ceiling.
    #[error("{loop_name} did not converge within {iterations} iterations")]
    NoConvergence {
        loop_name: &'static str,
        iterations: usize,
    },
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, AllocationError>;
