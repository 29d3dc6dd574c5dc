//! Error types for market snapshots

use thiserror::Error;

use crate::id::{MerchantId, StandId};

/// Faults in a market snapshot that cannot be repaired with a default.
///
/// Missing optional fields never produce an error; they are defaulted
/// while the [`Market`](crate::Market) is built.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Two stand records share an id.
    #[error("duplicate stand id: {0}")]
    DuplicateStand(StandId),

    /// Two merchant records share an id.
    #[error("duplicate merchant id: {0}")]
    DuplicateMerchant(MerchantId),

    /// A stand is listed as owned by more than one merchant.
    #[error("stand {stand} is owned by both {first} and {second}")]
    SharedOwnership {
        stand: StandId,
        first: MerchantId,
        second: MerchantId,
    },

    /// The row layout references a stand missing from the roster.
    #[error("layout references unknown stand: {0}")]
    UnknownLayoutStand(StandId),

    /// The row layout places the same stand twice.
    #[error("stand {0} appears more than once in the layout")]
    DuplicateLayoutStand(StandId),
}

/// Result type alias for market construction.
pub type Result<T> = std::result::Result<T, MarketError>;
