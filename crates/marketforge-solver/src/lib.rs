//! MarketForge allocation engine
//!
//! This crate decides which merchant gets which stands on a market day:
//! - Layout of rows, obstacles and contiguous windows
//! - Capacity guard for required trade categories
//! - Legality predicates and the cluster finder
//! - Moving-holder resolver for relocation requests
//! - Phases in legal priority order, run by [`MarketAllocator`]
//! - Validation with reclaim, and an audit log of every decision

pub mod allocator;
pub mod audit;
pub mod capacity;
pub mod cluster;
pub mod error;
pub mod fixed_point;
pub mod layout;
pub mod legality;
pub mod mover;
pub mod outcome;
pub mod phase;
pub mod placement;
pub mod pool;
pub mod scope;
pub mod validation;

pub use allocator::MarketAllocator;
pub use audit::{
    AuditAction, AuditEntry, AuditLog, ExpansionGroup, PhaseId, PriorityList, TierKind,
};
pub use capacity::CapacityGuard;
pub use cluster::{ClusterFinder, ClusterQuery, MatchMode};
pub use error::{AllocationError, Result};
pub use fixed_point::FixedPoint;
pub use layout::{Layout, Slot};
pub use legality::{Legality, MarketPressure};
pub use mover::{MoverResolver, MoverSummary};
pub use outcome::AllocationOutcome;
pub use phase::{AllocationPhase, MarketAnalysis};
pub use placement::{Placement, Search};
pub use pool::StandPool;
pub use scope::RunScope;
pub use validation::ValidationReport;
