//! MarketForge - Market stand allocation in Rust
//!
//! One call turns a market snapshot into allocations and rejections.
//!
//! # Example
//!
//! ```rust
//! use marketforge::prelude::*;
//!
//! let snapshot: MarketSnapshot = serde_json::from_str(r#"{
//!     "market": { "id": "centrum", "date": "2026-10-16" },
//!     "rows": [["1", "2"]],
//!     "stands": [{ "id": "1" }, { "id": "2" }],
//!     "merchants": [{ "id": "m1", "rank": 1, "status": "vpl", "ownedStands": ["2"] }]
//! }"#).unwrap();
//!
//! let output = run_job(&snapshot, &EngineConfig::default()).unwrap();
//! assert_eq!(output.allocations[0].stands, vec![StandId::from("2")]);
//! ```

pub use marketforge_config::{ConfigError, EngineConfig, EnvironmentMode};
pub use marketforge_core::{
    AllocationRecord, BakeType, CategoryId, Market, MarketError, MarketSnapshot, Merchant,
    MerchantId, RejectionReason, RejectionRecord, Stand, StandId, Status,
};
pub use marketforge_solver::{
    AllocationError, AllocationOutcome, AuditAction, AuditEntry, AuditLog, MarketAllocator,
    PhaseId,
};

#[cfg(feature = "console")]
pub use marketforge_console as console;

mod job;
pub use job::{prepare_market, run, run_job, JobError, JobOutput};

pub mod prelude {
    pub use super::{run, run_job, JobError, JobOutput};
    pub use super::{EngineConfig, EnvironmentMode, MarketAllocator};
    pub use super::{MarketSnapshot, MerchantId, RejectionReason, StandId, Status};
}
