//! MarketForge Core - Domain types for market stand allocation
//!
//! This crate provides the fundamental abstractions shared by the engine:
//! - Identifier newtypes for stands, merchants and trade categories
//! - Stand and merchant records, statuses and compatibility tags
//! - The input snapshot delivered by the data provider
//! - A validated [`Market`] built from that snapshot
//! - Output records for allocations and rejections

pub mod error;
pub mod id;
pub mod market;
pub mod merchant;
pub mod outcome;
pub mod snapshot;
pub mod stand;


pub use error::{MarketError, Result};
pub use id::{CategoryId, MerchantId, StandId};
pub use market::Market;
pub use merchant::{Merchant, Status};
pub use outcome::{AllocationRecord, RejectionReason, RejectionRecord};
pub use snapshot::{
    AttendanceEntry, CategorySnapshot, MarketInfo, MarketSnapshot, MerchantSnapshot, ObstacleEntry,
    PreferenceEntry, StandSnapshot,
};
pub use stand::{BakeType, Stand, TradeCategory};
