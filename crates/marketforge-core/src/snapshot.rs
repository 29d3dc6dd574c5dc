//! Input snapshot delivered by the data provider.
//!
//! These types mirror the provider's wire format one-to-one. Every field
//! that may legitimately be missing is optional here and receives its
//! default while the [`Market`](crate::Market) is built.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::{CategoryId, MerchantId, StandId};
use crate::merchant::Status;
use crate::stand::BakeType;

/// Everything the engine needs for one market day.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub market: MarketInfo,

    /// Stand ids per row, in walking order.
    #[serde(default)]
    pub rows: Vec<Vec<StandId>>,

    /// Obstacles breaking adjacency between two neighbouring stands.
    #[serde(default)]
    pub obstacles: Vec<ObstacleEntry>,

    #[serde(default)]
    pub categories: Vec<CategorySnapshot>,

    #[serde(default)]
    pub stands: Vec<StandSnapshot>,

    #[serde(default)]
    pub merchants: Vec<MerchantSnapshot>,

    #[serde(default)]
    pub attendance: Vec<AttendanceEntry>,

    /// Merchants on the priority ("A") list.
    #[serde(default)]
    pub priority_list: Vec<MerchantId>,

    #[serde(default)]
    pub preferences: Vec<PreferenceEntry>,
}

/// Market descriptor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInfo {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub max_stands_per_merchant: Option<usize>,
}

impl Default for MarketInfo {
    fn default() -> Self {
        Self {
            id: String::new(),
            date: NaiveDate::default(),
            max_stands_per_merchant: None,
        }
    }
}

/// An obstacle between two stands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleEntry {
    pub before: StandId,
    pub after: StandId,
}

/// A trade category definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySnapshot {
    pub id: CategoryId,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub maximum: Option<usize>,
}

/// A stand record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandSnapshot {
    pub id: StandId,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
    #[serde(default)]
    pub equipment: bool,
    #[serde(default)]
    pub bake_type: Option<BakeType>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// A merchant record, including its preference settings ("voorkeur").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantSnapshot {
    pub id: MerchantId,
    pub rank: u32,
    pub status: Status,
    #[serde(default)]
    pub owned_stands: Vec<StandId>,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
    #[serde(default)]
    pub equipment: bool,
    #[serde(default)]
    pub bake_type: Option<BakeType>,
    #[serde(default)]
    pub minimum: Option<usize>,
    #[serde(default)]
    pub maximum: Option<usize>,
    #[serde(default)]
    pub anywhere: Option<bool>,
    #[serde(default)]
    pub wants_to_move: Option<bool>,
    #[serde(default)]
    pub absent_from: Option<NaiveDate>,
    #[serde(default)]
    pub absent_until: Option<NaiveDate>,
}

/// Explicit attendance registration for the market day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub merchant: MerchantId,
    pub present: bool,
}

/// One ranked stand preference of a merchant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceEntry {
    pub merchant: MerchantId,
    pub stand: StandId,
    /// Higher values are more desired.
    #[serde(default)]
    pub priority: i32,
}

impl MerchantSnapshot {
    /// Creates a merchant record with every optional field unset.
    pub fn new(id: impl Into<MerchantId>, rank: u32, status: Status) -> Self {
        Self {
            id: id.into(),
            rank,
            status,
            owned_stands: Vec::new(),
            categories: Vec::new(),
            equipment: false,
            bake_type: None,
            minimum: None,
            maximum: None,
            anywhere: None,
            wants_to_move: None,
            absent_from: None,
            absent_until: None,
        }
    }

    /// Returns true if `date` falls inside the declared absence range.
    pub fn is_absent_on(&self, date: NaiveDate) -> bool {
        if self.absent_from.is_none() && self.absent_until.is_none() {
            return false;
        }
        let after_start = self.absent_from.map_or(true, |from| from <= date);
        let before_end = self.absent_until.map_or(true, |until| date <= until);
        after_start && before_end
    }
}

impl StandSnapshot {
    /// Creates an untagged stand record.
    pub fn new(id: impl Into<StandId>) -> Self {
        Self {
            id: id.into(),
            categories: Vec::new(),
            equipment: false,
            bake_type: None,
            active: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_absence_range_is_inclusive() {
        let mut m = MerchantSnapshot::new("m1", 1, Status::Vpl);
        m.absent_from = Some(date(10));
        m.absent_until = Some(date(16));

        assert!(m.is_absent_on(date(10)));
        assert!(m.is_absent_on(date(16)));
        assert!(!m.is_absent_on(date(17)));
    }

    #[test]
    fn test_open_ended_absence() {
        let mut m = MerchantSnapshot::new("m1", 1, Status::Vpl);
        m.absent_from = Some(date(12));
        assert!(m.is_absent_on(date(30)));
        assert!(!m.is_absent_on(date(11)));
    }

    #[test]
    fn test_parses_provider_json() {
        let json = r#"{
            "market": { "id": "noordermarkt", "date": "2026-10-16", "maxStandsPerMerchant": 3 },
            "rows": [["1", "2"], ["3"]],
            "stands": [{ "id": "1", "bakeType": "bak" }, { "id": "2" }, { "id": "3", "equipment": true }],
            "merchants": [{ "id": "m1", "rank": 12, "status": "soll", "anywhere": true }],
            "attendance": [{ "merchant": "m1", "present": true }],
            "preferences": [{ "merchant": "m1", "stand": "2", "priority": 5 }]
        }"#;

        let snapshot: MarketSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.market.max_stands_per_merchant, Some(3));
        assert_eq!(snapshot.rows.len(), 2);
        assert_eq!(snapshot.stands[0].bake_type, Some(BakeType::Full));
        assert_eq!(snapshot.merchants[0].minimum, None);
        assert_eq!(snapshot.preferences[0].priority, 5);
    }
}
