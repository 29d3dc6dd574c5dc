//! Stands, trade categories and compatibility tags.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::{CategoryId, StandId};

/// Baking-type tag of a stand or requirement of a merchant.
///
/// # Example
///
/// ```
/// use marketforge_core::BakeType;
///
/// assert!(BakeType::Full.accepts(BakeType::Light));
/// assert!(!BakeType::Light.accepts(BakeType::Full));
/// assert!(BakeType::None.accepts(BakeType::None));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BakeType {
    /// No food preparation.
    #[default]
    #[serde(alias = "geen")]
    None,

    /// Light baking ("bak-licht").
    #[serde(alias = "bak-licht")]
    Light,

    /// Full baking ("bak").
    #[serde(alias = "bak")]
    Full,
}

impl BakeType {
    /// Returns true for either baking variant.
    pub fn is_baking(self) -> bool {
        self != BakeType::None
    }

    /// Returns true if a stand tagged `self` can host a merchant needing `wanted`.
    pub fn accepts(self, wanted: BakeType) -> bool {
        match wanted {
            BakeType::None => true,
            BakeType::Light => self.is_baking(),
            BakeType::Full => self == BakeType::Full,
        }
    }
}

/// A trade category definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeCategory {
    pub id: CategoryId,
    /// Required categories restrict their stands and are capacity-capped.
    pub required: bool,
    /// Maximum simultaneous stand allocations, `None` for unbounded.
    pub maximum: Option<usize>,
}

impl TradeCategory {
    /// Creates an optional category with no maximum.
    pub fn new(id: impl Into<CategoryId>) -> Self {
        Self {
            id: id.into(),
            required: false,
            maximum: None,
        }
    }

    /// Creates a required category with the given maximum.
    pub fn required(id: impl Into<CategoryId>, maximum: Option<usize>) -> Self {
        Self {
            id: id.into(),
            required: true,
            maximum,
        }
    }
}

/// A physical market stand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stand {
    pub id: StandId,
    pub categories: BTreeSet<CategoryId>,
    /// Has own fixed sales equipment support ("EVI").
    pub equipment: bool,
    pub bake: BakeType,
    pub active: bool,
}

impl Stand {
    /// Creates an active stand without tags.
    pub fn new(id: impl Into<StandId>) -> Self {
        Self {
            id: id.into(),
            categories: BTreeSet::new(),
            equipment: false,
            bake: BakeType::None,
            active: true,
        }
    }

    /// Returns true if the stand carries the category tag.
    pub fn has_category(&self, category: &CategoryId) -> bool {
        self.categories.contains(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_bake_merchant_needs_full_stand() {
        assert!(!BakeType::Light.accepts(BakeType::Full));
        assert!(!BakeType::None.accepts(BakeType::Full));
        assert!(BakeType::Full.accepts(BakeType::Full));
    }

    #[test]
    fn test_light_bake_merchant_accepts_either_baking_stand() {
        assert!(BakeType::Light.accepts(BakeType::Light));
        assert!(BakeType::Full.accepts(BakeType::Light));
        assert!(!BakeType::None.accepts(BakeType::Light));
    }

    #[test]
    fn test_bake_aliases() {
        let full: BakeType = serde_json::from_str("\"bak\"").unwrap();
        let light: BakeType = serde_json::from_str("\"bak-licht\"").unwrap();
        assert_eq!(full, BakeType::Full);
        assert_eq!(light, BakeType::Light);
    }
}
