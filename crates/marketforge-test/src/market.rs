//! Market snapshot builder.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use marketforge_core::{
    AttendanceEntry, BakeType, CategoryId, CategorySnapshot, Market, MarketInfo, MarketSnapshot,
    ObstacleEntry, PreferenceEntry, StandId, StandSnapshot,
};

use crate::merchant::MerchantFixture;

/// Market day used by every fixture.
pub fn fixture_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap_or_default()
}

/// Builds a [`MarketSnapshot`] row by row.
///
/// Stands named in a row are created untagged and active; the tagging
/// methods then adjust them.
#[derive(Debug, Clone)]
pub struct MarketBuilder {
    info: MarketInfo,
    rows: Vec<Vec<StandId>>,
    obstacles: Vec<ObstacleEntry>,
    categories: Vec<CategorySnapshot>,
    stands: BTreeMap<StandId, StandSnapshot>,
    merchants: Vec<MerchantFixture>,
}

impl MarketBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            info: MarketInfo {
                id: id.to_string(),
                date: fixture_date(),
                max_stands_per_merchant: None,
            },
            rows: Vec::new(),
            obstacles: Vec::new(),
            categories: Vec::new(),
            stands: BTreeMap::new(),
            merchants: Vec::new(),
        }
    }

    /// Adds a row of stands in walking order.
    pub fn row(mut self, stands: &[&str]) -> Self {
        let row: Vec<StandId> = stands.iter().map(|s| StandId::from(*s)).collect();
        for id in &row {
            self.stands
                .entry(id.clone())
                .or_insert_with(|| StandSnapshot::new(id.clone()));
        }
        self.rows.push(row);
        self
    }

    /// Adds `count` stands named "1", "2", ... continuing the numbering.
    pub fn numbered_row(self, count: usize) -> Self {
        let start = self.stands.len() + 1;
        let names: Vec<String> = (start..start + count).map(|n| n.to_string()).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        self.row(&refs)
    }

    pub fn obstacle(mut self, before: &str, after: &str) -> Self {
        self.obstacles.push(ObstacleEntry {
            before: StandId::from(before),
            after: StandId::from(after),
        });
        self
    }

    pub fn max_stands_per_merchant(mut self, limit: usize) -> Self {
        self.info.max_stands_per_merchant = Some(limit);
        self
    }

    /// Defines an optional category.
    pub fn category(mut self, id: &str) -> Self {
        self.categories.push(CategorySnapshot {
            id: CategoryId::from(id),
            required: false,
            maximum: None,
        });
        self
    }

    /// Defines a required, capacity-capped category.
    pub fn required_category(mut self, id: &str, maximum: Option<usize>) -> Self {
        self.categories.push(CategorySnapshot {
            id: CategoryId::from(id),
            required: true,
            maximum,
        });
        self
    }

    /// Tags stands with a category.
    pub fn tag(mut self, category: &str, stands: &[&str]) -> Self {
        for id in stands {
            self.stand_mut(id)
                .categories
                .push(CategoryId::from(category));
        }
        self
    }

    pub fn equipment(mut self, stands: &[&str]) -> Self {
        for id in stands {
            self.stand_mut(id).equipment = true;
        }
        self
    }

    pub fn bake(mut self, bake: BakeType, stands: &[&str]) -> Self {
        for id in stands {
            self.stand_mut(id).bake_type = Some(bake);
        }
        self
    }

    pub fn inactive(mut self, stands: &[&str]) -> Self {
        for id in stands {
            self.stand_mut(id).active = Some(false);
        }
        self
    }

    pub fn merchant(mut self, merchant: MerchantFixture) -> Self {
        self.merchants.push(merchant);
        self
    }

    pub fn build(self) -> MarketSnapshot {
        let mut snapshot = MarketSnapshot {
            market: self.info,
            rows: self.rows,
            obstacles: self.obstacles,
            categories: self.categories,
            stands: self.stands.into_values().collect(),
            ..MarketSnapshot::default()
        };
        for fixture in self.merchants {
            let id = fixture.snapshot.id.clone();
            if let Some(present) = fixture.present {
                snapshot.attendance.push(AttendanceEntry {
                    merchant: id.clone(),
                    present,
                });
            }
            if fixture.priority_list {
                snapshot.priority_list.push(id.clone());
            }
            let count = fixture.preferences.len() as i32;
            for (index, stand) in fixture.preferences.into_iter().enumerate() {
                snapshot.preferences.push(PreferenceEntry {
                    merchant: id.clone(),
                    stand,
                    priority: count - index as i32,
                });
            }
            snapshot.merchants.push(fixture.snapshot);
        }
        snapshot
    }

    /// Builds and validates the market.
    ///
    /// # Panics
    ///
    /// Panics if the fixture describes an invalid market.
    pub fn market(self) -> Market {
        let snapshot = self.build();
        match Market::from_snapshot(&snapshot) {
            Ok(market) => market,
            Err(err) => panic!("invalid market fixture: {err}"),
        }
    }

    fn stand_mut(&mut self, id: &str) -> &mut StandSnapshot {
        self.stands
            .entry(StandId::from(id))
            .or_insert_with(|| StandSnapshot::new(id))
    }
}
