//! A validated market, built from a [`MarketSnapshot`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::error::{MarketError, Result};
use crate::id::{CategoryId, MerchantId, StandId};
use crate::merchant::Merchant;
use crate::snapshot::{MarketSnapshot, MerchantSnapshot};
use crate::stand::{Stand, TradeCategory};

/// The market as the engine sees it: defaults applied, ineligible
/// merchants removed, preferences ranked.
#[derive(Debug, Clone)]
pub struct Market {
    pub id: String,
    pub date: NaiveDate,
    pub max_stands_per_merchant: Option<usize>,
    /// Stand ids per row, in walking order.
    pub rows: Vec<Vec<StandId>>,
    /// Neighbouring stand pairs separated by an obstacle.
    pub obstacles: Vec<(StandId, StandId)>,
    categories: BTreeMap<CategoryId, TradeCategory>,
    stands: BTreeMap<StandId, Stand>,
    merchants: BTreeMap<MerchantId, Merchant>,
}

impl Market {
    /// Builds a market from a provider snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error for faults that cannot be defaulted: duplicate ids,
    /// shared stand ownership, or a layout that does not match the roster.
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Result<Self> {
        let categories: BTreeMap<CategoryId, TradeCategory> = snapshot
            .categories
            .iter()
            .map(|c| {
                let category = TradeCategory {
                    id: c.id.clone(),
                    required: c.required,
                    maximum: c.maximum,
                };
                (c.id.clone(), category)
            })
            .collect();

        let mut stands = BTreeMap::new();
        for s in &snapshot.stands {
            let stand = Stand {
                id: s.id.clone(),
                categories: s.categories.iter().cloned().collect(),
                equipment: s.equipment,
                bake: s.bake_type.unwrap_or_default(),
                active: s.active.unwrap_or(true),
            };
            if stands.insert(s.id.clone(), stand).is_some() {
                return Err(MarketError::DuplicateStand(s.id.clone()));
            }
        }

        let mut laid_out = BTreeSet::new();
        for id in snapshot.rows.iter().flatten() {
            if !stands.contains_key(id) {
                return Err(MarketError::UnknownLayoutStand(id.clone()));
            }
            if !laid_out.insert(id.clone()) {
                return Err(MarketError::DuplicateLayoutStand(id.clone()));
            }
        }

        let preferences = rank_preferences(snapshot, &stands);
        let attendance: HashMap<&MerchantId, bool> = snapshot
            .attendance
            .iter()
            .map(|a| (&a.merchant, a.present))
            .collect();
        let priority_list: BTreeSet<&MerchantId> = snapshot.priority_list.iter().collect();
        let limit = snapshot.market.max_stands_per_merchant;

        let mut owners: BTreeMap<StandId, MerchantId> = BTreeMap::new();
        let mut seen = BTreeSet::new();
        let mut merchants = BTreeMap::new();
        for m in &snapshot.merchants {
            if !seen.insert(m.id.clone()) {
                return Err(MarketError::DuplicateMerchant(m.id.clone()));
            }
            for stand in &m.owned_stands {
                if let Some(first) = owners.insert(stand.clone(), m.id.clone()) {
                    if first != m.id {
                        return Err(MarketError::SharedOwnership {
                            stand: stand.clone(),
                            first,
                            second: m.id.clone(),
                        });
                    }
                }
            }

            if !is_eligible(m, attendance.get(&m.id).copied(), snapshot.market.date) {
                continue;
            }

            let mut merchant = build_merchant(m, limit);
            merchant.preferences = preferences.get(&m.id).cloned().unwrap_or_default();
            merchant.priority_list = priority_list.contains(&m.id);
            merchants.insert(m.id.clone(), merchant);
        }

        Ok(Self {
            id: snapshot.market.id.clone(),
            date: snapshot.market.date,
            max_stands_per_merchant: limit,
            rows: snapshot.rows.clone(),
            obstacles: snapshot
                .obstacles
                .iter()
                .map(|o| (o.before.clone(), o.after.clone()))
                .collect(),
            categories,
            stands,
            merchants,
        })
    }

    pub fn stand(&self, id: &StandId) -> Option<&Stand> {
        self.stands.get(id)
    }

    pub fn stands(&self) -> impl Iterator<Item = &Stand> {
        self.stands.values()
    }

    pub fn merchant(&self, id: &MerchantId) -> Option<&Merchant> {
        self.merchants.get(id)
    }

    pub fn merchants(&self) -> impl Iterator<Item = &Merchant> {
        self.merchants.values()
    }

    pub fn merchant_count(&self) -> usize {
        self.merchants.len()
    }

    pub fn category(&self, id: &CategoryId) -> Option<&TradeCategory> {
        self.categories.get(id)
    }

    pub fn categories(&self) -> impl Iterator<Item = &TradeCategory> {
        self.categories.values()
    }

    /// Returns true only for defined, required categories.
    ///
    /// Unknown category references are permissive.
    pub fn is_required_category(&self, id: &CategoryId) -> bool {
        self.categories.get(id).is_some_and(|c| c.required)
    }
}

fn is_eligible(m: &MerchantSnapshot, present: Option<bool>, date: NaiveDate) -> bool {
    if m.is_absent_on(date) {
        return false;
    }
    if m.status.has_fixed_entitlement() {
        present.unwrap_or(true)
    } else {
        present.unwrap_or(false)
    }
}

fn build_merchant(m: &MerchantSnapshot, limit: Option<usize>) -> Merchant {
    let mut owned: Vec<StandId> = Vec::new();
    if m.status.has_fixed_entitlement() {
        for stand in &m.owned_stands {
            if !owned.contains(stand) {
                owned.push(stand.clone());
            }
        }
    }

    let minimum = m.minimum.unwrap_or(1).max(1);
    let mut maximum = m
        .maximum
        .unwrap_or_else(|| minimum.max(owned.len()))
        .max(1);
    if let Some(limit) = limit {
        maximum = maximum.min(limit.max(1));
    }
    maximum = maximum.max(owned.len());
    let minimum = minimum.min(maximum);

    let is_holder = !owned.is_empty();
    Merchant {
        id: m.id.clone(),
        rank: m.rank,
        status: m.status,
        owned,
        preferences: Vec::new(),
        minimum,
        maximum,
        anywhere: m.anywhere.unwrap_or(false),
        categories: m.categories.iter().cloned().collect(),
        equipment: m.equipment,
        bake: m.bake_type.unwrap_or_default(),
        priority_list: false,
        wants_to_move: is_holder && m.wants_to_move.unwrap_or(false),
    }
}

// Most desired first; unknown stands and repeats are dropped.
fn rank_preferences(
    snapshot: &MarketSnapshot,
    stands: &BTreeMap<StandId, Stand>,
) -> BTreeMap<MerchantId, Vec<StandId>> {
    let mut grouped: BTreeMap<MerchantId, Vec<(i32, StandId)>> = BTreeMap::new();
    for p in &snapshot.preferences {
        if !stands.contains_key(&p.stand) {
            continue;
        }
        grouped
            .entry(p.merchant.clone())
            .or_default()
            .push((p.priority, p.stand.clone()));
    }

    grouped
        .into_iter()
        .map(|(merchant, mut entries)| {
            entries.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
            let mut ranked: Vec<StandId> = Vec::with_capacity(entries.len());
            for (_, stand) in entries {
                if !ranked.contains(&stand) {
                    ranked.push(stand);
                }
            }
            (merchant, ranked)
        })
        .collect()
}
