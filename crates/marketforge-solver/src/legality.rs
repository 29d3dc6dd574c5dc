//! Stand legality for a merchant.
//!
//! Legality is a chain of named predicates. Each predicate answers one
//! question about a single (merchant, stand) pair and the chain stops at
//! the first one that triggers.

use std::collections::BTreeSet;

use marketforge_core::{CategoryId, Market, Merchant, MerchantId, Stand, StandId};
use tracing::trace;

use crate::pool::StandPool;

/// Which protected stand tags are exhausted market-wide.
///
/// A tag is exhausted when queued merchants need it and the free stands
/// carrying it no longer exceed their minimum demand. Outsiders may not
/// take stands with an exhausted tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketPressure {
    exhausted_categories: BTreeSet<CategoryId>,
    equipment_exhausted: bool,
    baking_exhausted: bool,
}

impl MarketPressure {
    /// Measures pressure from the unreserved pool and the queued merchants
    /// that still need a new stand.
    pub fn measure<'m>(
        market: &Market,
        pool: &StandPool,
        queued: impl IntoIterator<Item = &'m Merchant>,
    ) -> Self {
        Self::measure_free(market, pool.unreserved(), queued)
    }

    /// Like [`measure`](Self::measure), but stands reserved for `merchant`
    /// count as free supply.
    pub fn measure_for<'m>(
        market: &Market,
        pool: &StandPool,
        merchant: &MerchantId,
        queued: impl IntoIterator<Item = &'m Merchant>,
    ) -> Self {
        let free = pool.iter().filter(|id| pool.is_free_for(id, merchant, false));
        Self::measure_free(market, free, queued)
    }

    fn measure_free<'p, 'm>(
        market: &Market,
        free: impl Iterator<Item = &'p StandId>,
        queued: impl IntoIterator<Item = &'m Merchant>,
    ) -> Self {
        let free: Vec<&Stand> = free.filter_map(|id| market.stand(id)).collect();
        let seeking: Vec<&Merchant> = queued
            .into_iter()
            .filter(|m| m.owned.is_empty() || m.wants_to_move)
            .collect();

        let exhausted_categories = market
            .categories()
            .filter(|c| c.required)
            .filter(|c| {
                let supply = free.iter().filter(|s| s.has_category(&c.id)).count();
                let demand = seeking
                    .iter()
                    .filter(|m| m.categories.contains(&c.id))
                    .map(|m| m.minimum)
                    .sum::<usize>();
                is_exhausted(supply, demand)
            })
            .map(|c| c.id.clone())
            .collect();

        let equipment_supply = free.iter().filter(|s| s.equipment).count();
        let equipment_demand = seeking
            .iter()
            .filter(|m| m.equipment)
            .map(|m| m.minimum)
            .sum::<usize>();

        let baking_supply = free.iter().filter(|s| s.bake.is_baking()).count();
        let baking_demand = seeking
            .iter()
            .filter(|m| m.bake.is_baking())
            .map(|m| m.minimum)
            .sum::<usize>();

        Self {
            exhausted_categories,
            equipment_exhausted: is_exhausted(equipment_supply, equipment_demand),
            baking_exhausted: is_exhausted(baking_supply, baking_demand),
        }
    }

    /// No tag exhausted.
    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn category_exhausted(&self, category: &CategoryId) -> bool {
        self.exhausted_categories.contains(category)
    }

    pub fn equipment_exhausted(&self) -> bool {
        self.equipment_exhausted
    }

    pub fn baking_exhausted(&self) -> bool {
        self.baking_exhausted
    }
}

/// A tag nobody is waiting for is never exhausted.
fn is_exhausted(supply: usize, demand: usize) -> bool {
    demand > 0 && supply <= demand
}

/// A single legality rule. Returns true when the stand is illegal.
pub type Predicate = fn(&Legality<'_>, &Merchant, &Stand) -> bool;

/// Predicates in evaluation order.
pub const PREDICATES: [(&str, Predicate); 7] = [
    ("missing_category", missing_category),
    ("missing_equipment", missing_equipment),
    ("incompatible_bake", incompatible_bake),
    ("protected_category", protected_category),
    ("protected_equipment", protected_equipment),
    ("protected_bake", protected_bake),
    ("avoided_during_relocation", avoided_during_relocation),
];

/// Context the predicates are evaluated in.
#[derive(Debug, Clone, Copy)]
pub struct Legality<'a> {
    market: &'a Market,
    pressure: &'a MarketPressure,
    avoid_relocation: bool,
}

impl<'a> Legality<'a> {
    pub fn new(market: &'a Market, pressure: &'a MarketPressure) -> Self {
        Self {
            market,
            pressure,
            avoid_relocation: false,
        }
    }

    /// Holders relocating may not take equipment or category stands they
    /// do not need.
    pub fn with_relocation_avoidance(mut self, avoid: bool) -> Self {
        self.avoid_relocation = avoid;
        self
    }

    /// Name of the first predicate the pair violates.
    pub fn violation(&self, merchant: &Merchant, stand: &Stand) -> Option<&'static str> {
        PREDICATES
            .iter()
            .find(|(_, predicate)| predicate(self, merchant, stand))
            .map(|(name, _)| *name)
    }

    pub fn permits(&self, merchant: &Merchant, stand: &Stand) -> bool {
        match self.violation(merchant, stand) {
            Some(rule) => {
                trace!(
                    event = "illegal_stand",
                    merchant = %merchant.id,
                    stand = %stand.id,
                    rule,
                );
                false
            }
            None => true,
        }
    }

    fn is_required(&self, category: &CategoryId) -> bool {
        self.market.is_required_category(category)
    }

    /// Required categories on the stand the merchant does not carry.
    fn foreign_categories<'s>(
        &'s self,
        merchant: &'s Merchant,
        stand: &'s Stand,
    ) -> impl Iterator<Item = &'s CategoryId> + 's {
        stand
            .categories
            .iter()
            .filter(move |c| self.is_required(c) && !merchant.categories.contains(*c))
    }
}

fn missing_category(ctx: &Legality<'_>, merchant: &Merchant, stand: &Stand) -> bool {
    merchant
        .categories
        .iter()
        .any(|c| ctx.is_required(c) && !stand.has_category(c))
}

fn missing_equipment(_: &Legality<'_>, merchant: &Merchant, stand: &Stand) -> bool {
    merchant.equipment && !stand.equipment
}

fn incompatible_bake(_: &Legality<'_>, merchant: &Merchant, stand: &Stand) -> bool {
    !stand.bake.accepts(merchant.bake)
}

fn protected_category(ctx: &Legality<'_>, merchant: &Merchant, stand: &Stand) -> bool {
    ctx.foreign_categories(merchant, stand)
        .any(|c| ctx.pressure.category_exhausted(c))
}

fn protected_equipment(ctx: &Legality<'_>, merchant: &Merchant, stand: &Stand) -> bool {
    stand.equipment && !merchant.equipment && ctx.pressure.equipment_exhausted()
}

fn protected_bake(ctx: &Legality<'_>, merchant: &Merchant, stand: &Stand) -> bool {
    stand.bake.is_baking() && !merchant.bake.is_baking() && ctx.pressure.baking_exhausted()
}

fn avoided_during_relocation(ctx: &Legality<'_>, merchant: &Merchant, stand: &Stand) -> bool {
    if !ctx.avoid_relocation {
        return false;
    }
    (stand.equipment && !merchant.equipment)
        || ctx.foreign_categories(merchant, stand).next().is_some()
}
