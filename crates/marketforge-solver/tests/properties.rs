//! Property-based invariant tests for the allocation engine.
//!
//! These hold for any market the generator can describe:
//!
//! 1. No stand is allocated twice.
//! 2. Every merchant ends in exactly one of allocations and rejections.
//! 3. Allocations form one contiguous run, unless a holder kept exactly
//!    its own stands.
//! 4. Identical input produces identical output.
//! 5. Applicants never push a required category past its maximum.
//! 6. Allocated merchants get at least their minimum and only stands
//!    compatible with their baking requirement.

use std::collections::BTreeSet;

use marketforge_config::{EngineConfig, EnvironmentMode};
use marketforge_core::{BakeType, CategoryId, Market, StandId};
use marketforge_solver::{AllocationOutcome, Layout, MarketAllocator};
use marketforge_test::{MarketBuilder, MerchantFixture};
use proptest::prelude::*;

// ── Generators ──────────────────────────────────────────────────────────

const MAX_STANDS: usize = 18;

#[derive(Debug, Clone)]
struct StandPlan {
    cheese: bool,
    equipment: bool,
    bake: BakeType,
    active: bool,
}

#[derive(Debug, Clone)]
struct MerchantPlan {
    kind: u8,
    rank: u32,
    minimum: usize,
    extra: usize,
    anywhere: bool,
    cheese: bool,
    equipment: bool,
    bake: BakeType,
    preferences: Vec<usize>,
    owned: usize,
    wants_to_move: bool,
    a_list: bool,
}

fn bake_strategy() -> impl Strategy<Value = BakeType> {
    prop_oneof![
        4 => Just(BakeType::None),
        1 => Just(BakeType::Light),
        1 => Just(BakeType::Full),
    ]
}

fn stand_strategy() -> impl Strategy<Value = StandPlan> {
    (
        prop::bool::weighted(0.3),
        prop::bool::weighted(0.2),
        bake_strategy(),
        prop::bool::weighted(0.9),
    )
        .prop_map(|(cheese, equipment, bake, active)| StandPlan {
            cheese,
            equipment,
            bake,
            active,
        })
}

fn merchant_strategy() -> impl Strategy<Value = MerchantPlan> {
    (
        0u8..4,
        1u32..50,
        1usize..=3,
        0usize..=2,
        any::<bool>(),
        prop::bool::weighted(0.3),
        prop::bool::weighted(0.2),
        bake_strategy(),
        prop::collection::vec(0usize..MAX_STANDS, 0..4),
        1usize..=2,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(
                kind,
                rank,
                minimum,
                extra,
                anywhere,
                cheese,
                equipment,
                bake,
                preferences,
                owned,
                wants_to_move,
                a_list,
            )| MerchantPlan {
                kind,
                rank,
                minimum,
                extra,
                anywhere,
                cheese,
                equipment,
                bake,
                preferences,
                owned,
                wants_to_move,
                a_list,
            },
        )
}

fn market_strategy() -> impl Strategy<Value = Market> {
    (
        prop::collection::vec(1usize..=6, 1..=3),
        prop::collection::vec(stand_strategy(), MAX_STANDS),
        prop::collection::vec(0usize..MAX_STANDS, 0..4),
        prop::option::of(0usize..=3),
        prop::collection::vec(merchant_strategy(), 0..=10),
    )
        .prop_map(|(rows, stands, obstacles, cheese_max, merchants)| {
            build_market(&rows, &stands, &obstacles, cheese_max, &merchants)
        })
}

fn build_market(
    rows: &[usize],
    stands: &[StandPlan],
    obstacles: &[usize],
    cheese_max: Option<usize>,
    merchants: &[MerchantPlan],
) -> Market {
    let total: usize = rows.iter().sum();
    let names: Vec<String> = (1..=total).map(|n| n.to_string()).collect();
    let mut builder = MarketBuilder::new("proptest").required_category("kaas", cheese_max);

    let mut start = 0;
    for &len in rows {
        let row: Vec<&str> = names[start..start + len].iter().map(String::as_str).collect();
        builder = builder.row(&row);
        start += len;
    }
    for &i in obstacles {
        if i + 1 < total {
            builder = builder.obstacle(&names[i], &names[i + 1]);
        }
    }
    for (name, plan) in names.iter().zip(stands) {
        if plan.cheese {
            builder = builder.tag("kaas", &[name]);
        }
        if plan.equipment {
            builder = builder.equipment(&[name]);
        }
        if !plan.active {
            builder = builder.inactive(&[name]);
        }
        builder = builder.bake(plan.bake, &[name]);
    }

    let mut next_owned = 0;
    for (index, plan) in merchants.iter().enumerate() {
        let id = format!("m{index}");
        let mut fixture = match plan.kind {
            0 => MerchantFixture::soll(&id, plan.rank),
            1 => {
                let end = (next_owned + plan.owned).min(total);
                let owned: Vec<&str> = names[next_owned..end].iter().map(String::as_str).collect();
                next_owned = end;
                let fixture = MerchantFixture::vpl(&id, plan.rank, &owned);
                if plan.wants_to_move {
                    fixture.wants_to_move()
                } else {
                    fixture
                }
            }
            2 => MerchantFixture::tvplz(&id, plan.rank),
            _ => MerchantFixture::exp(&id, plan.rank),
        };
        fixture = fixture
            .minimum(plan.minimum)
            .maximum(plan.minimum + plan.extra)
            .bake(plan.bake);
        let preferred: Vec<&str> = plan
            .preferences
            .iter()
            .map(|&i| names[i % total].as_str())
            .collect();
        fixture = fixture.prefer(&preferred);
        if plan.anywhere {
            fixture = fixture.anywhere();
        }
        if plan.cheese {
            fixture = fixture.category("kaas");
        }
        if plan.equipment {
            fixture = fixture.equipment();
        }
        if plan.a_list {
            fixture = fixture.a_list();
        }
        builder = builder.merchant(fixture);
    }
    builder.market()
}

fn allocate(market: &Market) -> AllocationOutcome {
    let config = EngineConfig::default().with_environment_mode(EnvironmentMode::FullAssert);
    MarketAllocator::new(config)
        .allocate(market)
        .expect("allocation run failed")
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Bookkeeping: one holder per stand, one disposition per merchant
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn no_double_allocation_or_disposition(market in market_strategy()) {
        let outcome = allocate(&market);

        let mut seen = BTreeSet::new();
        for record in &outcome.allocations {
            for stand in &record.stands {
                prop_assert!(seen.insert(stand.clone()), "stand {} allocated twice", stand);
                let active = market.stand(stand).map(|s| s.active);
                prop_assert_eq!(active, Some(true));
            }
        }

        let allocated: BTreeSet<_> = outcome.allocations.iter().map(|a| &a.merchant_id).collect();
        let rejected: BTreeSet<_> = outcome.rejections.iter().map(|r| &r.merchant_id).collect();
        prop_assert!(allocated.is_disjoint(&rejected));
        prop_assert_eq!(allocated.len() + rejected.len(), market.merchant_count());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Contiguity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn allocations_are_contiguous(market in market_strategy()) {
        let outcome = allocate(&market);
        let layout = Layout::new(&market.rows, &market.obstacles);

        for record in &outcome.allocations {
            let owned: BTreeSet<&StandId> = record.merchant.owned.iter().collect();
            let held: BTreeSet<&StandId> = record.stands.iter().collect();
            if record.merchant.is_holder() && owned == held {
                continue;
            }
            prop_assert!(
                layout.is_contiguous(&record.stands),
                "{} holds non-contiguous {:?}",
                record.merchant_id,
                record.stands
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn allocation_is_deterministic(market in market_strategy()) {
        let first = serde_json::to_string(&allocate(&market)).unwrap();
        let second = serde_json::to_string(&allocate(&market)).unwrap();
        prop_assert_eq!(first, second);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Category capacity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn applicants_respect_category_maximum(market in market_strategy()) {
        let outcome = allocate(&market);
        let kaas = CategoryId::from("kaas");
        let Some(maximum) = market.category(&kaas).and_then(|c| c.maximum) else {
            return Ok(());
        };

        let applicant_stands: usize = outcome
            .allocations
            .iter()
            .filter(|a| !a.merchant.is_holder() && a.merchant.categories.contains(&kaas))
            .map(|a| a.stands.len())
            .sum();
        prop_assert!(
            applicant_stands <= maximum,
            "{} applicant stands for a maximum of {}",
            applicant_stands,
            maximum
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Minimum and baking compatibility
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn allocations_meet_minimum_and_bake(market in market_strategy()) {
        let outcome = allocate(&market);

        for record in &outcome.allocations {
            let merchant = &record.merchant;
            prop_assert!(record.stands.len() >= merchant.entitled_minimum());
            prop_assert!(record.stands.len() <= merchant.maximum.max(merchant.owned.len()));
            for stand in record.stands.iter().filter(|s| !merchant.owned.contains(s)) {
                let bake = market.stand(stand).map(|s| s.bake).unwrap_or_default();
                prop_assert!(
                    bake.accepts(merchant.bake),
                    "{} needs {:?} but got {} ({:?})",
                    merchant.id,
                    merchant.bake,
                    stand,
                    bake
                );
            }
        }
    }
}
