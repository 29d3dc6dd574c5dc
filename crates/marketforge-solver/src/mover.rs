//! Relocation of fixed holders.
//!
//! Holders asking to move are resolved together. A holder that cannot go
//! anywhere keeps its own stands. The others are moved through exact
//! two-party trades and conflict-free moves, round after round, until the
//! set of stands they still occupy stops changing. Whatever is left is
//! either moved all at once or, on any conflict, kept where it was.

use std::collections::{BTreeMap, BTreeSet};

use marketforge_core::{Merchant, MerchantId, StandId};
use tracing::{debug, info};

use crate::cluster::{ClusterFinder, ClusterQuery, MatchMode};
use crate::error::Result;
use crate::fixed_point::FixedPoint;
use crate::placement::allocate_own_stands;
use crate::scope::RunScope;

/// Counts of what happened to the relocating holders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoverSummary {
    pub moved: usize,
    pub traded: usize,
    pub stayed: usize,
    pub rounds: usize,
}

/// Resolves relocation requests of fixed holders.
#[derive(Debug, Clone, Copy)]
pub struct MoverResolver {
    iteration_limit: usize,
}

impl MoverResolver {
    pub fn new(iteration_limit: usize) -> Self {
        Self { iteration_limit }
    }

    /// Resolves every queued holder with a relocation request.
    pub fn resolve(&self, scope: &mut RunScope<'_>) -> Result<MoverSummary> {
        let mut summary = MoverSummary::default();
        let mut remaining = Vec::new();

        for merchant in scope.queued_by(|m| m.is_holder() && m.wants_to_move) {
            let wants_own_stand = merchant.owned.iter().any(|s| merchant.prefers(s));
            if wants_own_stand || wanted_cluster(&scope.finder(), merchant).is_none() {
                debug!(event = "mover_stays", merchant = %merchant.id, wants_own_stand);
                stay(scope, merchant, &mut summary)?;
            } else {
                remaining.push(merchant);
            }
        }

        let mut fixed_point = FixedPoint::new("moving-holders", self.iteration_limit);
        let mut collision = false;
        let mut stranded = false;
        while !remaining.is_empty() {
            let occupied: BTreeSet<StandId> = remaining
                .iter()
                .flat_map(|m| m.owned.iter().cloned())
                .collect();
            if fixed_point.converged(occupied)? {
                break;
            }
            summary.rounds += 1;

            let wanted: BTreeMap<MerchantId, Option<Vec<StandId>>> = {
                let finder = scope.finder();
                remaining
                    .iter()
                    .map(|m| (m.id.clone(), wanted_cluster(&finder, m)))
                    .collect()
            };
            stranded = wanted.values().any(Option::is_none);

            let mut done: BTreeSet<MerchantId> = BTreeSet::new();
            for (i, a) in remaining.iter().enumerate() {
                for b in &remaining[i + 1..] {
                    if done.contains(&a.id) || done.contains(&b.id) {
                        continue;
                    }
                    let (Some(Some(wa)), Some(Some(wb))) = (wanted.get(&a.id), wanted.get(&b.id))
                    else {
                        continue;
                    };
                    if same_stands(wa, &b.owned) && same_stands(wb, &a.owned) {
                        debug!(event = "mover_trade", first = %a.id, second = %b.id);
                        scope.allocate(&a.id, wa.clone())?;
                        scope.allocate(&b.id, wb.clone())?;
                        done.insert(a.id.clone());
                        done.insert(b.id.clone());
                        summary.traded += 2;
                    }
                }
            }
            remaining.retain(|m| !done.contains(&m.id));

            collision = overlapping(
                wanted
                    .iter()
                    .filter_map(|(id, w)| w.as_ref().filter(|_| !done.contains(id))),
            );

            for merchant in remaining.clone() {
                let Some(cluster) = wanted_cluster(&scope.finder(), merchant) else {
                    continue;
                };
                let blocked = remaining
                    .iter()
                    .filter(|other| other.id != merchant.id && !done.contains(&other.id))
                    .any(|other| other.owned.iter().any(|s| cluster.contains(s)));
                if !blocked {
                    debug!(event = "mover_safe_move", merchant = %merchant.id, stands = ?cluster);
                    scope.allocate(&merchant.id, cluster)?;
                    done.insert(merchant.id.clone());
                    summary.moved += 1;
                }
            }
            remaining.retain(|m| !done.contains(&m.id));

            info!(
                event = "mover_round",
                round = summary.rounds,
                remaining = remaining.len(),
                collision,
                stranded,
            );
        }

        if remaining.is_empty() {
            return Ok(summary);
        }

        let finale: Option<Vec<(&Merchant, Vec<StandId>)>> = if collision || stranded {
            None
        } else {
            let finder = scope.finder();
            remaining
                .iter()
                .map(|m| wanted_cluster(&finder, m).map(|cluster| (*m, cluster)))
                .collect::<Option<Vec<_>>>()
                .filter(|moves| !overlapping(moves.iter().map(|(_, c)| c)))
        };

        match finale {
            Some(moves) => {
                for (merchant, cluster) in moves {
                    scope.allocate(&merchant.id, cluster)?;
                    summary.moved += 1;
                }
            }
            None => {
                info!(
                    event = "mover_fallback",
                    remaining = remaining.len(),
                    collision,
                    stranded,
                );
                for merchant in remaining {
                    stay(scope, merchant, &mut summary)?;
                }
            }
        }
        Ok(summary)
    }
}

/// Best destination of a relocating holder, the size of its current
/// stands. Its own stands that are still in the pool count as free for it.
fn wanted_cluster(finder: &ClusterFinder<'_>, merchant: &Merchant) -> Option<Vec<StandId>> {
    let own = merchant
        .owned
        .iter()
        .filter(|s| finder.pool().contains(s))
        .cloned();
    let query = ClusterQuery::new(merchant, merchant.owned.len())
        .candidates(&merchant.preferences)
        .avoid_relocation()
        .exempt(own);
    finder
        .best_cluster(&query.clone().mode(MatchMode::All))
        .or_else(|| finder.best_cluster(&query.mode(MatchMode::Any)))
}

fn stay(scope: &mut RunScope<'_>, merchant: &Merchant, summary: &mut MoverSummary) -> Result<()> {
    allocate_own_stands(scope, merchant)?;
    summary.stayed += 1;
    Ok(())
}

fn same_stands(a: &[StandId], b: &[StandId]) -> bool {
    let a: BTreeSet<&StandId> = a.iter().collect();
    let b: BTreeSet<&StandId> = b.iter().collect();
    a == b
}

/// Returns true if any stand appears in more than one cluster.
fn overlapping<'c>(clusters: impl IntoIterator<Item = &'c Vec<StandId>>) -> bool {
    let mut seen = BTreeSet::new();
    clusters
        .into_iter()
        .flatten()
        .any(|stand| !seen.insert(stand))
}

#[cfg(test)]
mod tests {
    use marketforge_config::EngineConfig;
    use marketforge_core::{Market, RejectionReason};
    use marketforge_test::{MarketBuilder, MerchantFixture};

    use super::*;
    use crate::audit::PhaseId;

    fn stands(ids: &[&str]) -> Vec<StandId> {
        ids.iter().map(|s| StandId::from(*s)).collect()
    }

    fn resolve<'m>(market: &'m Market, config: &'m EngineConfig) -> (RunScope<'m>, MoverSummary) {
        let mut scope = RunScope::new(market, config);
        scope.set_phase(PhaseId::MovingHolders);
        let summary = MoverResolver::new(100).resolve(&mut scope).unwrap();
        (scope, summary)
    }

    #[test]
    fn test_deadlocked_swap_commits_in_final_round() {
        let market = MarketBuilder::new("m")
            .row(&["1", "2", "3"])
            .merchant(MerchantFixture::vpl("a", 1, &["1", "2"]).prefer(&["3"]).wants_to_move())
            .merchant(MerchantFixture::vpl("b", 2, &["3"]).prefer(&["1"]).wants_to_move())
            .market();
        let config = EngineConfig::default();
        let (scope, summary) = resolve(&market, &config);

        assert_eq!(scope.allocation(&MerchantId::from("a")), Some(&stands(&["2", "3"])[..]));
        assert_eq!(scope.allocation(&MerchantId::from("b")), Some(&stands(&["1"])[..]));
        assert_eq!(summary.moved, 2);
    }

    #[test]
    fn test_exact_trade() {
        let market = MarketBuilder::new("m")
            .row(&["1", "2", "3"])
            .merchant(MerchantFixture::vpl("a", 1, &["1"]).prefer(&["3"]).wants_to_move())
            .merchant(MerchantFixture::vpl("b", 2, &["3"]).prefer(&["1"]).wants_to_move())
            .market();
        let config = EngineConfig::default();
        let (scope, summary) = resolve(&market, &config);

        assert_eq!(scope.allocation(&MerchantId::from("a")), Some(&stands(&["3"])[..]));
        assert_eq!(scope.allocation(&MerchantId::from("b")), Some(&stands(&["1"])[..]));
        assert_eq!(summary.traded, 2);
    }

    #[test]
    fn test_safe_move_to_free_stand() {
        let market = MarketBuilder::new("m")
            .row(&["1", "2", "3"])
            .merchant(MerchantFixture::vpl("a", 1, &["1"]).prefer(&["3"]).wants_to_move())
            .market();
        let config = EngineConfig::default();
        let (scope, summary) = resolve(&market, &config);

        assert_eq!(scope.allocation(&MerchantId::from("a")), Some(&stands(&["3"])[..]));
        assert!(scope.pool().contains(&StandId::from("1")));
        assert_eq!(summary.moved, 1);
        assert_eq!(summary.rounds, 1);
    }

    #[test]
    fn test_preference_on_own_stand_means_stay() {
        let market = MarketBuilder::new("m")
            .row(&["1", "2", "3"])
            .merchant(
                MerchantFixture::vpl("a", 1, &["1"])
                    .prefer(&["3", "1"])
                    .wants_to_move(),
            )
            .market();
        let config = EngineConfig::default();
        let (scope, summary) = resolve(&market, &config);

        assert_eq!(scope.allocation(&MerchantId::from("a")), Some(&stands(&["1"])[..]));
        assert_eq!(summary.stayed, 1);
    }

    #[test]
    fn test_three_way_rotation_commits_in_final_round() {
        let market = MarketBuilder::new("m")
            .row(&["1", "2", "3"])
            .merchant(MerchantFixture::vpl("a", 1, &["1"]).prefer(&["2"]).wants_to_move())
            .merchant(MerchantFixture::vpl("b", 2, &["2"]).prefer(&["3"]).wants_to_move())
            .merchant(MerchantFixture::vpl("c", 3, &["3"]).prefer(&["1"]).wants_to_move())
            .market();
        let config = EngineConfig::default();
        let (scope, summary) = resolve(&market, &config);

        assert_eq!(scope.allocation(&MerchantId::from("a")), Some(&stands(&["2"])[..]));
        assert_eq!(scope.allocation(&MerchantId::from("b")), Some(&stands(&["3"])[..]));
        assert_eq!(scope.allocation(&MerchantId::from("c")), Some(&stands(&["1"])[..]));
        assert_eq!(summary.moved, 3);
    }

    #[test]
    fn test_stranded_holder_stays_after_trade() {
        let market = MarketBuilder::new("m")
            .row(&["1", "2", "3"])
            .merchant(MerchantFixture::vpl("a", 1, &["1"]).prefer(&["3"]).wants_to_move())
            .merchant(MerchantFixture::vpl("b", 2, &["2"]).prefer(&["3"]).wants_to_move())
            .merchant(MerchantFixture::vpl("c", 3, &["3"]).prefer(&["1"]).wants_to_move())
            .market();
        let config = EngineConfig::default();
        let (scope, summary) = resolve(&market, &config);

        assert_eq!(scope.allocation(&MerchantId::from("a")), Some(&stands(&["3"])[..]));
        assert_eq!(scope.allocation(&MerchantId::from("c")), Some(&stands(&["1"])[..]));
        assert_eq!(scope.allocation(&MerchantId::from("b")), Some(&stands(&["2"])[..]));
        assert_eq!(summary.traded, 2);
        assert_eq!(summary.stayed, 1);
    }

    #[test]
    fn test_collision_sends_everyone_home() {
        let market = MarketBuilder::new("m")
            .row(&["1", "2", "3", "4"])
            .merchant(MerchantFixture::vpl("a", 1, &["1"]).prefer(&["3"]).wants_to_move())
            .merchant(MerchantFixture::vpl("b", 2, &["2"]).prefer(&["3"]).wants_to_move())
            .merchant(
                MerchantFixture::vpl("c", 3, &["3", "4"])
                    .prefer(&["1", "2"])
                    .wants_to_move(),
            )
            .market();
        let config = EngineConfig::default();
        let (scope, summary) = resolve(&market, &config);

        assert_eq!(scope.allocation(&MerchantId::from("a")), Some(&stands(&["1"])[..]));
        assert_eq!(scope.allocation(&MerchantId::from("b")), Some(&stands(&["2"])[..]));
        assert_eq!(scope.allocation(&MerchantId::from("c")), Some(&stands(&["3", "4"])[..]));
        assert_eq!(summary.stayed, 3);
    }

    #[test]
    fn test_equipment_stands_are_avoided() {
        let market = MarketBuilder::new("m")
            .row(&["1", "2", "3"])
            .equipment(&["3"])
            .merchant(MerchantFixture::vpl("a", 1, &["1"]).prefer(&["3"]).wants_to_move())
            .market();
        let config = EngineConfig::default();
        let (scope, summary) = resolve(&market, &config);

        assert_eq!(scope.allocation(&MerchantId::from("a")), Some(&stands(&["1"])[..]));
        assert_eq!(summary.stayed, 1);
    }

    #[test]
    fn test_missing_own_stand_is_rejected() {
        let market = MarketBuilder::new("m")
            .row(&["1", "2"])
            .inactive(&["1"])
            .merchant(MerchantFixture::vpl("a", 1, &["1"]).prefer(&["1"]).wants_to_move())
            .market();
        let config = EngineConfig::default();
        let (scope, _) = resolve(&market, &config);

        assert_eq!(
            scope.rejection(&MerchantId::from("a")),
            Some(RejectionReason::FixedStandUnavailable)
        );
    }

    #[test]
    fn test_inactive_own_stand_is_not_a_destination() {
        let market = MarketBuilder::new("m")
            .row(&["1", "2", "3", "4"])
            .inactive(&["2"])
            .merchant(MerchantFixture::vpl("a", 1, &["2", "3"]).prefer(&["1"]).wants_to_move())
            .market();
        let config = EngineConfig::default();
        let (scope, _) = resolve(&market, &config);

        assert_eq!(scope.allocation(&MerchantId::from("a")), None);
        assert_eq!(
            scope.rejection(&MerchantId::from("a")),
            Some(RejectionReason::FixedStandUnavailable)
        );
    }
}
