//! Contiguous-cluster search.
//!
//! A cluster is a run of adjacent stands inside one row that a merchant
//! could legally take right now. Windows are slid over the layout slots,
//! so row boundaries and obstacles are never crossed.

use std::collections::BTreeSet;

use marketforge_core::{Market, Merchant, StandId};
use tracing::trace;

use crate::layout::Layout;
use crate::legality::{Legality, MarketPressure};
use crate::pool::StandPool;

/// How a window relates to the candidate stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// Every stand in the window is a candidate.
    All,
    /// At least one stand in the window is a candidate.
    Any,
    /// Candidates only order the windows.
    Anywhere,
}

impl MatchMode {
    fn matches<'s>(self, mut stands: impl Iterator<Item = &'s StandId>, candidates: &[StandId]) -> bool {
        match self {
            MatchMode::All => stands.all(|s| candidates.contains(s)),
            MatchMode::Any => stands.any(|s| candidates.contains(s)),
            MatchMode::Anywhere => true,
        }
    }
}

/// Parameters of one search.
#[derive(Debug, Clone)]
pub struct ClusterQuery<'q> {
    merchant: &'q Merchant,
    candidates: &'q [StandId],
    size: usize,
    mode: MatchMode,
    avoid_relocation: bool,
    ignore_reserved: bool,
    exempt: BTreeSet<StandId>,
}

impl<'q> ClusterQuery<'q> {
    /// Searches `size` stands for `merchant`, anywhere in the layout.
    pub fn new(merchant: &'q Merchant, size: usize) -> Self {
        Self {
            merchant,
            candidates: &[],
            size,
            mode: MatchMode::Anywhere,
            avoid_relocation: false,
            ignore_reserved: false,
            exempt: BTreeSet::new(),
        }
    }

    /// Candidate stands, most desired first.
    pub fn candidates(mut self, candidates: &'q [StandId]) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Applies the stricter relocation legality.
    pub fn avoid_relocation(mut self) -> Self {
        self.avoid_relocation = true;
        self
    }

    /// Treats stands reserved for other merchants as free.
    pub fn ignore_reserved(mut self) -> Self {
        self.ignore_reserved = true;
        self
    }

    /// Stands that count as available regardless of the pool.
    pub fn exempt(mut self, stands: impl IntoIterator<Item = StandId>) -> Self {
        self.exempt.extend(stands);
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Position of the best candidate in the window, `usize::MAX` if none.
    fn score<'s>(&self, stands: impl Iterator<Item = &'s StandId>) -> usize {
        stands
            .filter_map(|s| self.candidates.iter().position(|c| c == s))
            .min()
            .unwrap_or(usize::MAX)
    }
}

/// Finds legal, available clusters on the current state of a run.
#[derive(Debug)]
pub struct ClusterFinder<'a> {
    layout: &'a Layout,
    market: &'a Market,
    pool: &'a StandPool,
    pressure: MarketPressure,
}

impl<'a> ClusterFinder<'a> {
    pub fn new(
        layout: &'a Layout,
        market: &'a Market,
        pool: &'a StandPool,
        pressure: MarketPressure,
    ) -> Self {
        Self {
            layout,
            market,
            pool,
            pressure,
        }
    }

    /// All valid windows for the query, best first.
    ///
    /// Windows holding a more desired candidate come first; ties keep
    /// layout order.
    pub fn find_cluster(&self, query: &ClusterQuery<'_>) -> Vec<Vec<StandId>> {
        if query.size == 0 {
            return Vec::new();
        }
        let legality = self.legality(query);
        let mut scored: Vec<(usize, Vec<StandId>)> = self
            .layout
            .windows(query.size)
            .filter(|window| query.mode.matches(window.iter().copied(), query.candidates))
            .filter(|window| window.iter().all(|id| self.is_usable(id, query, &legality)))
            .map(|window| {
                let score = query.score(window.iter().copied());
                (score, window.into_iter().cloned().collect())
            })
            .collect();
        scored.sort_by_key(|(score, _)| *score);

        trace!(
            event = "cluster_search",
            merchant = %query.merchant.id,
            size = query.size,
            mode = ?query.mode,
            found = scored.len(),
        );
        scored.into_iter().map(|(_, cluster)| cluster).collect()
    }

    /// The best window for the query.
    pub fn best_cluster(&self, query: &ClusterQuery<'_>) -> Option<Vec<StandId>> {
        self.find_cluster(query).into_iter().next()
    }

    /// Like [`find_cluster`](Self::find_cluster) without the candidate
    /// membership requirement.
    pub fn find_cluster_anywhere(&self, query: &ClusterQuery<'_>) -> Vec<Vec<StandId>> {
        self.find_cluster(&query.clone().mode(MatchMode::Anywhere))
    }

    /// Windows of the query size that contain every stand in `fixed`.
    ///
    /// Only the added stands are checked for availability, legality and
    /// candidate membership. The merchant's own stands never block it.
    pub fn find_valid_expansion(
        &self,
        query: &ClusterQuery<'_>,
        fixed: &[StandId],
    ) -> Vec<Vec<StandId>> {
        if query.size <= fixed.len() {
            return Vec::new();
        }
        let legality = self.legality(query);
        let mut scored: Vec<(usize, Vec<StandId>)> = self
            .layout
            .windows(query.size)
            .filter(|window| fixed.iter().all(|f| window.contains(&f)))
            .filter_map(|window| {
                let added: Vec<&StandId> = window
                    .iter()
                    .copied()
                    .filter(|id| !fixed.contains(id))
                    .collect();
                let valid = query.mode.matches(added.iter().copied(), query.candidates)
                    && added.iter().all(|id| self.is_usable(id, query, &legality));
                valid.then(|| {
                    let score = query.score(added.into_iter());
                    (score, window.into_iter().cloned().collect())
                })
            })
            .collect();
        scored.sort_by_key(|(score, _)| *score);
        scored.into_iter().map(|(_, cluster)| cluster).collect()
    }

    /// The best expansion of `fixed` to the query size.
    pub fn best_expansion(&self, query: &ClusterQuery<'_>, fixed: &[StandId]) -> Option<Vec<StandId>> {
        self.find_valid_expansion(query, fixed).into_iter().next()
    }

    pub fn pressure(&self) -> &MarketPressure {
        &self.pressure
    }

    pub fn pool(&self) -> &StandPool {
        self.pool
    }

    fn legality(&self, query: &ClusterQuery<'_>) -> Legality<'_> {
        Legality::new(self.market, &self.pressure).with_relocation_avoidance(query.avoid_relocation)
    }

    fn is_usable(&self, id: &StandId, query: &ClusterQuery<'_>, legality: &Legality<'_>) -> bool {
        let available = query.exempt.contains(id)
            || self
                .pool
                .is_free_for(id, &query.merchant.id, query.ignore_reserved);
        if !available {
            return false;
        }
        self.market
            .stand(id)
            .is_some_and(|stand| legality.permits(query.merchant, stand))
    }
}
