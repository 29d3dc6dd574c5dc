//! Placing a single queued merchant.

use marketforge_core::{Merchant, RejectionReason};
use tracing::debug;

use crate::cluster::{ClusterQuery, MatchMode};
use crate::error::Result;
use crate::scope::RunScope;

/// Where a placement may look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Search {
    /// Preferred stands, then anywhere if the merchant allows it.
    Preferred,
    /// Preferred stands, then anywhere regardless of the merchant's flag.
    Anywhere,
    /// Preferred stands only.
    PreferencesOnly,
}

/// Rules for one placement.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub search: Search,
    pub ignore_reserved: bool,
    pub check_capacity: bool,
}

impl Placement {
    pub fn new(search: Search) -> Self {
        Self {
            search,
            ignore_reserved: false,
            check_capacity: false,
        }
    }

    pub fn ignore_reserved(mut self) -> Self {
        self.ignore_reserved = true;
        self
    }

    pub fn check_capacity(mut self, check: bool) -> Self {
        self.check_capacity = check;
        self
    }

    fn may_go_anywhere(&self, merchant: &Merchant) -> bool {
        match self.search {
            Search::Preferred => merchant.anywhere,
            Search::Anywhere => true,
            Search::PreferencesOnly => false,
        }
    }

    fn base_query<'q>(&self, merchant: &'q Merchant, size: usize) -> ClusterQuery<'q> {
        let query = ClusterQuery::new(merchant, size).candidates(&merchant.preferences);
        if self.ignore_reserved {
            query.ignore_reserved()
        } else {
            query
        }
    }
}

/// Tries to allocate `merchant.minimum` contiguous stands.
///
/// Attempts every preferred stand, then at least one preferred stand,
/// then (when allowed) any stand. On failure the rejection reason is
/// noted on the scope and `false` is returned.
pub fn place(scope: &mut RunScope<'_>, merchant: &Merchant, rules: Placement) -> Result<bool> {
    let size = merchant.minimum;
    if rules.check_capacity && !scope.guard().allocation_allowed(&merchant.categories, size) {
        debug!(event = "category_full", merchant = %merchant.id, size);
        scope.note_failure(&merchant.id, RejectionReason::CategoryFull);
        return Ok(false);
    }

    let cluster = {
        let finder = scope.finder();
        let query = rules.base_query(merchant, size);
        finder
            .best_cluster(&query.clone().mode(MatchMode::All))
            .or_else(|| finder.best_cluster(&query.clone().mode(MatchMode::Any)))
            .or_else(|| {
                if rules.may_go_anywhere(merchant) {
                    finder.find_cluster_anywhere(&query).into_iter().next()
                } else {
                    None
                }
            })
    };

    match cluster {
        Some(stands) => {
            scope.allocate(&merchant.id, stands)?;
            Ok(true)
        }
        None => {
            let reason = diagnose(scope, merchant, rules);
            debug!(event = "unplaced", merchant = %merchant.id, reason = ?reason);
            scope.note_failure(&merchant.id, reason);
            Ok(false)
        }
    }
}

/// Why no cluster could be found.
fn diagnose(scope: &RunScope<'_>, merchant: &Merchant, rules: Placement) -> RejectionReason {
    let free = if rules.ignore_reserved {
        scope.pool().len()
    } else {
        scope.pool().unreserved().count()
    };
    if free == 0 {
        return RejectionReason::MarketFull;
    }
    if merchant.minimum > 1 {
        let single = rules.base_query(merchant, 1);
        if !scope.finder().find_cluster_anywhere(&single).is_empty() {
            return RejectionReason::MinimumUnavailable;
        }
    }
    if !rules.may_go_anywhere(merchant) {
        return RejectionReason::PreferenceUnavailable;
    }
    RejectionReason::MarketFull
}

/// Gives a holder exactly the stands it owns.
///
/// Rejects with [`RejectionReason::FixedStandUnavailable`] when any owned
/// stand is no longer free.
pub fn allocate_own_stands(scope: &mut RunScope<'_>, merchant: &Merchant) -> Result<bool> {
    let all_free = merchant.owned.iter().all(|s| scope.pool().contains(s));
    if merchant.owned.is_empty() || !all_free {
        scope.reject(&merchant.id, RejectionReason::FixedStandUnavailable)?;
        return Ok(false);
    }
    scope.allocate(&merchant.id, merchant.owned.clone())?;
    Ok(true)
}
