//! Per-category capacity guard.

use std::collections::{BTreeMap, BTreeSet};

use marketforge_core::{CategoryId, TradeCategory};

#[derive(Debug, Clone, PartialEq, Eq)]
struct CategoryCounter {
    count: usize,
    maximum: Option<usize>,
}

/// Counts stand allocations per required trade category.
///
/// Only applicants are ever refused by the guard. Holders are counted but
/// may push a category past its maximum, which protects incumbents.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
/// use marketforge_core::{CategoryId, TradeCategory};
/// use marketforge_solver::CapacityGuard;
///
/// let kaas = TradeCategory::required("kaas", Some(2));
/// let mut guard = CapacityGuard::new([&kaas], None);
/// let tags: BTreeSet<CategoryId> = [CategoryId::from("kaas")].into();
///
/// assert!(guard.allocation_allowed(&tags, 2));
/// guard.add_allocation(&tags, 2);
/// assert!(!guard.allocation_allowed(&tags, 1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CapacityGuard {
    counters: BTreeMap<CategoryId, CategoryCounter>,
}

impl CapacityGuard {
    /// Creates counters for every required category.
    ///
    /// `default_maximum` applies to required categories without one.
    pub fn new<'a>(
        categories: impl IntoIterator<Item = &'a TradeCategory>,
        default_maximum: Option<usize>,
    ) -> Self {
        let counters = categories
            .into_iter()
            .filter(|c| c.required)
            .map(|c| {
                let counter = CategoryCounter {
                    count: 0,
                    maximum: c.maximum.or(default_maximum),
                };
                (c.id.clone(), counter)
            })
            .collect();
        Self { counters }
    }

    /// Returns false if adding `stands` would push any of the categories
    /// past its maximum.
    pub fn allocation_allowed(&self, categories: &BTreeSet<CategoryId>, stands: usize) -> bool {
        categories.iter().all(|id| match self.counters.get(id) {
            Some(CategoryCounter {
                count,
                maximum: Some(max),
            }) => count + stands <= *max,
            _ => true,
        })
    }

    pub fn add_allocation(&mut self, categories: &BTreeSet<CategoryId>, stands: usize) {
        for id in categories {
            if let Some(counter) = self.counters.get_mut(id) {
                counter.count += stands;
            }
        }
    }

    /// Undoes an allocation released during reclaim.
    pub fn remove_allocation(&mut self, categories: &BTreeSet<CategoryId>, stands: usize) {
        for id in categories {
            if let Some(counter) = self.counters.get_mut(id) {
                counter.count = counter.count.saturating_sub(stands);
            }
        }
    }

    pub fn count(&self, category: &CategoryId) -> usize {
        self.counters.get(category).map_or(0, |c| c.count)
    }

    pub fn maximum(&self, category: &CategoryId) -> Option<usize> {
        self.counters.get(category).and_then(|c| c.maximum)
    }

    /// Returns true if the category has reached its maximum.
    pub fn is_full(&self, category: &CategoryId) -> bool {
        self.counters
            .get(category)
            .and_then(|c| c.maximum.map(|max| c.count >= max))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(ids: &[&str]) -> BTreeSet<CategoryId> {
        ids.iter().map(|s| CategoryId::from(*s)).collect()
    }

    #[test]
    fn test_unbounded_and_unknown_categories_always_allowed() {
        let open = TradeCategory::required("vis", None);
        let optional = TradeCategory::new("bloemen");
        let guard = CapacityGuard::new([&open, &optional], None);

        assert!(guard.allocation_allowed(&tags(&["vis", "bloemen", "onbekend"]), 1000));
    }

    #[test]
    fn test_default_maximum_applies_to_required_only() {
        let open = TradeCategory::required("vis", None);
        let mut guard = CapacityGuard::new([&open], Some(1));

        assert_eq!(guard.maximum(&CategoryId::from("vis")), Some(1));
        guard.add_allocation(&tags(&["vis"]), 1);
        assert!(guard.is_full(&CategoryId::from("vis")));
        assert!(!guard.allocation_allowed(&tags(&["vis"]), 1));
    }

    #[test]
    fn test_any_full_category_blocks() {
        let kaas = TradeCategory::required("kaas", Some(1));
        let vis = TradeCategory::required("vis", Some(5));
        let mut guard = CapacityGuard::new([&kaas, &vis], None);
        guard.add_allocation(&tags(&["kaas"]), 1);

        assert!(!guard.allocation_allowed(&tags(&["kaas", "vis"]), 1));
        assert!(guard.allocation_allowed(&tags(&["vis"]), 1));
    }

    #[test]
    fn test_holders_may_exceed_and_removal_restores() {
        let kaas = TradeCategory::required("kaas", Some(1));
        let mut guard = CapacityGuard::new([&kaas], None);
        guard.add_allocation(&tags(&["kaas"]), 3);
        assert_eq!(guard.count(&CategoryId::from("kaas")), 3);

        guard.remove_allocation(&tags(&["kaas"]), 3);
        assert_eq!(guard.count(&CategoryId::from("kaas")), 0);
        assert!(guard.allocation_allowed(&tags(&["kaas"]), 1));
    }
}
