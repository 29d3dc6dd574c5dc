//! Pool of stands not yet allocated.

use std::collections::{BTreeMap, BTreeSet};

use marketforge_core::{MerchantId, StandId};

/// Available stands plus the reservations held on some of them.
///
/// A reserved stand is still in the pool; it is only unavailable to
/// merchants other than the one holding the reservation.
#[derive(Debug, Clone, Default)]
pub struct StandPool {
    available: BTreeSet<StandId>,
    reserved: BTreeMap<StandId, MerchantId>,
}

impl StandPool {
    pub fn new(stands: impl IntoIterator<Item = StandId>) -> Self {
        Self {
            available: stands.into_iter().collect(),
            reserved: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    pub fn contains(&self, id: &StandId) -> bool {
        self.available.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StandId> {
        self.available.iter()
    }

    /// Stands in the pool that nobody has reserved.
    pub fn unreserved(&self) -> impl Iterator<Item = &StandId> {
        self.available
            .iter()
            .filter(|id| !self.reserved.contains_key(*id))
    }

    /// Returns true if `merchant` may take the stand.
    pub fn is_free_for(&self, id: &StandId, merchant: &MerchantId, ignore_reserved: bool) -> bool {
        if !self.available.contains(id) {
            return false;
        }
        match self.reserved.get(id) {
            Some(holder) => ignore_reserved || holder == merchant,
            None => true,
        }
    }

    /// Removes a stand from the pool, dropping any reservation on it.
    ///
    /// Returns false if the stand was not available.
    pub fn take(&mut self, id: &StandId) -> bool {
        self.reserved.remove(id);
        self.available.remove(id)
    }

    /// Returns a stand to the pool.
    pub fn release(&mut self, id: StandId) {
        self.available.insert(id);
    }

    /// Reserves an available stand for a merchant.
    ///
    /// Returns false if the stand is gone or already reserved.
    pub fn reserve(&mut self, id: &StandId, merchant: &MerchantId) -> bool {
        if !self.available.contains(id) || self.reserved.contains_key(id) {
            return false;
        }
        self.reserved.insert(id.clone(), merchant.clone());
        true
    }

    pub fn reservation(&self, id: &StandId) -> Option<&MerchantId> {
        self.reserved.get(id)
    }

    pub fn reservation_count(&self) -> usize {
        self.reserved.len()
    }

    /// Drops every reservation and returns how many there were.
    pub fn clear_reservations(&mut self) -> usize {
        let count = self.reserved.len();
        self.reserved.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> StandPool {
        StandPool::new(["1", "2", "3"].map(StandId::from))
    }

    #[test]
    fn test_take_and_release() {
        let mut pool = pool();
        assert!(pool.take(&StandId::from("2")));
        assert!(!pool.take(&StandId::from("2")));
        assert_eq!(pool.len(), 2);

        pool.release(StandId::from("2"));
        assert!(pool.contains(&StandId::from("2")));
    }

    #[test]
    fn test_reservation_blocks_others() {
        let mut pool = pool();
        let owner = MerchantId::from("vpl");
        let other = MerchantId::from("soll");
        let stand = StandId::from("1");

        assert!(pool.reserve(&stand, &owner));
        assert!(!pool.reserve(&stand, &other));
        assert!(pool.is_free_for(&stand, &owner, false));
        assert!(!pool.is_free_for(&stand, &other, false));
        assert!(pool.is_free_for(&stand, &other, true));
        assert_eq!(pool.unreserved().count(), 2);
    }

    #[test]
    fn test_take_drops_reservation() {
        let mut pool = pool();
        let stand = StandId::from("1");
        pool.reserve(&stand, &MerchantId::from("vpl"));
        pool.take(&stand);
        assert_eq!(pool.reservation_count(), 0);
        assert_eq!(pool.clear_reservations(), 0);
    }
}
