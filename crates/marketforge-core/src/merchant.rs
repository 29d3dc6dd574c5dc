//! Merchants and their legal status.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::{CategoryId, MerchantId, StandId};
use crate::stand::BakeType;

/// Legal status of a merchant on the market.
///
/// The status decides which allocation phase handles the merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Permanent holder of a fixed stand.
    Vpl,
    /// Temporary permanent holder.
    Tvpl,
    /// Temporary permanent holder without a stand.
    Tvplz,
    /// Expanding business.
    Eb,
    /// Experimental seller.
    Exp,
    /// Experimental seller, fixed variant.
    Expf,
    /// Applicant.
    Soll,
}

impl Status {
    /// Returns true for statuses that carry a fixed stand entitlement.
    pub fn has_fixed_entitlement(self) -> bool {
        matches!(
            self,
            Status::Vpl | Status::Tvpl | Status::Eb | Status::Exp | Status::Expf
        )
    }

    /// Legal precedence, lower runs first.
    ///
    /// ```
    /// use marketforge_core::Status;
    ///
    /// assert!(Status::Vpl.precedence() < Status::Tvpl.precedence());
    /// assert!(Status::Tvplz.precedence() < Status::Soll.precedence());
    /// ```
    pub fn precedence(self) -> u8 {
        match self {
            Status::Vpl => 0,
            Status::Tvpl => 1,
            Status::Exp | Status::Expf | Status::Eb => 2,
            Status::Tvplz => 3,
            Status::Soll => 4,
        }
    }

    /// Returns the administrative status code.
    pub fn code(self) -> &'static str {
        match self {
            Status::Vpl => "vpl",
            Status::Tvpl => "tvpl",
            Status::Tvplz => "tvplz",
            Status::Eb => "eb",
            Status::Exp => "exp",
            Status::Expf => "expf",
            Status::Soll => "soll",
        }
    }
}

/// A merchant eligible for allocation on the market day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    pub id: MerchantId,
    /// Application number, lower means higher priority.
    pub rank: u32,
    pub status: Status,
    /// Stands owned under a fixed entitlement.
    pub owned: Vec<StandId>,
    /// Preferred stands, most desired first.
    pub preferences: Vec<StandId>,
    pub minimum: usize,
    pub maximum: usize,
    /// Willing to accept stands outside the preference list.
    pub anywhere: bool,
    pub categories: BTreeSet<CategoryId>,
    pub equipment: bool,
    pub bake: BakeType,
    /// Member of the priority ("A") list.
    pub priority_list: bool,
    pub wants_to_move: bool,
}

impl Merchant {
    /// Creates an applicant wanting a single stand.
    pub fn new(id: impl Into<MerchantId>, rank: u32, status: Status) -> Self {
        Self {
            id: id.into(),
            rank,
            status,
            owned: Vec::new(),
            preferences: Vec::new(),
            minimum: 1,
            maximum: 1,
            anywhere: false,
            categories: BTreeSet::new(),
            equipment: false,
            bake: BakeType::None,
            priority_list: false,
            wants_to_move: false,
        }
    }

    /// Returns true for merchants holding fixed stands.
    pub fn is_holder(&self) -> bool {
        self.status.has_fixed_entitlement() && !self.owned.is_empty()
    }

    /// Returns true if the merchant prefers the stand.
    pub fn prefers(&self, stand: &StandId) -> bool {
        self.preferences.contains(stand)
    }

    /// Minimum a validation pass holds this merchant to.
    ///
    /// Holders are never held to more than the stands they own.
    pub fn entitled_minimum(&self) -> usize {
        if self.is_holder() {
            self.minimum.min(self.owned.len())
        } else {
            self.minimum
        }
    }

    /// Ordering key for priority processing: status precedence, then rank.
    pub fn priority_key(&self) -> (u8, u32, &MerchantId) {
        (self.status.precedence(), self.rank, &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holder_requires_owned_stands() {
        let mut vpl = Merchant::new("m1", 1, Status::Vpl);
        assert!(!vpl.is_holder());
        vpl.owned.push(StandId::from("1"));
        assert!(vpl.is_holder());

        let mut soll = Merchant::new("m2", 2, Status::Soll);
        soll.owned.push(StandId::from("2"));
        assert!(!soll.is_holder());
    }

    #[test]
    fn test_entitled_minimum_capped_for_holders() {
        let mut vpl = Merchant::new("m1", 1, Status::Vpl);
        vpl.owned = vec![StandId::from("1")];
        vpl.minimum = 3;
        assert_eq!(vpl.entitled_minimum(), 1);

        let mut soll = Merchant::new("m2", 2, Status::Soll);
        soll.minimum = 3;
        assert_eq!(soll.entitled_minimum(), 3);
    }

    #[test]
    fn test_status_parses_lowercase_codes() {
        let status: Status = serde_json::from_str("\"tvplz\"").unwrap();
        assert_eq!(status, Status::Tvplz);
        assert_eq!(status.code(), "tvplz");
    }
}
