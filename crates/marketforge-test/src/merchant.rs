//! Merchant fixtures.

use chrono::NaiveDate;
use marketforge_core::{BakeType, CategoryId, MerchantId, MerchantSnapshot, StandId, Status};

/// A merchant with its attendance, list membership and preferences.
#[derive(Debug, Clone)]
pub struct MerchantFixture {
    pub snapshot: MerchantSnapshot,
    /// Explicit attendance, `None` leaves the entry out.
    pub present: Option<bool>,
    pub priority_list: bool,
    /// Preferred stands, most desired first.
    pub preferences: Vec<StandId>,
}

impl MerchantFixture {
    /// A merchant that registered as present.
    pub fn new(id: &str, rank: u32, status: Status) -> Self {
        Self {
            snapshot: MerchantSnapshot::new(id, rank, status),
            present: Some(true),
            priority_list: false,
            preferences: Vec::new(),
        }
    }

    pub fn soll(id: &str, rank: u32) -> Self {
        Self::new(id, rank, Status::Soll)
    }

    pub fn tvplz(id: &str, rank: u32) -> Self {
        Self::new(id, rank, Status::Tvplz)
    }

    pub fn exp(id: &str, rank: u32) -> Self {
        Self::new(id, rank, Status::Exp)
    }

    /// A permanent holder of the given stands, present by default.
    pub fn vpl(id: &str, rank: u32, owned: &[&str]) -> Self {
        Self::holder(id, rank, Status::Vpl, owned)
    }

    pub fn tvpl(id: &str, rank: u32, owned: &[&str]) -> Self {
        Self::holder(id, rank, Status::Tvpl, owned)
    }

    fn holder(id: &str, rank: u32, status: Status, owned: &[&str]) -> Self {
        let mut fixture = Self::new(id, rank, status);
        fixture.present = None;
        fixture.snapshot.owned_stands = owned.iter().map(|s| StandId::from(*s)).collect();
        fixture
    }

    pub fn id(&self) -> &MerchantId {
        &self.snapshot.id
    }

    pub fn minimum(mut self, minimum: usize) -> Self {
        self.snapshot.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: usize) -> Self {
        self.snapshot.maximum = Some(maximum);
        self
    }

    pub fn anywhere(mut self) -> Self {
        self.snapshot.anywhere = Some(true);
        self
    }

    /// Appends preferred stands, most desired first.
    pub fn prefer(mut self, stands: &[&str]) -> Self {
        self.preferences
            .extend(stands.iter().map(|s| StandId::from(*s)));
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.snapshot.categories.push(CategoryId::from(category));
        self
    }

    pub fn equipment(mut self) -> Self {
        self.snapshot.equipment = true;
        self
    }

    pub fn bake(mut self, bake: BakeType) -> Self {
        self.snapshot.bake_type = Some(bake);
        self
    }

    pub fn wants_to_move(mut self) -> Self {
        self.snapshot.wants_to_move = Some(true);
        self
    }

    /// Puts the merchant on the priority ("A") list.
    pub fn a_list(mut self) -> Self {
        self.priority_list = true;
        self
    }

    pub fn absent(mut self) -> Self {
        self.present = Some(false);
        self
    }

    /// Leaves the merchant out of the attendance list.
    pub fn unregistered(mut self) -> Self {
        self.present = None;
        self
    }

    pub fn absent_between(mut self, from: NaiveDate, until: NaiveDate) -> Self {
        self.snapshot.absent_from = Some(from);
        self.snapshot.absent_until = Some(until);
        self
    }
}
