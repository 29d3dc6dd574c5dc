//! Spatial layout of a market.
//!
//! Rows are flattened into one slot sequence. Row ends and obstacles are
//! explicit [`Slot`] markers, so a contiguous run of stands is simply a
//! run of consecutive `Slot::Stand` entries.

use std::collections::{BTreeSet, HashMap};

use marketforge_core::StandId;

/// One position in the flattened layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Stand(StandId),
    /// Start or end of a row.
    Boundary,
    /// Something between two stands that breaks adjacency.
    Obstacle,
}

impl Slot {
    /// Returns the stand id, if this slot is a stand.
    pub fn stand(&self) -> Option<&StandId> {
        match self {
            Slot::Stand(id) => Some(id),
            Slot::Boundary | Slot::Obstacle => None,
        }
    }
}

/// Row-grouped stand layout with boundary and obstacle markers.
///
/// # Example
///
/// ```
/// use marketforge_core::StandId;
/// use marketforge_solver::Layout;
///
/// let rows = vec![
///     vec![StandId::from("1"), StandId::from("2"), StandId::from("3")],
///     vec![StandId::from("4")],
/// ];
/// let obstacles = vec![(StandId::from("2"), StandId::from("3"))];
/// let layout = Layout::new(&rows, &obstacles);
///
/// assert!(layout.are_adjacent(&StandId::from("1"), &StandId::from("2")));
/// assert!(!layout.are_adjacent(&StandId::from("2"), &StandId::from("3")));
/// assert!(!layout.are_adjacent(&StandId::from("3"), &StandId::from("4")));
/// assert_eq!(layout.windows(2).count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Layout {
    slots: Vec<Slot>,
    positions: HashMap<StandId, usize>,
    rows: HashMap<StandId, usize>,
}

impl Layout {
    /// Builds a layout from rows of stand ids and obstacle pairs.
    ///
    /// An obstacle pair only has an effect when the two stands are direct
    /// neighbours in the same row, in either order.
    pub fn new(rows: &[Vec<StandId>], obstacles: &[(StandId, StandId)]) -> Self {
        let blocked: BTreeSet<(&StandId, &StandId)> = obstacles
            .iter()
            .flat_map(|(a, b)| [(a, b), (b, a)])
            .collect();

        let mut slots = vec![Slot::Boundary];
        let mut positions = HashMap::new();
        let mut row_of = HashMap::new();
        for (row_index, row) in rows.iter().enumerate() {
            for (i, id) in row.iter().enumerate() {
                if i > 0 && blocked.contains(&(&row[i - 1], id)) {
                    slots.push(Slot::Obstacle);
                }
                positions.insert(id.clone(), slots.len());
                row_of.insert(id.clone(), row_index);
                slots.push(Slot::Stand(id.clone()));
            }
            slots.push(Slot::Boundary);
        }

        Self {
            slots,
            positions,
            rows: row_of,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of stands in the layout.
    pub fn stand_count(&self) -> usize {
        self.positions.len()
    }

    pub fn contains(&self, id: &StandId) -> bool {
        self.positions.contains_key(id)
    }

    /// Slot index of a stand, which is also its scan order.
    pub fn position(&self, id: &StandId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn row_of(&self, id: &StandId) -> Option<usize> {
        self.rows.get(id).copied()
    }

    /// Returns true if two stands sit directly next to each other with no
    /// obstacle or row end between them.
    pub fn are_adjacent(&self, a: &StandId, b: &StandId) -> bool {
        match (self.position(a), self.position(b)) {
            (Some(pa), Some(pb)) => pa.abs_diff(pb) == 1,
            _ => false,
        }
    }

    /// Stands directly next to `id`.
    pub fn neighbours(&self, id: &StandId) -> Vec<&StandId> {
        let Some(pos) = self.position(id) else {
            return Vec::new();
        };
        [pos.checked_sub(1), Some(pos + 1)]
            .into_iter()
            .flatten()
            .filter_map(|p| self.slots.get(p).and_then(Slot::stand))
            .collect()
    }

    /// All runs of `size` consecutive stands, in scan order.
    ///
    /// A run never crosses a row boundary or an obstacle.
    pub fn windows(&self, size: usize) -> impl Iterator<Item = Vec<&StandId>> + '_ {
        let size = size.max(1);
        self.slots.windows(size).filter_map(|window| {
            window
                .iter()
                .map(Slot::stand)
                .collect::<Option<Vec<&StandId>>>()
        })
    }

    /// Sorts stands into scan order; stands outside the layout go last.
    pub fn ordered(&self, stands: &[StandId]) -> Vec<StandId> {
        let mut sorted = stands.to_vec();
        sorted.sort_by_key(|id| (self.position(id).unwrap_or(usize::MAX), id.clone()));
        sorted
    }

    /// Splits a stand set into maximal contiguous runs, in scan order.
    ///
    /// Stands missing from the layout each form a run of their own.
    pub fn runs(&self, stands: &[StandId]) -> Vec<Vec<StandId>> {
        let mut runs: Vec<Vec<StandId>> = Vec::new();
        for id in self.ordered(stands) {
            let extends = runs
                .last()
                .and_then(|run| run.last())
                .is_some_and(|prev| self.are_adjacent(prev, &id));
            match runs.last_mut() {
                Some(run) if extends => run.push(id),
                _ => runs.push(vec![id]),
            }
        }
        runs
    }

    /// Returns true if the stands form a single contiguous run.
    pub fn is_contiguous(&self, stands: &[StandId]) -> bool {
        self.runs(stands).len() <= 1
    }
}
