//! Pairwise clearance conflicts between routed pipes.
//!
//! Detection indexes every occupied cell by the pipes using it and then
//! checks, for each cell of each pipe, only the neighborhood that could
//! violate clearance. The work is proportional to the number of occupied
//! cells, not to the number of pipe pairs.
//!
//! # Example
//!
//! ```
//! use pipe_pbs::find_conflicts;
//! use pipe_types::{CellPath, ClearanceTable, PipeId, PipeSpec};
//! use pipe_grid::Cell;
//!
//! let a = PipeSpec::new(PipeId::new(0), Cell::new(0, 1, 0), Cell::new(2, 1, 0));
//! let b = PipeSpec::new(PipeId::new(1), Cell::new(1, 0, 0), Cell::new(1, 2, 0));
//! let pa = CellPath::new((0..3).map(|x| Cell::new(x, 1, 0)).collect());
//! let pb = CellPath::new((0..3).map(|y| Cell::new(1, y, 0)).collect());
//!
//! let conflicts = find_conflicts([(&a, &pa), (&b, &pb)], &ClearanceTable::new());
//! assert_eq!(conflicts.len(), 1);
//! assert_eq!(conflicts[0].pair(), (PipeId::new(0), PipeId::new(1)));
//! assert!(conflicts[0].cells().contains(&Cell::new(1, 1, 0)));
//! ```

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap;
use pipe_grid::{Cell, GridBounds};
use pipe_types::{CellPath, ClearanceTable, PipeId, PipeSpec};
use smallvec::SmallVec;

/// Two pipes whose paths violate the required clearance.
///
/// The pair is unordered; it is stored with the smaller identifier first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conflict {
    a: PipeId,
    b: PipeId,
    cells: BTreeSet<Cell>,
}

impl Conflict {
    /// Creates a conflict, normalizing the pair order.
    #[must_use]
    pub fn new(x: PipeId, y: PipeId, cells: BTreeSet<Cell>) -> Self {
        let (a, b) = if x <= y { (x, y) } else { (y, x) };
        Self { a, b, cells }
    }

    /// Returns the pair, smaller identifier first.
    #[must_use]
    pub const fn pair(&self) -> (PipeId, PipeId) {
        (self.a, self.b)
    }

    /// Returns the cells of either pipe that take part in the violation.
    #[must_use]
    pub const fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    /// Returns `true` if the conflict involves the pipe.
    #[must_use]
    pub fn involves(&self, pipe: PipeId) -> bool {
        self.a == pipe || self.b == pipe
    }
}

/// Finds every pairwise clearance conflict among the given paths.
///
/// The result is sorted by pipe pair, so the first conflict is the one with
/// the lowest pair. Pipes whose diameter class is unknown to the table are
/// treated as radius zero.
pub fn find_conflicts<'p, I>(paths: I, clearance: &ClearanceTable) -> Vec<Conflict>
where
    I: IntoIterator<Item = (&'p PipeSpec, &'p CellPath)>,
{
    let entries: Vec<(&PipeSpec, &CellPath)> = paths.into_iter().collect();
    let radius = |spec: &PipeSpec| clearance.radius(spec.class()).unwrap_or(0);
    let max_radius = entries.iter().map(|(s, _)| radius(s)).max().unwrap_or(0);

    let mut index: HashMap<Cell, SmallVec<[usize; 2]>> = HashMap::new();
    for (i, (_, path)) in entries.iter().enumerate() {
        for &cell in path.iter() {
            let users = index.entry(cell).or_default();
            if users.last() != Some(&i) {
                users.push(i);
            }
        }
    }

    let mut found: BTreeMap<(PipeId, PipeId), BTreeSet<Cell>> = BTreeMap::new();
    for (i, (spec, path)) in entries.iter().enumerate() {
        let reach = radius(spec).saturating_add(max_radius);
        for &cell in path.iter() {
            for nearby in GridBounds::around(cell, reach).iter() {
                let Some(users) = index.get(&nearby) else {
                    continue;
                };
                for &j in users.iter().filter(|&&j| j > i) {
                    let other = entries[j].0;
                    let separation = radius(spec).saturating_add(radius(other));
                    if ClearanceTable::violates(cell, nearby, separation) {
                        let key = ordered(spec.id(), other.id());
                        let cells = found.entry(key).or_default();
                        cells.insert(cell);
                        cells.insert(nearby);
                    }
                }
            }
        }
    }

    found
        .into_iter()
        .map(|((a, b), cells)| Conflict::new(a, b, cells))
        .collect()
}

fn ordered(x: PipeId, y: PipeId) -> (PipeId, PipeId) {
    if x <= y { (x, y) } else { (y, x) }
}
