//! Transient obstacles contributed by higher-priority pipes.
//!
//! An [`ObstacleSet`] is the frozen snapshot passed into one planner call:
//! every cell already claimed by a higher-priority pipe, expanded by the
//! separation the planned pipe must keep from it. It is built once per call
//! and only read afterwards, so many planners may share it.
//!
//! # Example
//!
//! ```
//! use pipe_pathfind::ObstacleSet;
//! use pipe_types::CellPath;
//! use pipe_grid::Cell;
//!
//! let higher = CellPath::new(vec![Cell::new(0, 0, 0), Cell::new(1, 0, 0)]);
//!
//! let mut obstacles = ObstacleSet::new();
//! obstacles.add_path(&higher, 1);
//!
//! // Two 3x3x3 cubes overlapping in 18 cells
//! assert_eq!(obstacles.len(), 36);
//! assert!(obstacles.contains(Cell::new(2, 1, -1)));
//! assert!(!obstacles.contains(Cell::new(3, 0, 0)));
//! ```

use hashbrown::HashSet;
use pipe_grid::{Cell, GridBounds};
use pipe_types::CellPath;

/// Cells a pipe must not enter because of higher-priority pipes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObstacleSet {
    cells: HashSet<Cell>,
}

impl ObstacleSet {
    /// Creates an empty obstacle set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an obstacle set from raw cells (no expansion).
    #[must_use]
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    /// Blocks every cell within Chebyshev distance `separation` of the path.
    pub fn add_path(&mut self, path: &CellPath, separation: u32) {
        if separation == 0 {
            self.cells.extend(path.iter().copied());
            return;
        }
        for &cell in path {
            self.cells.extend(GridBounds::around(cell, separation).iter());
        }
    }

    /// Consuming variant of [`add_path`](Self::add_path).
    #[must_use]
    pub fn with_path(mut self, path: &CellPath, separation: u32) -> Self {
        self.add_path(path, separation);
        self
    }

    /// Returns `true` if the cell is blocked.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Returns the number of blocked cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no cell is blocked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
