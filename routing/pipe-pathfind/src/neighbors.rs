//! Neighbor generation for the 6-connected pipe grid.
//!
//! # Example
//!
//! ```
//! use pipe_pathfind::{NeighborGenerator, ObstacleSet};
//! use pipe_grid::{Cell, GridBounds, GridEnvironment};
//!
//! let env = GridEnvironment::new(GridBounds::from_size(5, 5, 5).unwrap());
//! let obstacles = ObstacleSet::from_cells([Cell::new(3, 2, 2)]);
//! let generator = NeighborGenerator::new(&env, &obstacles);
//!
//! // 6 face neighbors minus the obstacle
//! assert_eq!(generator.neighbors(Cell::new(2, 2, 2)).len(), 5);
//! // corner cell: 3 neighbors are outside the grid
//! assert_eq!(generator.neighbors(Cell::origin()).len(), 3);
//! ```

use pipe_grid::{Cell, Direction, GridEnvironment};
use smallvec::SmallVec;

use crate::obstacles::ObstacleSet;

/// Free face neighbors of a cell, tagged with the move direction.
pub type Neighbors = SmallVec<[(Cell, Direction); 6]>;

/// Generator for valid neighboring cells during planning.
///
/// A cell is free when it is inside the grid, not permanently blocked and
/// not in the transient obstacle set.
#[derive(Debug, Clone, Copy)]
pub struct NeighborGenerator<'a> {
    env: &'a GridEnvironment,
    obstacles: &'a ObstacleSet,
}

impl<'a> NeighborGenerator<'a> {
    /// Creates a generator over an environment and an obstacle snapshot.
    #[must_use]
    pub const fn new(env: &'a GridEnvironment, obstacles: &'a ObstacleSet) -> Self {
        Self { env, obstacles }
    }

    /// Checks if a cell can be entered.
    #[must_use]
    pub fn is_free(&self, cell: Cell) -> bool {
        !self.env.is_blocked(cell) && !self.obstacles.contains(cell)
    }

    /// Returns the free face neighbors of `cell` in [`Direction::ALL`] order.
    #[must_use]
    pub fn neighbors(&self, cell: Cell) -> Neighbors {
        Direction::ALL
            .into_iter()
            .map(|d| (cell.step(d), d))
            .filter(|&(n, _)| self.is_free(n))
            .collect()
    }
}
