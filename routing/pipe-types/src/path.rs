//! Path representations for routed pipes.
//!
//! - [`CellPath`]: an ordered sequence of face-adjacent grid cells
//! - [`PipePath`]: a [`CellPath`] bound to the pipe it belongs to, with its
//!   measured [`PathCost`]
//!
//! # Example
//!
//! ```
//! use pipe_types::CellPath;
//! use pipe_grid::Cell;
//!
//! let path = CellPath::new(vec![
//!     Cell::new(0, 0, 0),
//!     Cell::new(1, 0, 0),
//!     Cell::new(1, 1, 0),
//! ]);
//! assert_eq!(path.moves(), 2);
//! assert_eq!(path.bends(), 1);
//! assert!(path.is_connected());
//! ```

use pipe_grid::{Cell, Direction};

use crate::cost::PathCost;
use crate::pipe::PipeId;

/// An ordered sequence of cells from a pipe's start to its goal.
///
/// Consecutive cells of a valid path are face-adjacent (exactly one axis
/// changes by one unit). A bend is any interior cell where the direction
/// of travel differs from the previous move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellPath {
    cells: Vec<Cell>,
}

impl CellPath {
    /// Creates a path from a sequence of cells.
    #[must_use]
    pub const fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Creates the zero-length path occupying a single cell.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_types::CellPath;
    /// use pipe_grid::Cell;
    ///
    /// let path = CellPath::single(Cell::origin());
    /// assert_eq!(path.len(), 1);
    /// assert_eq!(path.moves(), 0);
    /// assert_eq!(path.bends(), 0);
    /// ```
    #[must_use]
    pub fn single(cell: Cell) -> Self {
        Self { cells: vec![cell] }
    }

    /// Returns the number of cells in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the path has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the number of unit moves (cells minus one).
    #[must_use]
    pub fn moves(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Returns the cells as a slice.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns the first cell, if any.
    #[must_use]
    pub fn start(&self) -> Option<Cell> {
        self.cells.first().copied()
    }

    /// Returns the last cell, if any.
    #[must_use]
    pub fn end(&self) -> Option<Cell> {
        self.cells.last().copied()
    }

    /// Returns an iterator over the cells.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Returns the direction of each move, or `None` for a non-adjacent step.
    pub fn directions(&self) -> impl Iterator<Item = Option<Direction>> + '_ {
        self.cells
            .windows(2)
            .map(|pair| Direction::between(pair[0], pair[1]))
    }

    /// Counts direction changes along the path.
    #[must_use]
    pub fn bends(&self) -> usize {
        let dirs: Vec<_> = self.directions().collect();
        dirs.windows(2).filter(|pair| pair[0] != pair[1]).count()
    }

    /// Returns `true` if every consecutive pair of cells is face-adjacent.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_types::CellPath;
    /// use pipe_grid::Cell;
    ///
    /// let diagonal = CellPath::new(vec![Cell::new(0, 0, 0), Cell::new(1, 1, 0)]);
    /// assert!(!diagonal.is_connected());
    /// ```
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.directions().all(|d| d.is_some())
    }

    /// Returns `true` if the path visits the cell.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }
}

impl From<Vec<Cell>> for CellPath {
    fn from(cells: Vec<Cell>) -> Self {
        Self::new(cells)
    }
}

impl<'a> IntoIterator for &'a CellPath {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

/// The path computed for one pipe within a search node.
///
/// # Example
///
/// ```
/// use pipe_types::{CellPath, CostWeights, PathCost, PipeId, PipePath};
/// use pipe_grid::Cell;
///
/// let path = CellPath::new(vec![Cell::new(0, 0, 0), Cell::new(1, 0, 0)]);
/// let routed = PipePath::new(PipeId::new(7), path, PathCost::new(1, 0, 0));
///
/// assert_eq!(routed.pipe(), PipeId::new(7));
/// assert!((routed.weighted_cost(&CostWeights::default()) - 1.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipePath {
    pipe: PipeId,
    path: CellPath,
    cost: PathCost,
}

impl PipePath {
    /// Creates a routed pipe path.
    #[must_use]
    pub const fn new(pipe: PipeId, path: CellPath, cost: PathCost) -> Self {
        Self { pipe, path, cost }
    }

    /// Returns the pipe this path belongs to.
    #[must_use]
    pub const fn pipe(&self) -> PipeId {
        self.pipe
    }

    /// Returns the cell path.
    #[must_use]
    pub const fn path(&self) -> &CellPath {
        &self.path
    }

    /// Returns the measured cost components.
    #[must_use]
    pub const fn cost(&self) -> &PathCost {
        &self.cost
    }

    /// Returns the weighted cost of the path.
    #[must_use]
    pub fn weighted_cost(&self, weights: &crate::CostWeights) -> f64 {
        self.cost.weighted(weights)
    }
}
