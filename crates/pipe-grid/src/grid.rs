//! Grid bounds and the static routing environment.

use std::collections::HashSet;

use crate::cell::{Cell, Direction};
use crate::error::GridError;

/// Axis-aligned bounds in grid space. Both corners are inclusive.
///
/// # Example
///
/// ```
/// use pipe_grid::{Cell, GridBounds};
///
/// let bounds = GridBounds::new(Cell::new(10, 10, 10), Cell::new(0, 0, 0));
/// assert_eq!(bounds.min, Cell::new(0, 0, 0));
/// assert!(bounds.contains(Cell::new(10, 0, 5)));
/// assert!(!bounds.contains(Cell::new(11, 0, 5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridBounds {
    /// Minimum corner (inclusive).
    pub min: Cell,
    /// Maximum corner (inclusive).
    pub max: Cell,
}

impl GridBounds {
    /// Creates bounds from two corners, ordering them per axis.
    #[must_use]
    pub fn new(a: Cell, b: Cell) -> Self {
        Self {
            min: Cell::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Cell::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates bounds of `x * y * z` cells starting at the origin.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if any dimension is zero or
    /// does not fit in an `i32` coordinate.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_grid::{Cell, GridBounds};
    ///
    /// let bounds = GridBounds::from_size(5, 5, 5).unwrap();
    /// assert_eq!(bounds.max, Cell::new(4, 4, 4));
    /// assert_eq!(bounds.volume(), 125);
    /// assert!(GridBounds::from_size(0, 5, 5).is_err());
    /// ```
    pub fn from_size(x: u32, y: u32, z: u32) -> Result<Self, GridError> {
        let invalid = GridError::InvalidDimensions { x, y, z };
        let to_max = |n: u32| -> Option<i32> { i32::try_from(n.checked_sub(1)?).ok() };
        match (to_max(x), to_max(y), to_max(z)) {
            (Some(mx), Some(my), Some(mz)) => Ok(Self {
                min: Cell::origin(),
                max: Cell::new(mx, my, mz),
            }),
            _ => Err(invalid),
        }
    }

    /// Creates the cube of Chebyshev radius `radius` centred on `center`.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_grid::{Cell, GridBounds};
    ///
    /// let cube = GridBounds::around(Cell::new(2, 2, 2), 1);
    /// assert_eq!(cube.volume(), 27);
    /// assert_eq!(GridBounds::around(Cell::origin(), 0).volume(), 1);
    /// ```
    #[must_use]
    pub fn around(center: Cell, radius: u32) -> Self {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        Self {
            min: Cell::new(
                center.x.saturating_sub(r),
                center.y.saturating_sub(r),
                center.z.saturating_sub(r),
            ),
            max: Cell::new(
                center.x.saturating_add(r),
                center.y.saturating_add(r),
                center.z.saturating_add(r),
            ),
        }
    }

    /// Returns the size of the bounds as (x, y, z) cell counts.
    #[must_use]
    pub const fn size(&self) -> (u32, u32, u32) {
        (
            self.max.x.abs_diff(self.min.x).saturating_add(1),
            self.max.y.abs_diff(self.min.y).saturating_add(1),
            self.max.z.abs_diff(self.min.z).saturating_add(1),
        )
    }

    /// Returns the total number of cells in the bounds.
    #[must_use]
    pub fn volume(&self) -> u64 {
        let (x, y, z) = self.size();
        u64::from(x)
            .saturating_mul(u64::from(y))
            .saturating_mul(u64::from(z))
    }

    /// Checks if the bounds contain a cell.
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.min.x
            && cell.x <= self.max.x
            && cell.y >= self.min.y
            && cell.y <= self.max.y
            && cell.z >= self.min.z
            && cell.z <= self.max.z
    }

    /// Returns the intersection of two bounds, or `None` if they don't overlap.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let min = Cell::new(
            self.min.x.max(other.min.x),
            self.min.y.max(other.min.y),
            self.min.z.max(other.min.z),
        );
        let max = Cell::new(
            self.max.x.min(other.max.x),
            self.max.y.min(other.max.y),
            self.max.z.min(other.max.z),
        );

        if min.x <= max.x && min.y <= max.y && min.z <= max.z {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// Returns an iterator over all cells, X varying fastest.
    #[must_use]
    pub const fn iter(&self) -> GridBoundsIter {
        GridBoundsIter {
            bounds: *self,
            current: Some(self.min),
        }
    }
}

impl IntoIterator for GridBounds {
    type Item = Cell;
    type IntoIter = GridBoundsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &GridBounds {
    type Item = Cell;
    type IntoIter = GridBoundsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over all cells in a [`GridBounds`].
#[derive(Debug, Clone)]
pub struct GridBoundsIter {
    bounds: GridBounds,
    current: Option<Cell>,
}

impl Iterator for GridBoundsIter {
    type Item = Cell;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        let mut next = current;
        if next.x < self.bounds.max.x {
            next.x += 1;
        } else {
            next.x = self.bounds.min.x;
            if next.y < self.bounds.max.y {
                next.y += 1;
            } else {
                next.y = self.bounds.min.y;
                if next.z < self.bounds.max.z {
                    next.z += 1;
                } else {
                    self.current = None;
                    return Some(current);
                }
            }
        }
        self.current = Some(next);

        Some(current)
    }
}

/// Which structural conditions make a cell count as supported.
///
/// Pipes running through unsupported cells need extra hangers, which the
/// cost model penalises.
///
/// # Example
///
/// ```
/// use pipe_grid::SupportRule;
///
/// let rule = SupportRule::new().with_beside_blocked(false);
/// assert!(rule.floor());
/// assert!(!rule.beside_blocked());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SupportRule {
    /// Cells on the bottom layer rest on the floor.
    floor: bool,
    /// Cells directly above a blocked cell rest on equipment.
    on_blocked: bool,
    /// Cells horizontally adjacent to a blocked cell can hang off a wall.
    beside_blocked: bool,
}

impl SupportRule {
    /// Creates a rule with every condition enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            floor: true,
            on_blocked: true,
            beside_blocked: true,
        }
    }

    /// Creates a rule under which only explicit support cells are supported.
    #[must_use]
    pub const fn explicit_only() -> Self {
        Self {
            floor: false,
            on_blocked: false,
            beside_blocked: false,
        }
    }

    /// Sets whether the floor layer is supported.
    #[must_use]
    pub const fn with_floor(mut self, enable: bool) -> Self {
        self.floor = enable;
        self
    }

    /// Sets whether cells resting on blocked cells are supported.
    #[must_use]
    pub const fn with_on_blocked(mut self, enable: bool) -> Self {
        self.on_blocked = enable;
        self
    }

    /// Sets whether cells beside blocked cells are supported.
    #[must_use]
    pub const fn with_beside_blocked(mut self, enable: bool) -> Self {
        self.beside_blocked = enable;
        self
    }

    /// Returns whether the floor layer is supported.
    #[must_use]
    pub const fn floor(&self) -> bool {
        self.floor
    }

    /// Returns whether cells resting on blocked cells are supported.
    #[must_use]
    pub const fn on_blocked(&self) -> bool {
        self.on_blocked
    }

    /// Returns whether cells beside blocked cells are supported.
    #[must_use]
    pub const fn beside_blocked(&self) -> bool {
        self.beside_blocked
    }
}

impl Default for SupportRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Static 3D occupancy model shared read-only by every planner call.
///
/// Holds the grid bounds, the permanently blocked cells (equipment) and the
/// support information. Anything outside the bounds is implicitly blocked.
/// The environment is assembled with the `with_*` builders and never
/// mutated afterwards.
///
/// # Example
///
/// ```
/// use pipe_grid::{Cell, GridBounds, GridEnvironment};
///
/// let bounds = GridBounds::from_size(10, 10, 5).unwrap();
/// let env = GridEnvironment::new(bounds)
///     .with_blocked_box(Cell::new(2, 2, 0), Cell::new(3, 3, 2));
///
/// assert!(env.is_blocked(Cell::new(2, 3, 1)));
/// assert!(env.is_blocked(Cell::new(-1, 0, 0)));
/// assert!(env.is_supported(Cell::new(2, 2, 3))); // on top of equipment
/// assert!(!env.is_supported(Cell::new(7, 7, 3)));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridEnvironment {
    bounds: GridBounds,
    blocked: HashSet<Cell>,
    supports: HashSet<Cell>,
    rule: SupportRule,
}

impl GridEnvironment {
    /// Creates an empty environment with the default [`SupportRule`].
    #[must_use]
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            blocked: HashSet::new(),
            supports: HashSet::new(),
            rule: SupportRule::default(),
        }
    }

    /// Marks cells as permanently blocked. Cells outside the bounds are ignored.
    #[must_use]
    pub fn with_blocked<I: IntoIterator<Item = Cell>>(mut self, cells: I) -> Self {
        let bounds = self.bounds;
        self.blocked
            .extend(cells.into_iter().filter(|c| bounds.contains(*c)));
        self
    }

    /// Blocks every cell of the box spanned by two corners (clipped to the grid).
    #[must_use]
    pub fn with_blocked_box(mut self, a: Cell, b: Cell) -> Self {
        if let Some(clipped) = GridBounds::new(a, b).intersection(&self.bounds) {
            self.blocked.extend(clipped.iter());
        }
        self
    }

    /// Registers explicit support cells such as pipe racks.
    #[must_use]
    pub fn with_support_cells<I: IntoIterator<Item = Cell>>(mut self, cells: I) -> Self {
        self.supports.extend(cells);
        self
    }

    /// Replaces the support rule.
    #[must_use]
    pub const fn with_support_rule(mut self, rule: SupportRule) -> Self {
        self.rule = rule;
        self
    }

    /// Returns the grid bounds.
    #[must_use]
    pub const fn bounds(&self) -> &GridBounds {
        &self.bounds
    }

    /// Returns the support rule.
    #[must_use]
    pub const fn support_rule(&self) -> &SupportRule {
        &self.rule
    }

    /// Returns the number of permanently blocked cells.
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }

    /// Returns `true` if the cell lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, cell: Cell) -> bool {
        self.bounds.contains(cell)
    }

    /// Returns `true` if the cell is out of bounds or permanently blocked.
    #[must_use]
    pub fn is_blocked(&self, cell: Cell) -> bool {
        !self.in_bounds(cell) || self.blocked.contains(&cell)
    }

    /// Returns `true` if a pipe running through `cell` needs no extra hanger.
    #[must_use]
    pub fn is_supported(&self, cell: Cell) -> bool {
        if !self.in_bounds(cell) {
            return false;
        }
        if self.supports.contains(&cell) {
            return true;
        }
        if self.rule.floor && cell.z == self.bounds.min.z {
            return true;
        }
        if self.rule.on_blocked && self.blocked.contains(&cell.step(Direction::NegZ)) {
            return true;
        }
        self.rule.beside_blocked
            && [
                Direction::PosX,
                Direction::NegX,
                Direction::PosY,
                Direction::NegY,
            ]
            .into_iter()
            .any(|d| self.blocked.contains(&cell.step(d)))
    }

    /// Checks that a pipe endpoint is usable.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] or [`GridError::Blocked`].
    pub fn check_endpoint(&self, cell: Cell) -> Result<(), GridError> {
        if !self.in_bounds(cell) {
            return Err(GridError::OutOfBounds(cell));
        }
        if self.blocked.contains(&cell) {
            return Err(GridError::Blocked(cell));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn env_5() -> GridEnvironment {
        GridEnvironment::new(GridBounds::from_size(5, 5, 5).unwrap())
    }

    #[test]
    fn test_bounds_iter_visits_every_cell_once() {
        let bounds = GridBounds::new(Cell::new(-1, 0, 2), Cell::new(1, 1, 3));
        let cells: Vec<_> = bounds.iter().collect();
        assert_eq!(cells.len() as u64, bounds.volume());
        assert_eq!(cells.first(), Some(&bounds.min));
        assert_eq!(cells.last(), Some(&bounds.max));
        let unique: HashSet<_> = cells.iter().copied().collect();
        assert_eq!(unique.len(), cells.len());
    }

    #[test]
    fn test_bounds_single_cell_iter() {
        let bounds = GridBounds::around(Cell::new(3, 3, 3), 0);
        assert_eq!(bounds.iter().count(), 1);
    }

    #[test]
    fn test_from_size_rejects_zero() {
        assert!(matches!(
            GridBounds::from_size(5, 0, 5),
            Err(GridError::InvalidDimensions { x: 5, y: 0, z: 5 })
        ));
    }

    #[test]
    fn test_intersection() {
        let a = GridBounds::new(Cell::origin(), Cell::new(10, 10, 10));
        let b = GridBounds::new(Cell::new(5, 5, 5), Cell::new(15, 15, 15));
        let c = GridBounds::new(Cell::new(20, 20, 20), Cell::new(30, 30, 30));
        assert_eq!(
            a.intersection(&b),
            Some(GridBounds::new(Cell::new(5, 5, 5), Cell::new(10, 10, 10)))
        );
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let env = env_5();
        assert!(env.is_blocked(Cell::new(5, 0, 0)));
        assert!(env.is_blocked(Cell::new(0, -1, 0)));
        assert!(!env.is_blocked(Cell::new(4, 4, 4)));
    }

    #[test]
    fn test_blocked_box_is_clipped() {
        let env = env_5().with_blocked_box(Cell::new(3, 3, 3), Cell::new(9, 9, 9));
        assert_eq!(env.blocked_count(), 8);
        assert!(env.is_blocked(Cell::new(4, 4, 4)));
    }

    #[test]
    fn test_support_rules() {
        let env = env_5().with_blocked([Cell::new(2, 2, 0)]);
        // floor
        assert!(env.is_supported(Cell::new(0, 0, 0)));
        // on top of equipment
        assert!(env.is_supported(Cell::new(2, 2, 1)));
        // beside equipment
        assert!(env.is_supported(Cell::new(3, 2, 0)));
        assert!(!env.is_supported(Cell::new(3, 2, 1)));
        // hanging in the air
        assert!(!env.is_supported(Cell::new(0, 0, 3)));
        // outside the grid
        assert!(!env.is_supported(Cell::new(0, 0, 9)));
    }

    #[test]
    fn test_explicit_supports() {
        let env = env_5()
            .with_support_rule(SupportRule::explicit_only())
            .with_support_cells([Cell::new(1, 1, 3)]);
        assert!(env.is_supported(Cell::new(1, 1, 3)));
        assert!(!env.is_supported(Cell::new(0, 0, 0)));
    }

    #[test]
    fn test_check_endpoint() {
        let env = env_5().with_blocked([Cell::new(1, 1, 1)]);
        assert!(env.check_endpoint(Cell::new(0, 0, 0)).is_ok());
        assert_eq!(
            env.check_endpoint(Cell::new(1, 1, 1)),
            Err(GridError::Blocked(Cell::new(1, 1, 1)))
        );
        assert_eq!(
            env.check_endpoint(Cell::new(7, 1, 1)),
            Err(GridError::OutOfBounds(Cell::new(7, 1, 1)))
        );
    }
}
