//! Grid cell coordinates and axis directions.

use std::fmt;

/// A discrete 3D coordinate in grid space.
///
/// Cells compare lexicographically on `(x, y, z)`, which is the ordering
/// the planner uses for its final tie-break.
///
/// # Example
///
/// ```
/// use pipe_grid::Cell;
///
/// let cell = Cell::new(1, 2, 3);
/// assert_eq!(cell.x, 1);
/// assert!(Cell::new(0, 9, 9) < Cell::new(1, 0, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// X coordinate (width axis).
    pub x: i32,
    /// Y coordinate (depth axis).
    pub y: i32,
    /// Z coordinate (height axis).
    pub z: i32,
}

impl Cell {
    /// Creates a new cell.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell at (0, 0, 0).
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(0, 0, 0)
    }

    /// Returns the neighbor one unit away in `direction`.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_grid::{Cell, Direction};
    ///
    /// let cell = Cell::new(2, 2, 2);
    /// assert_eq!(cell.step(Direction::NegZ), Cell::new(2, 2, 1));
    /// ```
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.offset();
        Self::new(
            self.x.wrapping_add(dx),
            self.y.wrapping_add(dy),
            self.z.wrapping_add(dz),
        )
    }

    /// Returns the 6 face-adjacent neighbors, in [`Direction::ALL`] order.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_grid::Cell;
    ///
    /// let neighbors = Cell::origin().face_neighbors();
    /// assert_eq!(neighbors.len(), 6);
    /// assert!(neighbors.contains(&Cell::new(-1, 0, 0)));
    /// ```
    #[must_use]
    pub const fn face_neighbors(self) -> [Self; 6] {
        [
            self.step(Direction::PosX),
            self.step(Direction::NegX),
            self.step(Direction::PosY),
            self.step(Direction::NegY),
            self.step(Direction::PosZ),
            self.step(Direction::NegZ),
        ]
    }

    /// Computes the Manhattan distance to another cell.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_grid::Cell;
    ///
    /// assert_eq!(Cell::origin().manhattan_distance(Cell::new(3, -4, 5)), 12);
    /// ```
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        let dz = self.z.abs_diff(other.z);
        dx.saturating_add(dy).saturating_add(dz)
    }

    /// Computes the Chebyshev distance to another cell.
    ///
    /// This is the metric clearance rules are expressed in: a separation of
    /// `r` forbids every cell inside the `(2r + 1)^3` cube around a pipe cell.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_grid::Cell;
    ///
    /// assert_eq!(Cell::origin().chebyshev_distance(Cell::new(3, 4, 5)), 5);
    /// ```
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        let dz = self.z.abs_diff(other.z);
        dx.max(dy).max(dz)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl std::ops::Sub for Cell {
    type Output = Self;

    /// Component-wise difference, wrapping on overflow.
    fn sub(self, other: Self) -> Self {
        Self::new(
            self.x.wrapping_sub(other.x),
            self.y.wrapping_sub(other.y),
            self.z.wrapping_sub(other.z),
        )
    }
}

impl From<(i32, i32, i32)> for Cell {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

/// One of the six axis-aligned unit moves.
///
/// Pipes only travel along axes; a change of `Direction` between two
/// consecutive moves is a bend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// +X
    PosX,
    /// -X
    NegX,
    /// +Y
    PosY,
    /// -Y
    NegY,
    /// +Z (up)
    PosZ,
    /// -Z (down)
    NegZ,
}

impl Direction {
    /// All six directions in a fixed order.
    pub const ALL: [Self; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Unit offset of this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::PosX => (1, 0, 0),
            Self::NegX => (-1, 0, 0),
            Self::PosY => (0, 1, 0),
            Self::NegY => (0, -1, 0),
            Self::PosZ => (0, 0, 1),
            Self::NegZ => (0, 0, -1),
        }
    }

    /// Returns the direction of the unit move `from -> to`.
    ///
    /// Returns `None` when the cells are not face-adjacent.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_grid::{Cell, Direction};
    ///
    /// let a = Cell::new(1, 1, 1);
    /// assert_eq!(Direction::between(a, Cell::new(1, 2, 1)), Some(Direction::PosY));
    /// assert_eq!(Direction::between(a, Cell::new(2, 2, 1)), None);
    /// assert_eq!(Direction::between(a, a), None);
    /// ```
    #[must_use]
    pub fn between(from: Cell, to: Cell) -> Option<Self> {
        let d = to - from;
        match (d.x, d.y, d.z) {
            (1, 0, 0) => Some(Self::PosX),
            (-1, 0, 0) => Some(Self::NegX),
            (0, 1, 0) => Some(Self::PosY),
            (0, -1, 0) => Some(Self::NegY),
            (0, 0, 1) => Some(Self::PosZ),
            (0, 0, -1) => Some(Self::NegZ),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut cells = vec![
            Cell::new(1, 0, 0),
            Cell::new(0, 1, 0),
            Cell::new(0, 0, 1),
            Cell::new(0, 0, 0),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                Cell::new(0, 0, 0),
                Cell::new(0, 0, 1),
                Cell::new(0, 1, 0),
                Cell::new(1, 0, 0),
            ]
        );
    }

    #[test]
    fn test_face_neighbors_match_directions() {
        let cell = Cell::new(5, 5, 5);
        for (neighbor, direction) in cell.face_neighbors().into_iter().zip(Direction::ALL) {
            assert_eq!(Direction::between(cell, neighbor), Some(direction));
            assert_eq!(cell.manhattan_distance(neighbor), 1);
        }
    }

    #[test]
    fn test_distances() {
        let a = Cell::new(-5, -5, -5);
        let b = Cell::new(5, 5, 5);
        assert_eq!(a.manhattan_distance(b), 30);
        assert_eq!(a.chebyshev_distance(b), 10);
        assert_eq!(a.chebyshev_distance(a), 0);
    }

    #[test]
    fn test_conversions_and_display() {
        let cell: Cell = (1, 2, 3).into();
        assert_eq!(cell, Cell::new(1, 2, 3));
        assert_eq!(cell.to_string(), "(1, 2, 3)");
    }

    #[test]
    fn test_difference_gives_direction() {
        let a = Cell::new(3, -1, 2);
        assert_eq!(Cell::new(4, 1, 0) - a, Cell::new(1, 2, -2));
        for direction in Direction::ALL {
            assert_eq!(Direction::between(a, a.step(direction)), Some(direction));
        }
        assert_eq!(Direction::between(a, a.step(Direction::PosX).step(Direction::PosY)), None);
        // wraps the same way `step` does
        let edge = Cell::new(i32::MAX, 0, 0);
        assert_eq!(Direction::between(edge, edge.step(Direction::PosX)), Some(Direction::PosX));
    }
}
